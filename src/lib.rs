//! # annograph
//!
//! Annotation consolidation for Rust.
//!
//! Takes the raw output of a linguistic annotator (tokens with lemma, POS
//! and NE labels, constituency trees, dependency graphs, coreference
//! chains, sentiment classes) and consolidates it into a deduplicated
//! document model:
//!
//! - **Token merging**: contiguous same-NE-label tokens collapse into one
//!   multi-word tag occurrence ("International Business Machines" becomes a
//!   single `ORGANIZATION` tag)
//! - **Tag deduplication**: one [`Tag`](tag::Tag) per `(lemma, language)`
//!   document-wide, referenced by arena index
//! - **Phrases**: `NP`/`NP-TMP` subtrees become ordered phrase occurrences
//! - **Dependencies**: graph edges become typed dependencies keyed by
//!   synthetic token ids
//! - **Coreference**: mentions link to their chain representative by
//!   foreign key
//!
//! ## Quick Start
//!
//! ```rust
//! use annograph::prelude::*;
//!
//! let annotation = DocumentAnnotation::new(vec![SentenceAnnotation::new(
//!     "IBM makes chips",
//!     vec![
//!         TokenAnnotation::new(0, 3, "IBM").with_lemma("IBM").with_ne("ORGANIZATION"),
//!         TokenAnnotation::new(4, 9, "makes").with_lemma("make").with_before(" "),
//!         TokenAnnotation::new(10, 15, "chips").with_lemma("chip").with_before(" "),
//!     ],
//! )]);
//!
//! let consolidator = Consolidator::new(PipelineConfig::new("en")?)?;
//! let document = consolidator.consolidate(&annotation);
//! assert_eq!(document.tags.len(), 3);
//! # Ok::<(), annograph::Error>(())
//! ```
//!
//! ## Pipeline Steps
//!
//! NER merging is always on by default; the rest are opt-in via
//! [`PipelineConfig`](config::PipelineConfig):
//!
//! | Step | Consumes | Produces |
//! |------|----------|----------|
//! | `Ner` | token stream | tags + tag occurrences |
//! | `Phrase` | constituency tree | phrase occurrences |
//! | `Dependency` | dependency graph | typed dependencies |
//! | `Sentiment` | sentiment classes | per-sentence scores |
//! | `Coref` | coref chains | phrase occurrence links |
//! | `Whitelist` | whitelist values | filtered tags |

#![warn(missing_docs)]

pub mod annotation;
pub mod cli;
pub mod config;
pub mod coref;
pub mod deps;
pub mod document;
pub mod engine;
mod error;
pub mod lemma;
pub mod merge;
pub mod phrase;
pub mod stopwords;
pub mod tag;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use annograph::prelude::*;
    //!
    //! let config = PipelineConfig::new("en").unwrap();
    //! let consolidator = Consolidator::new(config).unwrap();
    //! let document = consolidator.consolidate(&DocumentAnnotation::new(vec![]));
    //! assert!(document.sentences.is_empty());
    //! ```
    pub use crate::annotation::{
        CorefChainAnnotation, CorefMention, DocumentAnnotation, SentenceAnnotation,
        TokenAnnotation,
    };
    pub use crate::config::{PipelineConfig, ProcessingStep};
    pub use crate::document::{Document, Sentence};
    pub use crate::engine::{Consolidator, SentimentScorer};
    pub use crate::error::{Error, Result};
    pub use crate::tag::{Tag, TagId, TagOccurrence};
}

// Re-exports
pub use annotation::{DocumentAnnotation, SentenceAnnotation, TokenAnnotation, BACKGROUND_SYMBOL};
pub use config::{PipelineConfig, ProcessingStep};
pub use document::{Document, Phrase, PhraseOccurrence, PhraseRef, Sentence, TypedDependency};
pub use engine::{rescore_sentiment, Consolidator, SentimentScorer};
pub use error::{Error, Result};
pub use tag::{token_id, Tag, TagArena, TagId, TagOccurrence};
