//! The document assembler.
//!
//! [`Consolidator`] drives the full consolidation of one annotated document:
//! token merging per sentence, then phrase/dependency extraction, whitelist
//! filtering, sentiment aggregation, and finally cross-sentence coreference
//! resolution (which must run after every sentence's phrase occurrences
//! exist). Sentences are processed strictly in order; offsets and synthetic
//! ids are offset-derived, so ordering is deterministic.

use crate::annotation::DocumentAnnotation;
use crate::config::{PipelineConfig, ProcessingStep};
use crate::coref::resolve_coreferences;
use crate::deps::extract_dependencies;
use crate::document::{Document, Sentence};
use crate::error::Result;
use crate::lemma::is_valid_lemma;
use crate::merge::TokenMerger;
use crate::phrase::extract_phrases;
use crate::stopwords::{ListStopwords, StopwordOracle};
use crate::tag::{Tag, TagId};
use std::collections::HashSet;

/// Capability for scoring a sentence's sentiment, supplied by the caller.
///
/// Scoring is purely local to one sentence, so implementations may be
/// invoked across sentences in any order; results are written back keyed by
/// the sentence's stable sequence index.
pub trait SentimentScorer: Send + Sync {
    /// Score a sentence; `None` means "no sentiment".
    fn score(&self, sentence_text: &str) -> Option<i32>;
}

/// Consolidates annotated documents into the document model.
///
/// # Example
///
/// ```rust
/// use annograph::annotation::{DocumentAnnotation, SentenceAnnotation, TokenAnnotation};
/// use annograph::config::PipelineConfig;
/// use annograph::engine::Consolidator;
///
/// let annotation = DocumentAnnotation::new(vec![SentenceAnnotation::new(
///     "IBM works",
///     vec![
///         TokenAnnotation::new(0, 3, "IBM").with_lemma("IBM").with_ne("ORGANIZATION"),
///         TokenAnnotation::new(4, 9, "works").with_lemma("work").with_before(" "),
///     ],
/// )]);
///
/// let consolidator = Consolidator::new(PipelineConfig::new("en").unwrap()).unwrap();
/// let document = consolidator.consolidate(&annotation);
/// assert_eq!(document.sentences.len(), 1);
/// assert!(document.tags.find("IBM", "en").is_some());
/// ```
pub struct Consolidator {
    config: PipelineConfig,
    stopwords: Box<dyn StopwordOracle>,
}

impl Consolidator {
    /// Create a consolidator, building the stopword oracle from the config.
    ///
    /// With no explicit stopword list, the default English list applies —
    /// unless a whitelist is configured, in which case stopword filtering
    /// is disabled (the whitelist already decides what survives).
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let stopwords: Box<dyn StopwordOracle> = match &config.stopword_list {
            Some(list) => Box::new(ListStopwords::from_list(list, config.check_lemma)),
            None if config.whitelist.is_some() => Box::new(ListStopwords::empty()),
            None => Box::new(ListStopwords::default_list()),
        };
        Ok(Self { config, stopwords })
    }

    /// Create a consolidator with a caller-supplied stopword oracle.
    pub fn with_stopwords(
        config: PipelineConfig,
        stopwords: Box<dyn StopwordOracle>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, stopwords })
    }

    /// The pipeline configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Consolidate one annotated document.
    ///
    /// Never fails: missing optional structures and per-token problems are
    /// handled locally, producing the best achievable consolidation.
    #[must_use]
    pub fn consolidate(&self, annotation: &DocumentAnnotation) -> Document {
        let merger = TokenMerger::new(&self.config, self.stopwords.as_ref());
        let mut document = Document::new();

        for (index, annotated) in annotation.sentences.iter().enumerate() {
            let mut sentence = Sentence::new(annotated.text.clone(), index);
            merger.merge(&annotated.tokens, &mut sentence, &mut document.tags);

            if self.config.has_step(ProcessingStep::Sentiment) {
                sentence.sentiment = annotated.sentiment;
            }
            if self.config.has_step(ProcessingStep::Phrase) {
                extract_phrases(annotated.tree.as_ref(), &mut sentence);
            }
            if self.config.has_step(ProcessingStep::Dependency) {
                extract_dependencies(annotated.dependencies.as_ref(), &mut sentence);
            }
            if self.config.has_step(ProcessingStep::Whitelist) {
                self.filter_whitelist(&mut sentence, &document);
            }
            document.add_sentence(sentence);
        }

        if self.config.has_step(ProcessingStep::Whitelist) {
            compact_tags(&mut document);
        }
        // Hard ordering barrier: all phrase occurrences exist by now.
        if self.config.has_step(ProcessingStep::Coref) {
            resolve_coreferences(annotation, &mut document);
        }
        document
    }

    /// Consolidate a short text into a single tag.
    ///
    /// A one-token first sentence goes through the normal single-token tag
    /// path; a multi-token first sentence produces a bare tag of the whole
    /// text with no POS/NE labels.
    #[must_use]
    pub fn single_tag(&self, annotation: &DocumentAnnotation) -> Option<Tag> {
        let sentence = annotation.sentences.first()?;
        match sentence.tokens.len() {
            0 => None,
            1 => {
                let merger = TokenMerger::new(&self.config, self.stopwords.as_ref());
                sentence
                    .tokens
                    .iter()
                    .filter_map(|t| merger.single_token_tag(t))
                    .find(|tag| is_valid_lemma(&tag.lemma))
            }
            _ => Some(Tag::new(
                sentence.text.clone(),
                self.config.language.clone(),
            )),
        }
    }

    /// Flat tag list for the first sentence of an annotation, with stopword
    /// and validity filtering applied.
    #[must_use]
    pub fn sentence_tags(&self, annotation: &DocumentAnnotation) -> Vec<Tag> {
        let Some(sentence) = annotation.sentences.first() else {
            return Vec::new();
        };
        let merger = TokenMerger::new(&self.config, self.stopwords.as_ref());
        sentence
            .tokens
            .iter()
            .filter_map(|t| merger.single_token_tag(t))
            .filter(|tag| is_valid_lemma(&tag.lemma))
            .collect()
    }

    /// Remove occurrences whose surface value and lemma both miss the
    /// whitelist. Applied after merging, before coreference resolution.
    fn filter_whitelist(&self, sentence: &mut Sentence, document: &Document) {
        let Some(whitelist) = &self.config.whitelist else {
            return;
        };
        let allow: HashSet<String> = whitelist
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        if allow.is_empty() {
            return;
        }
        for occurrences in sentence.tag_occurrences.values_mut() {
            occurrences.retain(|occurrence| {
                let lemma = document
                    .tags
                    .get(occurrence.tag)
                    .map(|t| t.lemma.to_lowercase())
                    .unwrap_or_default();
                allow.contains(&occurrence.value.to_lowercase()) || allow.contains(&lemma)
            });
        }
        sentence.tag_occurrences.retain(|_, v| !v.is_empty());
    }
}

/// Re-score sentiment over an already-consolidated document.
///
/// Each sentence is scored independently; write-back is keyed by the
/// sentence's stable sequence index.
pub fn rescore_sentiment(document: &mut Document, scorer: &dyn SentimentScorer) {
    let scores: Vec<(usize, Option<i32>)> = document
        .sentences
        .iter()
        .map(|s| (s.index, scorer.score(&s.text)))
        .collect();
    for (index, score) in scores {
        if let Some(sentence) = document.sentence_mut(index) {
            sentence.sentiment = score;
        }
    }
}

/// Drop tags no longer referenced by any occurrence and remap the
/// surviving arena indices. Runs once, after whitelist filtering.
fn compact_tags(document: &mut Document) {
    let referenced: HashSet<TagId> = document
        .sentences
        .iter()
        .flat_map(|s| s.iter_tag_occurrences().map(|o| o.tag))
        .collect();
    let remap = document.tags.retain(|id, _| referenced.contains(&id));
    for sentence in &mut document.sentences {
        for occurrences in sentence.tag_occurrences.values_mut() {
            for occurrence in occurrences {
                if let Some(new_id) = remap.get(&occurrence.tag) {
                    occurrence.tag = *new_id;
                }
            }
        }
    }
}
