//! The consolidated document model.
//!
//! A [`Document`] owns its sentences and the document-wide [`TagArena`].
//! Everything here is plain data: phrase coreference links are foreign keys
//! ([`PhraseRef`]), tag back-references are arena indices, so the model is
//! freely traversable and serializable without reference cycles.
//!
//! All entities are immutable after consolidation except the coreference
//! `reference` link, which is set once after every sentence of the document
//! has been processed.

use crate::tag::{TagArena, TagOccurrence};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A normalized (multi-word) phrase string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    /// Space-joined surface words of the phrase.
    pub value: String,
}

impl Phrase {
    /// Create a phrase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Document-scoped address of a phrase occurrence.
///
/// Used as the coreference `reference` foreign key instead of an object
/// pointer, keeping [`PhraseOccurrence`] plain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseRef {
    /// Zero-based sentence index.
    pub sentence: usize,
    /// Begin character offset within that sentence.
    pub begin: usize,
    /// End character offset (exclusive).
    pub end: usize,
}

/// One occurrence of a phrase within a sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseOccurrence {
    /// Begin character offset into the sentence text.
    pub begin: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// The phrase itself.
    pub phrase: Phrase,
    /// Coreference representative, when this occurrence is a mention of one.
    #[serde(default)]
    pub reference: Option<PhraseRef>,
}

impl PhraseOccurrence {
    /// Create an occurrence with no coreference link.
    #[must_use]
    pub fn new(begin: usize, end: usize, phrase: Phrase) -> Self {
        Self {
            begin,
            end,
            phrase,
            reference: None,
        }
    }
}

/// A typed dependency edge between two tokens, keyed by synthetic token ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDependency {
    /// Synthetic id of the governor token.
    pub source: String,
    /// Synthetic id of the dependent token.
    pub target: String,
    /// Relation short name (`ROOT` for root self-loops).
    pub relation: String,
    /// Optional relation qualifier.
    #[serde(default)]
    pub qualifier: Option<String>,
}

impl TypedDependency {
    /// Create a dependency edge.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relation: impl Into<String>,
        qualifier: Option<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation: relation.into(),
            qualifier,
        }
    }
}

/// One sentence of a consolidated document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    /// Raw sentence text.
    pub text: String,
    /// Zero-based sequence index within the document.
    pub index: usize,
    /// Sentiment class; `None` is the "no sentiment" sentinel.
    #[serde(default)]
    pub sentiment: Option<i32>,
    /// Tag occurrences keyed by begin offset. The list handles overlapping
    /// or merged spans sharing a begin offset.
    #[serde(default)]
    pub tag_occurrences: BTreeMap<usize, Vec<TagOccurrence>>,
    /// Phrase occurrences, ordered by (begin, end).
    #[serde(default)]
    pub phrases: Vec<PhraseOccurrence>,
    /// Typed dependency edges.
    #[serde(default)]
    pub dependencies: Vec<TypedDependency>,
}

impl Sentence {
    /// Create an empty sentence.
    #[must_use]
    pub fn new(text: impl Into<String>, index: usize) -> Self {
        Self {
            text: text.into(),
            index,
            sentiment: None,
            tag_occurrences: BTreeMap::new(),
            phrases: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Record a tag occurrence.
    pub fn add_tag_occurrence(&mut self, occurrence: TagOccurrence) {
        self.tag_occurrences
            .entry(occurrence.begin)
            .or_default()
            .push(occurrence);
    }

    /// Record a phrase occurrence. An occurrence already present at the same
    /// span is kept; the extractor deduplicates before insertion.
    pub fn add_phrase_occurrence(&mut self, occurrence: PhraseOccurrence) {
        if self.phrase_occurrence(occurrence.begin, occurrence.end).is_some() {
            return;
        }
        let at = self
            .phrases
            .partition_point(|p| (p.begin, p.end) < (occurrence.begin, occurrence.end));
        self.phrases.insert(at, occurrence);
    }

    /// Look up the phrase occurrence at an exact span.
    #[must_use]
    pub fn phrase_occurrence(&self, begin: usize, end: usize) -> Option<&PhraseOccurrence> {
        self.phrases
            .iter()
            .find(|p| p.begin == begin && p.end == end)
    }

    /// Mutable lookup of the phrase occurrence at an exact span.
    pub fn phrase_occurrence_mut(&mut self, begin: usize, end: usize) -> Option<&mut PhraseOccurrence> {
        self.phrases
            .iter_mut()
            .find(|p| p.begin == begin && p.end == end)
    }

    /// Record a typed dependency edge.
    pub fn add_typed_dependency(&mut self, dependency: TypedDependency) {
        self.dependencies.push(dependency);
    }

    /// Iterate over all tag occurrences in begin-offset order.
    pub fn iter_tag_occurrences(&self) -> impl Iterator<Item = &TagOccurrence> {
        self.tag_occurrences.values().flatten()
    }
}

/// A consolidated document: ordered sentences plus the deduplicated tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Sentences in document order.
    pub sentences: Vec<Sentence>,
    /// Document-wide deduplicated tags.
    pub tags: TagArena,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sentence, keeping sentences ordered by sequence index.
    pub fn add_sentence(&mut self, sentence: Sentence) {
        let at = self
            .sentences
            .partition_point(|s| s.index < sentence.index);
        self.sentences.insert(at, sentence);
    }

    /// Look up a sentence by its sequence index.
    #[must_use]
    pub fn sentence(&self, index: usize) -> Option<&Sentence> {
        self.sentences.iter().find(|s| s.index == index)
    }

    /// Mutable lookup of a sentence by its sequence index.
    pub fn sentence_mut(&mut self, index: usize) -> Option<&mut Sentence> {
        self.sentences.iter_mut().find(|s| s.index == index)
    }
}
