//! Deduplicated lexical entities and their occurrences.
//!
//! A [`Tag`] is a document-scoped lexical entity identified by its
//! (lemma, language) pair. Tags live in a [`TagArena`] owned by the
//! document; a [`TagOccurrence`] refers to its canonical tag by [`TagId`]
//! (an arena index), never by pointer. The arena enforces the dedup
//! invariant: no two tags in a document share a (lemma, language) pair.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Compute the synthetic token id for a token.
///
/// The id is derived deterministically from the sentence index, character
/// span, and lemma, so the same underlying token always maps to the same id
/// across the token merger and the dependency extractor.
#[must_use]
pub fn token_id(sentence: usize, begin: usize, end: usize, lemma: &str) -> String {
    format!("{sentence}{begin}{end}{lemma}")
}

/// Index of a [`Tag`] in a document's [`TagArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagId(pub usize);

/// A deduplicated lexical entity.
///
/// POS and NE label sets accumulate the union of all values observed across
/// the tag's occurrences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Lemma value (for merged named entities, the merged surface text).
    pub lemma: String,
    /// Language code (e.g. "en").
    pub language: String,
    /// Original surface form, when it differs from the lemma.
    #[serde(default)]
    pub original: Option<String>,
    /// POS labels observed across occurrences.
    #[serde(default)]
    pub pos: Vec<String>,
    /// NE labels observed across occurrences.
    #[serde(default)]
    pub ne: Vec<String>,
}

impl Tag {
    /// Create a tag with no POS/NE labels.
    #[must_use]
    pub fn new(lemma: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            language: language.into(),
            original: None,
            pos: Vec::new(),
            ne: Vec::new(),
        }
    }

    /// Set the original surface form.
    #[must_use]
    pub fn with_original(mut self, original: impl Into<String>) -> Self {
        self.original = Some(original.into());
        self
    }

    /// Set the POS labels.
    #[must_use]
    pub fn with_pos(mut self, pos: Vec<String>) -> Self {
        self.pos = pos;
        self
    }

    /// Set the NE labels.
    #[must_use]
    pub fn with_ne(mut self, ne: Vec<String>) -> Self {
        self.ne = ne;
        self
    }

    /// Dedup key: (lemma, language).
    #[must_use]
    pub fn key(&self) -> (String, String) {
        (self.lemma.clone(), self.language.clone())
    }
}

/// One occurrence of a tag within a sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagOccurrence {
    /// Begin character offset into the sentence text.
    pub begin: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// Original surface substring covered by this occurrence.
    pub value: String,
    /// Synthetic ids of the tokens merged into this occurrence.
    pub token_ids: Vec<String>,
    /// The canonical tag, as an arena index.
    pub tag: TagId,
}

impl TagOccurrence {
    /// Create an occurrence.
    #[must_use]
    pub fn new(
        begin: usize,
        end: usize,
        value: impl Into<String>,
        token_ids: Vec<String>,
        tag: TagId,
    ) -> Self {
        Self {
            begin,
            end,
            value: value.into(),
            token_ids,
            tag,
        }
    }
}

/// Arena of canonical tags plus the document-wide (lemma, language) index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagArena {
    tags: Vec<Tag>,
    #[serde(skip)]
    index: HashMap<(String, String), TagId>,
}

impl TagArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add-or-get: return the canonical tag for `tag`'s (lemma, language)
    /// pair, creating it if absent. When the tag already exists, its POS and
    /// NE sets absorb the new tag's labels.
    pub fn add_or_get(&mut self, tag: Tag) -> TagId {
        let key = tag.key();
        if let Some(&id) = self.index.get(&key) {
            let existing = &mut self.tags[id.0];
            for pos in tag.pos {
                if !existing.pos.contains(&pos) {
                    existing.pos.push(pos);
                }
            }
            for ne in tag.ne {
                if !existing.ne.contains(&ne) {
                    existing.ne.push(ne);
                }
            }
            if existing.original.is_none() {
                existing.original = tag.original;
            }
            return id;
        }
        let id = TagId(self.tags.len());
        self.tags.push(tag);
        self.index.insert(key, id);
        id
    }

    /// Look up a tag by id.
    #[must_use]
    pub fn get(&self, id: TagId) -> Option<&Tag> {
        self.tags.get(id.0)
    }

    /// Look up a tag id by (lemma, language).
    #[must_use]
    pub fn find(&self, lemma: &str, language: &str) -> Option<TagId> {
        self.index
            .get(&(lemma.to_string(), language.to_string()))
            .copied()
    }

    /// Number of canonical tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate over all tags with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (TagId, &Tag)> {
        self.tags.iter().enumerate().map(|(i, t)| (TagId(i), t))
    }

    /// Rebuild the arena keeping only the tags for which `keep` returns
    /// true. Returns the id remapping (old id → new id) for surviving tags.
    ///
    /// Used by whitelist filtering, which removes tags after consolidation.
    pub fn retain<F>(&mut self, mut keep: F) -> HashMap<TagId, TagId>
    where
        F: FnMut(TagId, &Tag) -> bool,
    {
        let mut remap = HashMap::new();
        let mut tags = Vec::with_capacity(self.tags.len());
        let mut index = HashMap::new();
        for (i, tag) in self.tags.drain(..).enumerate() {
            let old = TagId(i);
            if keep(old, &tag) {
                let new = TagId(tags.len());
                index.insert(tag.key(), new);
                tags.push(tag);
                remap.insert(old, new);
            }
        }
        self.tags = tags;
        self.index = index;
        remap
    }

    /// Rebuild the (lemma, language) index after deserialization.
    ///
    /// The index is skipped by serde; call this before using `add_or_get`
    /// or `find` on a deserialized arena.
    pub fn rebuild_index(&mut self) {
        self.index = self
            .tags
            .iter()
            .enumerate()
            .map(|(i, t)| (t.key(), TagId(i)))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_or_get_deduplicates_by_lemma_and_language() {
        let mut arena = TagArena::new();
        let a = arena.add_or_get(Tag::new("bank", "en").with_pos(vec!["NN".into()]));
        let b = arena.add_or_get(Tag::new("bank", "en").with_pos(vec!["VB".into()]));
        let c = arena.add_or_get(Tag::new("bank", "de"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(arena.len(), 2);

        // POS sets accumulate the union of observed values.
        let tag = arena.get(a).unwrap();
        assert_eq!(tag.pos, vec!["NN".to_string(), "VB".to_string()]);
    }

    #[test]
    fn add_or_get_unions_ne_labels_without_duplicates() {
        let mut arena = TagArena::new();
        let id = arena.add_or_get(Tag::new("IBM", "en").with_ne(vec!["ORGANIZATION".into()]));
        arena.add_or_get(Tag::new("IBM", "en").with_ne(vec!["ORGANIZATION".into()]));
        assert_eq!(arena.get(id).unwrap().ne, vec!["ORGANIZATION".to_string()]);
    }

    #[test]
    fn retain_remaps_surviving_ids() {
        let mut arena = TagArena::new();
        let a = arena.add_or_get(Tag::new("keep", "en"));
        let b = arena.add_or_get(Tag::new("drop", "en"));
        let c = arena.add_or_get(Tag::new("also", "en"));

        let remap = arena.retain(|_, tag| tag.lemma != "drop");
        assert_eq!(arena.len(), 2);
        assert_eq!(remap.get(&a), Some(&TagId(0)));
        assert_eq!(remap.get(&b), None);
        assert_eq!(remap.get(&c), Some(&TagId(1)));
        assert_eq!(arena.find("also", "en"), Some(TagId(1)));
    }

    #[test]
    fn token_id_is_deterministic() {
        assert_eq!(token_id(0, 5, 8, "cat"), token_id(0, 5, 8, "cat"));
        assert_eq!(token_id(1, 0, 3, "IBM"), "103IBM");
        assert_ne!(token_id(0, 5, 8, "cat"), token_id(1, 5, 8, "cat"));
    }
}
