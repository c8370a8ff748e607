//! Stopword oracle capability.
//!
//! Single (non-merged) tokens are excluded from tag creation when the
//! caller's stopword oracle flags them. The oracle reports two flags per
//! token: whether the surface word is a stopword, and whether the lemma is.
//! Either flag excludes the token.
//!
//! [`ListStopwords`] is the default implementation, backed by a
//! comma-separated list with the original processor's semantics: a list
//! starting with `+` extends the default English list instead of replacing
//! it, entries are trimmed, and matching is case-insensitive.

use std::collections::HashSet;

/// Default English stopword list.
pub const DEFAULT_STOP_WORDS: &str = "a,an,and,are,as,at,be,but,by,for,if,in,into,is,it,no,not,of,o,on,or,such,that,the,their,then,there,these,they,this,to,was,will,with";

/// Capability supplied by the caller to flag stopwords.
pub trait StopwordOracle: Send + Sync {
    /// Return `(word_is_stopword, lemma_is_stopword)` for a token.
    fn flags(&self, word: &str, lemma: Option<&str>) -> (bool, bool);

    /// Convenience: is the token excluded (either flag set)?
    fn is_excluded(&self, word: &str, lemma: Option<&str>) -> bool {
        let (word_flag, lemma_flag) = self.flags(word, lemma);
        word_flag || lemma_flag
    }
}

/// Stopword oracle backed by an in-memory set.
#[derive(Debug, Clone)]
pub struct ListStopwords {
    words: HashSet<String>,
    check_lemma: bool,
}

impl ListStopwords {
    /// Build from a comma-separated list.
    ///
    /// A list starting with `+` appends to [`DEFAULT_STOP_WORDS`]; otherwise
    /// it replaces it. Entries are trimmed and lowercased.
    #[must_use]
    pub fn from_list(list: &str, check_lemma: bool) -> Self {
        let expanded = expand_stopword_list(list);
        let words = expanded
            .split(',')
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words, check_lemma }
    }

    /// The default English list, without lemma checking.
    #[must_use]
    pub fn default_list() -> Self {
        Self::from_list(DEFAULT_STOP_WORDS, false)
    }

    /// An oracle that never flags anything.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            words: HashSet::new(),
            check_lemma: false,
        }
    }

    /// Number of stopwords in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl StopwordOracle for ListStopwords {
    fn flags(&self, word: &str, lemma: Option<&str>) -> (bool, bool) {
        let word_flag = self.words.contains(&word.to_lowercase());
        let lemma_flag = self.check_lemma
            && lemma.is_some_and(|l| self.words.contains(&l.to_lowercase()));
        (word_flag, lemma_flag)
    }
}

/// Expand a stopword list spec: `+`-prefixed lists extend the default list.
#[must_use]
pub fn expand_stopword_list(list: &str) -> String {
    if let Some(rest) = list.strip_prefix('+') {
        let rest = rest.strip_prefix(',').unwrap_or(rest);
        format!("{DEFAULT_STOP_WORDS},{rest}")
    } else {
        list.to_string()
    }
}
