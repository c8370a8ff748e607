//! Lemma validity filtering.
//!
//! Decides whether a lemma is a content token. Pure punctuation and symbol
//! strings (`(`, `-`, `;`) are rejected, as are the tokenizer's bracket
//! placeholders (`-LRB-`, `-RRB-`, and the square/curly variants).
//! Hyphenated or dotted compounds that contain at least one alphanumeric
//! character ("one-thousandth", "10.13.5") are accepted.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a character outside the Unicode punctuation and symbol classes.
static CONTENT_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{P}\p{S}\s]").expect("content-char regex is valid"));

/// Matches the tokenizer's bracket placeholder tokens.
static BRACKET_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^-[lr][rsc]b-$").expect("bracket-placeholder regex is valid"));

/// Check whether a lemma is a valid content token.
///
/// Returns `true` for the empty string and for any string containing at
/// least one non-punctuation, non-symbol character; `false` for strings made
/// entirely of punctuation/symbols and for bracket placeholders.
///
/// # Example
///
/// ```rust
/// use annograph::lemma::is_valid_lemma;
///
/// assert!(!is_valid_lemma("("));
/// assert!(!is_valid_lemma("-lrb-"));
/// assert!(is_valid_lemma("one-thousandth"));
/// assert!(is_valid_lemma("10.13.5"));
/// ```
#[must_use]
pub fn is_valid_lemma(lemma: &str) -> bool {
    if lemma.is_empty() {
        return true;
    }
    if BRACKET_PLACEHOLDER.is_match(lemma) {
        return false;
    }
    CONTENT_CHAR.is_match(lemma)
}
