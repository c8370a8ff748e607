//! Noun-phrase extraction from constituency trees.
//!
//! A recursive walk over the sentence's parse tree. Subtrees labeled `NP`
//! or `NP-TMP` (case-insensitive) are phrase boundaries: the occurrence
//! spans the union of the subtree's leaf tokens and its value is the
//! space-joined leaf words. Recursion continues into the children of a
//! claimed phrase so internally-nested noun phrases are recorded too. Leaf
//! nodes outside any claimed phrase become single-word occurrences.

use crate::annotation::TreeNode;
use crate::document::{Phrase, PhraseOccurrence, Sentence};
use std::collections::BTreeSet;

/// A candidate phrase span, ordered by (begin, end, value).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct PhraseSpan {
    begin: usize,
    end: usize,
    value: String,
}

/// Extract phrase occurrences from a sentence's constituency tree into the
/// sentence. A missing tree means nothing to extract.
pub fn extract_phrases(tree: Option<&TreeNode>, sentence: &mut Sentence) {
    let Some(tree) = tree else {
        return;
    };
    for span in collect_phrases(tree) {
        sentence.add_phrase_occurrence(PhraseOccurrence::new(
            span.begin,
            span.end,
            Phrase::new(span.value),
        ));
    }
}

/// Walk a subtree collecting phrase spans, deduplicated and ordered.
fn collect_phrases(subtree: &TreeNode) -> BTreeSet<PhraseSpan> {
    let mut result = BTreeSet::new();
    inspect_subtree(subtree, &mut result);
    result
}

fn inspect_subtree(subtree: &TreeNode, result: &mut BTreeSet<PhraseSpan>) {
    if is_phrase_label(&subtree.label) {
        if let Some(span) = span_from_leaves(subtree) {
            result.insert(span);
        }
        for child in &subtree.children {
            inspect_subtree(child, result);
        }
    } else if subtree.is_leaf() {
        if let Some(span) = span_from_leaves(subtree) {
            result.insert(span);
        }
    } else {
        for child in &subtree.children {
            inspect_subtree(child, result);
        }
    }
}

fn is_phrase_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("NP") || label.eq_ignore_ascii_case("NP-TMP")
}

fn span_from_leaves(subtree: &TreeNode) -> Option<PhraseSpan> {
    let first = subtree.leaves.first()?;
    let last = subtree.leaves.last()?;
    let value = subtree
        .leaves
        .iter()
        .map(|leaf| leaf.word.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Some(PhraseSpan {
        begin: first.begin,
        end: last.end,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // "The third author wrote it" with an NP over "The third author".
    fn sample_tree() -> TreeNode {
        TreeNode::node(
            "S",
            vec![
                TreeNode::node(
                    "NP",
                    vec![
                        TreeNode::leaf("DT", "The", 0, 3),
                        TreeNode::leaf("JJ", "third", 4, 9),
                        TreeNode::leaf("NN", "author", 10, 16),
                    ],
                ),
                TreeNode::node(
                    "VP",
                    vec![
                        TreeNode::leaf("VBD", "wrote", 17, 22),
                        TreeNode::node("NP", vec![TreeNode::leaf("PRP", "it", 23, 25)]),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn np_subtree_becomes_maximal_phrase() {
        let mut sentence = Sentence::new("The third author wrote it", 0);
        extract_phrases(Some(&sample_tree()), &mut sentence);

        let maximal = sentence.phrase_occurrence(0, 16).expect("NP phrase");
        assert_eq!(maximal.phrase.value, "The third author");
    }

    #[test]
    fn nested_leaves_of_claimed_phrase_are_recorded() {
        let mut sentence = Sentence::new("The third author wrote it", 0);
        extract_phrases(Some(&sample_tree()), &mut sentence);

        // Recursion continues into children of the NP.
        assert!(sentence.phrase_occurrence(0, 3).is_some());
        assert!(sentence.phrase_occurrence(4, 9).is_some());
        assert!(sentence.phrase_occurrence(10, 16).is_some());
    }

    #[test]
    fn leaves_outside_phrases_become_single_words() {
        let mut sentence = Sentence::new("The third author wrote it", 0);
        extract_phrases(Some(&sample_tree()), &mut sentence);

        let wrote = sentence.phrase_occurrence(17, 22).expect("VBD leaf");
        assert_eq!(wrote.phrase.value, "wrote");
        let it = sentence.phrase_occurrence(23, 25).expect("inner NP");
        assert_eq!(it.phrase.value, "it");
    }

    #[test]
    fn temporal_np_label_is_a_phrase_boundary() {
        let tree = TreeNode::node(
            "NP-TMP",
            vec![
                TreeNode::leaf("NNP", "last", 0, 4),
                TreeNode::leaf("NN", "week", 5, 9),
            ],
        );
        let mut sentence = Sentence::new("last week", 0);
        extract_phrases(Some(&tree), &mut sentence);
        assert_eq!(
            sentence.phrase_occurrence(0, 9).unwrap().phrase.value,
            "last week"
        );
    }

    #[test]
    fn phrase_labels_match_case_insensitively() {
        let tree = TreeNode::node("np", vec![TreeNode::leaf("NN", "cats", 0, 4)]);
        let mut sentence = Sentence::new("cats", 0);
        extract_phrases(Some(&tree), &mut sentence);
        assert!(sentence.phrase_occurrence(0, 4).is_some());
    }

    #[test]
    fn missing_tree_extracts_nothing() {
        let mut sentence = Sentence::new("no parse", 0);
        extract_phrases(None, &mut sentence);
        assert!(sentence.phrases.is_empty());
    }

    #[test]
    fn occurrences_are_ordered_by_begin_then_end() {
        let mut sentence = Sentence::new("The third author wrote it", 0);
        extract_phrases(Some(&sample_tree()), &mut sentence);

        let spans: Vec<_> = sentence.phrases.iter().map(|p| (p.begin, p.end)).collect();
        let mut sorted = spans.clone();
        sorted.sort();
        assert_eq!(spans, sorted);
    }

    #[test]
    fn duplicate_spans_are_deduplicated() {
        // Two identical NP nodes over the same leaf.
        let tree = TreeNode::node(
            "S",
            vec![
                TreeNode::node("NP", vec![TreeNode::leaf("NN", "cats", 0, 4)]),
                TreeNode::node("NP", vec![TreeNode::leaf("NN", "cats", 0, 4)]),
            ],
        );
        let mut sentence = Sentence::new("cats", 0);
        extract_phrases(Some(&tree), &mut sentence);
        assert_eq!(sentence.phrases.len(), 1);
    }
}
