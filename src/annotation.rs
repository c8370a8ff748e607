//! Input boundary types for the external linguistic annotator.
//!
//! The annotator itself (tokenization, POS tagging, NER, parsing,
//! coreference, sentiment) is a black box. Its output arrives here as plain
//! data: an ordered token stream per sentence, plus optional constituency
//! trees, dependency graphs, document-level coreference chains, and
//! per-sentence sentiment classes. All structures deserialize from JSON so
//! pre-annotated documents can be loaded from disk.
//!
//! Missing optional structures (no tree, no graph, no chains) mean "nothing
//! to extract" and are never an error.

use serde::{Deserialize, Serialize};

/// The background NE symbol: a token carrying it belongs to no entity.
pub const BACKGROUND_SYMBOL: &str = "O";

/// A single annotated token within a sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenAnnotation {
    /// Begin character offset into the sentence text.
    pub begin: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// Surface text of the token (possibly normalized by the annotator).
    pub text: String,
    /// Original text exactly as it appeared in the input.
    pub original_text: String,
    /// Whitespace (or other characters) between the previous token and this one.
    #[serde(default)]
    pub before: String,
    /// Lemma; absent when the annotator could not lemmatize.
    #[serde(default)]
    pub lemma: Option<String>,
    /// Part-of-speech label.
    #[serde(default)]
    pub pos: Option<String>,
    /// NE label; absent or [`BACKGROUND_SYMBOL`] means "no entity".
    #[serde(default)]
    pub ne: Option<String>,
}

impl TokenAnnotation {
    /// Create a token with offsets and surface text; annotations default to empty.
    #[must_use]
    pub fn new(begin: usize, end: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            begin,
            end,
            original_text: text.clone(),
            text,
            before: String::new(),
            lemma: None,
            pos: None,
            ne: None,
        }
    }

    /// Set the lemma.
    #[must_use]
    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    /// Set the POS label.
    #[must_use]
    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    /// Set the NE label.
    #[must_use]
    pub fn with_ne(mut self, ne: impl Into<String>) -> Self {
        self.ne = Some(ne.into());
        self
    }

    /// Set the inter-token "before" text.
    #[must_use]
    pub fn with_before(mut self, before: impl Into<String>) -> Self {
        self.before = before.into();
        self
    }

    /// The NE label, with absence normalized to the background symbol.
    #[must_use]
    pub fn ne_or_background(&self) -> &str {
        self.ne.as_deref().unwrap_or(BACKGROUND_SYMBOL)
    }
}

/// A node of a constituency parse tree.
///
/// `leaves` is the node's terminal yield in textual order; a node with no
/// children and a single leaf is a terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    /// Constituent label (e.g. `NP`, `VP`, `NP-TMP`).
    pub label: String,
    /// Child nodes, in order.
    #[serde(default)]
    pub children: Vec<TreeNode>,
    /// Terminal yield of this node.
    #[serde(default)]
    pub leaves: Vec<LeafWord>,
}

impl TreeNode {
    /// Create an interior node.
    #[must_use]
    pub fn node(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        let leaves = children.iter().flat_map(|c| c.leaves.clone()).collect();
        Self {
            label: label.into(),
            children,
            leaves,
        }
    }

    /// Create a terminal node for a single word.
    #[must_use]
    pub fn leaf(label: impl Into<String>, word: impl Into<String>, begin: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
            leaves: vec![LeafWord {
                word: word.into(),
                begin,
                end,
            }],
        }
    }

    /// Is this a terminal node?
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A leaf token of a constituency tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafWord {
    /// Surface word.
    pub word: String,
    /// Begin character offset into the sentence text.
    pub begin: usize,
    /// End character offset (exclusive).
    pub end: usize,
}

/// A token endpoint of a dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyToken {
    /// Begin character offset.
    pub begin: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// Lemma of the token.
    pub lemma: String,
}

/// A directed edge of a token dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Governor token.
    pub source: DependencyToken,
    /// Dependent token.
    pub target: DependencyToken,
    /// Relation short name (e.g. `nsubj`, `dobj`).
    pub relation: String,
    /// Optional relation qualifier (e.g. the preposition of `nmod`).
    #[serde(default)]
    pub qualifier: Option<String>,
}

/// A token-level dependency graph for one sentence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyGraph {
    /// Root tokens of the graph.
    #[serde(default)]
    pub roots: Vec<DependencyToken>,
    /// Edges of the graph.
    #[serde(default)]
    pub edges: Vec<DependencyEdge>,
}

/// One mention inside a coreference chain.
///
/// `sentence_index` is zero-based. `start_index`/`end_index` keep the
/// annotator's one-based token-index convention, with `end_index` exclusive
/// of one extra token: the first token of the mention is
/// `tokens[start_index - 1]` and the last is `tokens[end_index - 2]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorefMention {
    /// Zero-based index of the sentence containing the mention.
    pub sentence_index: usize,
    /// One-based index of the first mention token.
    pub start_index: usize,
    /// One-past-one-based index of the last mention token.
    pub end_index: usize,
    /// Surface span of the mention, for diagnostics.
    pub span: String,
}

/// A document-level coreference chain: one representative plus its mentions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorefChainAnnotation {
    /// The representative mention of the chain.
    pub representative: CorefMention,
    /// All mentions of the chain, in textual order (may include the representative).
    pub mentions: Vec<CorefMention>,
}

/// All annotator output for one sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceAnnotation {
    /// Raw sentence text.
    pub text: String,
    /// Ordered token stream.
    pub tokens: Vec<TokenAnnotation>,
    /// Constituency parse tree, when the parser ran.
    #[serde(default)]
    pub tree: Option<TreeNode>,
    /// Dependency graph, when the dependency parser ran.
    #[serde(default)]
    pub dependencies: Option<DependencyGraph>,
    /// Sentiment class (small integer), when the sentiment annotator ran.
    #[serde(default)]
    pub sentiment: Option<i32>,
}

impl SentenceAnnotation {
    /// Create a sentence annotation from text and tokens.
    #[must_use]
    pub fn new(text: impl Into<String>, tokens: Vec<TokenAnnotation>) -> Self {
        Self {
            text: text.into(),
            tokens,
            tree: None,
            dependencies: None,
            sentiment: None,
        }
    }

    /// Attach a constituency tree.
    #[must_use]
    pub fn with_tree(mut self, tree: TreeNode) -> Self {
        self.tree = Some(tree);
        self
    }

    /// Attach a dependency graph.
    #[must_use]
    pub fn with_dependencies(mut self, graph: DependencyGraph) -> Self {
        self.dependencies = Some(graph);
        self
    }

    /// Attach a sentiment class.
    #[must_use]
    pub fn with_sentiment(mut self, sentiment: i32) -> Self {
        self.sentiment = Some(sentiment);
        self
    }
}

/// All annotator output for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnnotation {
    /// Sentences in document order.
    pub sentences: Vec<SentenceAnnotation>,
    /// Document-level coreference chains, when the coref annotator ran.
    #[serde(default)]
    pub coref_chains: Vec<CorefChainAnnotation>,
}

impl DocumentAnnotation {
    /// Create a document annotation from sentences.
    #[must_use]
    pub fn new(sentences: Vec<SentenceAnnotation>) -> Self {
        Self {
            sentences,
            coref_chains: Vec::new(),
        }
    }

    /// Attach coreference chains.
    #[must_use]
    pub fn with_coref_chains(mut self, chains: Vec<CorefChainAnnotation>) -> Self {
        self.coref_chains = chains;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ne_defaults_to_background() {
        let token = TokenAnnotation::new(0, 4, "test");
        assert_eq!(token.ne_or_background(), BACKGROUND_SYMBOL);

        let token = token.with_ne("PERSON");
        assert_eq!(token.ne_or_background(), "PERSON");
    }

    #[test]
    fn interior_node_collects_leaf_yield() {
        let np = TreeNode::node(
            "NP",
            vec![
                TreeNode::leaf("DT", "the", 0, 3),
                TreeNode::leaf("NN", "cat", 4, 7),
            ],
        );
        assert_eq!(np.leaves.len(), 2);
        assert_eq!(np.leaves[0].word, "the");
        assert_eq!(np.leaves[1].end, 7);
        assert!(!np.is_leaf());
    }

    #[test]
    fn document_annotation_roundtrips_through_json() {
        let doc = DocumentAnnotation::new(vec![SentenceAnnotation::new(
            "IBM is here.",
            vec![
                TokenAnnotation::new(0, 3, "IBM")
                    .with_lemma("IBM")
                    .with_pos("NNP")
                    .with_ne("ORGANIZATION"),
                TokenAnnotation::new(4, 6, "is").with_lemma("be").with_before(" "),
            ],
        )]);

        let json = serde_json::to_string(&doc).unwrap();
        let back: DocumentAnnotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sentences.len(), 1);
        assert_eq!(back.sentences[0].tokens[0].ne_or_background(), "ORGANIZATION");
        assert_eq!(back.sentences[0].tokens[1].before, " ");
    }
}
