//! Typed-dependency extraction from token dependency graphs.
//!
//! Every root of the graph yields a synthetic `ROOT` self-loop; every edge
//! yields a [`TypedDependency`] keyed by synthetic token ids, so the same
//! underlying token correlates with the ids produced by the token merger.
//! Edges are emitted in a stable order: sorted by source span, then target
//! span.

use crate::annotation::{DependencyEdge, DependencyGraph};
use crate::document::{Sentence, TypedDependency};
use crate::tag::token_id;

/// Extract typed dependencies from a sentence's dependency graph into the
/// sentence. A missing graph means nothing to extract.
pub fn extract_dependencies(graph: Option<&DependencyGraph>, sentence: &mut Sentence) {
    let Some(graph) = graph else {
        return;
    };

    for root in &graph.roots {
        let id = token_id(sentence.index, root.begin, root.end, &root.lemma);
        sentence.add_typed_dependency(TypedDependency::new(id.clone(), id, "ROOT", None));
    }

    let mut edges: Vec<&DependencyEdge> = graph.edges.iter().collect();
    edges.sort_by_key(|e| (e.source.begin, e.source.end, e.target.begin, e.target.end));

    for edge in edges {
        let source = token_id(sentence.index, edge.source.begin, edge.source.end, &edge.source.lemma);
        let target = token_id(sentence.index, edge.target.begin, edge.target.end, &edge.target.lemma);
        sentence.add_typed_dependency(TypedDependency::new(
            source,
            target,
            edge.relation.clone(),
            edge.qualifier.clone(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::DependencyToken;

    fn tok(begin: usize, end: usize, lemma: &str) -> DependencyToken {
        DependencyToken {
            begin,
            end,
            lemma: lemma.to_string(),
        }
    }

    fn edge(source: DependencyToken, target: DependencyToken, rel: &str) -> DependencyEdge {
        DependencyEdge {
            source,
            target,
            relation: rel.to_string(),
            qualifier: None,
        }
    }

    #[test]
    fn roots_become_self_loops() {
        let graph = DependencyGraph {
            roots: vec![tok(4, 9, "write")],
            edges: vec![],
        };
        let mut sentence = Sentence::new("", 2);
        extract_dependencies(Some(&graph), &mut sentence);

        assert_eq!(sentence.dependencies.len(), 1);
        let root = &sentence.dependencies[0];
        assert_eq!(root.relation, "ROOT");
        assert_eq!(root.source, root.target);
        assert_eq!(root.source, "249write");
        assert!(root.qualifier.is_none());
    }

    #[test]
    fn edges_are_emitted_in_span_order() {
        let graph = DependencyGraph {
            roots: vec![],
            edges: vec![
                edge(tok(10, 14, "sit"), tok(15, 18, "mat"), "nmod"),
                edge(tok(0, 3, "cat"), tok(4, 9, "black"), "amod"),
            ],
        };
        let mut sentence = Sentence::new("", 0);
        extract_dependencies(Some(&graph), &mut sentence);

        assert_eq!(sentence.dependencies[0].relation, "amod");
        assert_eq!(sentence.dependencies[1].relation, "nmod");
    }

    #[test]
    fn qualifier_is_carried_verbatim() {
        let graph = DependencyGraph {
            roots: vec![],
            edges: vec![DependencyEdge {
                source: tok(0, 3, "sit"),
                target: tok(7, 10, "mat"),
                relation: "nmod".to_string(),
                qualifier: Some("on".to_string()),
            }],
        };
        let mut sentence = Sentence::new("", 0);
        extract_dependencies(Some(&graph), &mut sentence);
        assert_eq!(sentence.dependencies[0].qualifier.as_deref(), Some("on"));
    }

    #[test]
    fn ids_match_the_token_merger_derivation() {
        let graph = DependencyGraph {
            roots: vec![],
            edges: vec![edge(tok(0, 3, "IBM"), tok(4, 6, "be"), "nsubj")],
        };
        let mut sentence = Sentence::new("", 1);
        extract_dependencies(Some(&graph), &mut sentence);

        assert_eq!(sentence.dependencies[0].source, token_id(1, 0, 3, "IBM"));
        assert_eq!(sentence.dependencies[0].target, token_id(1, 4, 6, "be"));
    }

    #[test]
    fn missing_graph_extracts_nothing() {
        let mut sentence = Sentence::new("", 0);
        extract_dependencies(None, &mut sentence);
        assert!(sentence.dependencies.is_empty());
    }
}
