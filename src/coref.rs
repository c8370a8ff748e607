//! Cross-sentence coreference linking.
//!
//! Consumes document-level mention chains and links each mention's phrase
//! occurrence to the chain representative's occurrence via a [`PhraseRef`]
//! foreign key. Runs strictly after all sentences' phrase occurrences
//! exist; every failure mode here is recoverable and logged, never fatal.
//!
//! Token-index resolution keeps the annotator's convention: a mention's
//! first token is `tokens[start_index - 1]` and its last is
//! `tokens[end_index - 2]` (the end index is exclusive of one extra token).
//! This looks like it could drop the final token of a mention, but it
//! mirrors the annotator's chain format exactly; "fixing" it here would
//! mis-span every mention.

use crate::annotation::{CorefMention, DocumentAnnotation};
use crate::document::{Document, PhraseRef};

/// Resolve all coreference chains of `annotation` against `document`,
/// setting mention phrase occurrences' `reference` to their representative.
pub fn resolve_coreferences(annotation: &DocumentAnnotation, document: &mut Document) {
    for chain in &annotation.coref_chains {
        let representative = &chain.representative;
        let Some(rep_ref) = mention_span(representative, annotation) else {
            continue;
        };
        if document
            .sentence(rep_ref.sentence)
            .and_then(|s| s.phrase_occurrence(rep_ref.begin, rep_ref.end))
            .is_none()
        {
            log::warn!(
                "representative phrase not found: {:?}",
                representative.span
            );
            continue;
        }

        for mention in &chain.mentions {
            if mention == representative {
                continue;
            }
            let Some(mention_ref) = mention_span(mention, annotation) else {
                continue;
            };
            let occurrence = document
                .sentence_mut(mention_ref.sentence)
                .and_then(|s| s.phrase_occurrence_mut(mention_ref.begin, mention_ref.end));
            match occurrence {
                Some(occurrence) => occurrence.reference = Some(rep_ref),
                None => log::warn!("mention phrase not found: {:?}", mention.span),
            }
        }
    }
}

/// Resolve a mention's token-index span to a character-offset [`PhraseRef`].
///
/// Returns `None` (with a diagnostic) when the mention's indices fall
/// outside the sentence's token list.
fn mention_span(mention: &CorefMention, annotation: &DocumentAnnotation) -> Option<PhraseRef> {
    let Some(sentence) = annotation.sentences.get(mention.sentence_index) else {
        log::warn!(
            "mention sentence {} out of range: {:?}",
            mention.sentence_index,
            mention.span
        );
        return None;
    };
    let tokens = &sentence.tokens;
    if mention.end_index.saturating_sub(1) > tokens.len() {
        log::debug!(
            "mention span exceeds sentence tokens ({} > {}): {:?}",
            mention.end_index - 1,
            tokens.len(),
            mention.span
        );
        return None;
    }
    let first = mention.start_index.checked_sub(1)?;
    let last = mention.end_index.checked_sub(2)?;
    let begin = tokens.get(first)?.begin;
    let end = tokens.get(last)?.end;
    Some(PhraseRef {
        sentence: mention.sentence_index,
        begin,
        end,
    })
}
