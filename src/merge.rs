//! The token merger: per-sentence consolidation of the raw token stream
//! into [`TagOccurrence`]s backed by canonical [`Tag`]s.
//!
//! Consecutive tokens sharing the same non-background NE label merge into a
//! single occurrence spanning the whole run, with the surface text being the
//! raw concatenation of the tokens' original text including inter-token
//! whitespace. Background tokens become single-token occurrences unless the
//! stopword oracle excludes them. Tokens whose lemma fails the validity
//! filter flush any pending run and are dropped.
//!
//! The accumulator is an explicit state enum ([`MergeState`]) folded over
//! the token stream; there is no shared mutable holder object.

use crate::annotation::{TokenAnnotation, BACKGROUND_SYMBOL};
use crate::config::PipelineConfig;
use crate::document::Sentence;
use crate::lemma::is_valid_lemma;
use crate::stopwords::StopwordOracle;
use crate::tag::{token_id, Tag, TagArena, TagOccurrence};

// =============================================================================
// Merge state
// =============================================================================

/// A pending run of same-labeled entity tokens.
#[derive(Debug, Clone)]
struct Run {
    /// NE label shared by the run's tokens.
    label: String,
    /// POS of the most recent token of the run.
    pos: String,
    /// Begin offset of the first token; fixed once.
    begin: usize,
    /// End offset of the latest token.
    end: usize,
    /// Raw concatenation of the tokens' original text, inter-token
    /// whitespace included. Serves as both lemma and surface of the
    /// flushed tag.
    text: String,
    /// Synthetic ids of the tokens contributed to the run.
    token_ids: Vec<String>,
}

impl Run {
    fn start(label: String, token: &TokenAnnotation, id: String) -> Self {
        Self {
            label,
            pos: token.pos.clone().unwrap_or_default(),
            begin: token.begin,
            end: token.end,
            text: token.original_text.clone(),
            token_ids: vec![id],
        }
    }

    fn extend(&mut self, token: &TokenAnnotation, id: String) {
        self.text.push_str(&token.before);
        self.text.push_str(&token.original_text);
        self.token_ids.push(id);
        self.end = token.end;
        self.pos = token.pos.clone().unwrap_or_default();
    }
}

/// Accumulation state of the merger, per sentence.
#[derive(Debug, Clone)]
enum MergeState {
    /// No pending run.
    Idle,
    /// Accumulating a run of same-labeled entity tokens.
    Accumulating(Run),
}

// =============================================================================
// Token merger
// =============================================================================

/// Merges one sentence's token stream into tag occurrences.
pub struct TokenMerger<'a> {
    config: &'a PipelineConfig,
    stopwords: &'a dyn StopwordOracle,
}

impl<'a> TokenMerger<'a> {
    /// Create a merger for a pipeline configuration and stopword oracle.
    #[must_use]
    pub fn new(config: &'a PipelineConfig, stopwords: &'a dyn StopwordOracle) -> Self {
        Self { config, stopwords }
    }

    /// Consolidate `tokens` into `sentence`, canonicalizing tags against
    /// `arena`.
    ///
    /// Tokens without a lemma are skipped entirely; they neither merge nor
    /// flush. At end of stream any pending run is flushed.
    pub fn merge(
        &self,
        tokens: &[TokenAnnotation],
        sentence: &mut Sentence,
        arena: &mut TagArena,
    ) {
        let ner = self
            .config
            .has_step(crate::config::ProcessingStep::Ner);
        let mut state = MergeState::Idle;

        for token in tokens {
            let Some(lemma) = token.lemma.as_deref() else {
                continue;
            };
            let ne = if ner {
                token.ne_or_background()
            } else {
                BACKGROUND_SYMBOL
            };
            let id = token_id(sentence.index, token.begin, token.end, lemma);
            let background = ne == BACKGROUND_SYMBOL;

            state = match (state, background) {
                // Invalid background token: flush any pending run, drop the token.
                (state, true) if !is_valid_lemma(lemma) => {
                    if let MergeState::Accumulating(run) = state {
                        self.flush(run, sentence, arena);
                    }
                    MergeState::Idle
                }
                // Background token outside a run: single-token occurrence.
                (MergeState::Idle, true) => {
                    self.emit_single(token, &id, sentence, arena);
                    MergeState::Idle
                }
                // Background token ends a run: flush, then single-token occurrence.
                (MergeState::Accumulating(run), true) => {
                    self.flush(run, sentence, arena);
                    self.emit_single(token, &id, sentence, arena);
                    MergeState::Idle
                }
                // Entity token outside a run: open a run.
                (MergeState::Idle, false) => {
                    MergeState::Accumulating(Run::start(ne.to_string(), token, id))
                }
                // Entity token inside a run: extend or relabel.
                (MergeState::Accumulating(mut run), false) => {
                    if run.label == ne {
                        run.extend(token, id);
                        MergeState::Accumulating(run)
                    } else {
                        self.flush(run, sentence, arena);
                        MergeState::Accumulating(Run::start(ne.to_string(), token, id))
                    }
                }
            };
        }

        if let MergeState::Accumulating(run) = state {
            self.flush(run, sentence, arena);
        }
    }

    /// Build the tag for a single (non-merged) token.
    ///
    /// Returns `None` when the stopword oracle excludes the token. When the
    /// lemma case-insensitively equals the surface text, the surface text is
    /// stored verbatim, preserving capitalization of acronyms and
    /// mixed-case tokens. Non-background tokens store the original surface
    /// as lemma.
    #[must_use]
    pub fn single_token_tag(&self, token: &TokenAnnotation) -> Option<Tag> {
        if self
            .stopwords
            .is_excluded(&token.text, token.lemma.as_deref())
        {
            return None;
        }
        let ne = token.ne_or_background();
        let lemma = if ne == BACKGROUND_SYMBOL {
            match token.lemma.as_deref() {
                Some(lemma) if lemma.to_lowercase() == token.text.to_lowercase() => {
                    token.text.clone()
                }
                Some(lemma) => lemma.to_string(),
                None => return None,
            }
        } else {
            token.original_text.clone()
        };

        let mut tag = Tag::new(lemma, self.config.language.clone())
            .with_original(token.original_text.clone())
            .with_ne(vec![ne.to_string()]);
        if let Some(pos) = token.pos.as_deref().filter(|p| !p.is_empty()) {
            tag = tag.with_pos(vec![pos.to_string()]);
        }
        Some(tag)
    }

    fn emit_single(
        &self,
        token: &TokenAnnotation,
        id: &str,
        sentence: &mut Sentence,
        arena: &mut TagArena,
    ) {
        let Some(tag) = self.single_token_tag(token) else {
            return;
        };
        let tag_id = arena.add_or_get(tag);
        sentence.add_tag_occurrence(TagOccurrence::new(
            token.begin,
            token.end,
            token.original_text.clone(),
            vec![id.to_string()],
            tag_id,
        ));
    }

    fn flush(&self, run: Run, sentence: &mut Sentence, arena: &mut TagArena) {
        if run.text.is_empty() {
            return;
        }
        let mut tag = Tag::new(run.text.clone(), self.config.language.clone())
            .with_original(run.text.clone());
        if !self.config.is_excluded_ner(&run.label) {
            tag = tag.with_ne(vec![run.label.clone()]);
            if !run.pos.is_empty() {
                tag = tag.with_pos(vec![run.pos.clone()]);
            }
        }
        let tag_id = arena.add_or_get(tag);
        sentence.add_tag_occurrence(TagOccurrence::new(
            run.begin,
            run.end,
            run.text,
            run.token_ids,
            tag_id,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcessingStep;
    use crate::stopwords::ListStopwords;

    fn token(
        begin: usize,
        text: &str,
        lemma: &str,
        ne: Option<&str>,
        before: &str,
    ) -> TokenAnnotation {
        let mut t = TokenAnnotation::new(begin, begin + text.len(), text)
            .with_lemma(lemma)
            .with_pos("NN")
            .with_before(before);
        if let Some(ne) = ne {
            t = t.with_ne(ne);
        }
        t
    }

    fn merge_with(
        config: &PipelineConfig,
        stopwords: &dyn StopwordOracle,
        tokens: &[TokenAnnotation],
    ) -> (Sentence, TagArena) {
        let mut sentence = Sentence::new("", 0);
        let mut arena = TagArena::new();
        TokenMerger::new(config, stopwords).merge(tokens, &mut sentence, &mut arena);
        (sentence, arena)
    }

    fn en() -> PipelineConfig {
        PipelineConfig::new("en").unwrap()
    }

    #[test]
    fn single_entity_then_background_tokens() {
        // "IBM is a company" with stopwords disabled.
        let tokens = vec![
            token(0, "IBM", "IBM", Some("ORGANIZATION"), ""),
            token(4, "is", "be", None, " "),
            token(7, "a", "a", None, " "),
            token(9, "company", "company", None, " "),
        ];
        let config = en();
        let stop = ListStopwords::empty();
        let (sentence, arena) = merge_with(&config, &stop, &tokens);

        let occurrences: Vec<_> = sentence.iter_tag_occurrences().collect();
        assert_eq!(occurrences.len(), 4);

        let ibm = arena.get(occurrences[0].tag).unwrap();
        assert_eq!(ibm.lemma, "IBM");
        assert_eq!(ibm.ne, vec!["ORGANIZATION".to_string()]);
        assert_eq!(occurrences[0].begin, 0);
        assert_eq!(occurrences[0].end, 3);

        assert_eq!(arena.get(occurrences[1].tag).unwrap().lemma, "be");
        assert_eq!(arena.get(occurrences[2].tag).unwrap().lemma, "a");
        assert_eq!(arena.get(occurrences[3].tag).unwrap().lemma, "company");
    }

    #[test]
    fn multiword_entity_merges_with_whitespace() {
        let tokens = vec![
            token(0, "Barack", "Barack", Some("PERSON"), ""),
            token(7, "Obama", "Obama", Some("PERSON"), " "),
            token(13, "spoke", "speak", None, " "),
        ];
        let (sentence, arena) = merge_with(&en(), &ListStopwords::empty(), &tokens);

        let occurrences: Vec<_> = sentence.iter_tag_occurrences().collect();
        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[0].value, "Barack Obama");
        assert_eq!(occurrences[0].begin, 0);
        assert_eq!(occurrences[0].end, 12);
        assert_eq!(occurrences[0].token_ids.len(), 2);

        let tag = arena.get(occurrences[0].tag).unwrap();
        assert_eq!(tag.lemma, "Barack Obama");
        assert_eq!(tag.ne, vec!["PERSON".to_string()]);
    }

    #[test]
    fn label_transition_flushes_and_reopens() {
        // PERSON run directly followed by ORGANIZATION run, then a third
        // LOCATION run: three separate occurrences.
        let tokens = vec![
            token(0, "Alice", "Alice", Some("PERSON"), ""),
            token(6, "IBM", "IBM", Some("ORGANIZATION"), " "),
            token(10, "Research", "Research", Some("ORGANIZATION"), " "),
            token(19, "Zurich", "Zurich", Some("LOCATION"), " "),
        ];
        let (sentence, arena) = merge_with(&en(), &ListStopwords::empty(), &tokens);

        let occurrences: Vec<_> = sentence.iter_tag_occurrences().collect();
        assert_eq!(occurrences.len(), 3);
        assert_eq!(occurrences[0].value, "Alice");
        assert_eq!(occurrences[1].value, "IBM Research");
        assert_eq!(occurrences[2].value, "Zurich");
        assert_eq!(
            arena.get(occurrences[1].tag).unwrap().ne,
            vec!["ORGANIZATION".to_string()]
        );
        assert_eq!(
            arena.get(occurrences[2].tag).unwrap().ne,
            vec!["LOCATION".to_string()]
        );
    }

    #[test]
    fn same_label_reopens_after_background_flush() {
        // Entity run, background token, then the same label again: the
        // second run is a fresh occurrence, not an extension.
        let tokens = vec![
            token(0, "Paris", "Paris", Some("LOCATION"), ""),
            token(6, "and", "and", None, " "),
            token(10, "Lyon", "Lyon", Some("LOCATION"), " "),
        ];
        let (sentence, arena) = merge_with(&en(), &ListStopwords::empty(), &tokens);

        let occurrences: Vec<_> = sentence.iter_tag_occurrences().collect();
        assert_eq!(occurrences.len(), 3);
        assert_eq!(occurrences[0].value, "Paris");
        assert_eq!(occurrences[2].value, "Lyon");
        assert_ne!(occurrences[0].tag, occurrences[2].tag);
        assert_eq!(
            arena.get(occurrences[2].tag).unwrap().ne,
            vec!["LOCATION".to_string()]
        );
    }

    #[test]
    fn pending_run_flushes_at_end_of_sentence() {
        let tokens = vec![
            token(0, "New", "New", Some("LOCATION"), ""),
            token(4, "York", "York", Some("LOCATION"), " "),
        ];
        let (sentence, _arena) = merge_with(&en(), &ListStopwords::empty(), &tokens);

        let occurrences: Vec<_> = sentence.iter_tag_occurrences().collect();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].value, "New York");
        assert_eq!(occurrences[0].end, 8);
    }

    #[test]
    fn invalid_lemma_flushes_run_and_is_dropped() {
        let tokens = vec![
            token(0, "IBM", "IBM", Some("ORGANIZATION"), ""),
            token(3, ",", ",", None, ""),
            token(5, "works", "work", None, " "),
        ];
        let (sentence, arena) = merge_with(&en(), &ListStopwords::empty(), &tokens);

        let occurrences: Vec<_> = sentence.iter_tag_occurrences().collect();
        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[0].value, "IBM");
        assert_eq!(arena.get(occurrences[1].tag).unwrap().lemma, "work");
        assert!(arena.find(",", "en").is_none());
    }

    #[test]
    fn missing_lemma_is_skipped_without_flushing() {
        let mut broken = TokenAnnotation::new(7, 12, "Obama").with_ne("PERSON");
        broken.before = " ".into();
        // No lemma: the token is invisible to the merger, so the run stays
        // open and the next PERSON token extends it.
        let tokens = vec![
            token(0, "Barack", "Barack", Some("PERSON"), ""),
            broken,
            token(13, "Hussein", "Hussein", Some("PERSON"), " "),
        ];
        let (sentence, _arena) = merge_with(&en(), &ListStopwords::empty(), &tokens);

        let occurrences: Vec<_> = sentence.iter_tag_occurrences().collect();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].value, "Barack Hussein");
        assert_eq!(occurrences[0].token_ids.len(), 2);
    }

    #[test]
    fn excluded_label_merges_but_omits_ne_and_pos() {
        let tokens = vec![
            token(0, "lung", "lung", Some("CAUSE_OF_DEATH"), ""),
            token(5, "cancer", "cancer", Some("CAUSE_OF_DEATH"), " "),
            token(12, "worries", "worry", None, " "),
        ];
        let config = en().with_excluded_ner(vec!["CAUSE_OF_DEATH".into()]);
        let (sentence, arena) = merge_with(&config, &ListStopwords::empty(), &tokens);

        let occurrences: Vec<_> = sentence.iter_tag_occurrences().collect();
        assert_eq!(occurrences[0].value, "lung cancer");
        let tag = arena.get(occurrences[0].tag).unwrap();
        assert_eq!(tag.lemma, "lung cancer");
        assert!(tag.ne.is_empty());
        assert!(tag.pos.is_empty());
    }

    #[test]
    fn stopwords_exclude_single_tokens_only() {
        let tokens = vec![
            token(0, "The", "the", Some("ORGANIZATION"), ""),
            token(4, "Times", "Times", Some("ORGANIZATION"), " "),
            token(10, "the", "the", None, " "),
            token(14, "story", "story", None, " "),
        ];
        let stop = ListStopwords::from_list("the", false);
        let (sentence, _arena) = merge_with(&en(), &stop, &tokens);

        let occurrences: Vec<_> = sentence.iter_tag_occurrences().collect();
        // "The Times" merged (entity run ignores the oracle); bare "the" dropped.
        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[0].value, "The Times");
        assert_eq!(occurrences[1].value, "story");
    }

    #[test]
    fn lemma_matching_surface_case_insensitively_keeps_surface() {
        let tokens = vec![token(0, "NASA", "nasa", None, "")];
        let (_sentence, arena) = merge_with(&en(), &ListStopwords::empty(), &tokens);
        assert!(arena.find("NASA", "en").is_some());
        assert!(arena.find("nasa", "en").is_none());
    }

    #[test]
    fn ner_step_disabled_treats_all_tokens_as_background() {
        let tokens = vec![
            token(0, "Barack", "Barack", Some("PERSON"), ""),
            token(7, "Obama", "Obama", Some("PERSON"), " "),
        ];
        let config = en().without_step(ProcessingStep::Ner);
        let (sentence, _arena) = merge_with(&config, &ListStopwords::empty(), &tokens);

        let occurrences: Vec<_> = sentence.iter_tag_occurrences().collect();
        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[0].value, "Barack");
        assert_eq!(occurrences[1].value, "Obama");
    }

    #[test]
    fn rerun_reuses_existing_tags() {
        let tokens = vec![
            token(0, "IBM", "IBM", Some("ORGANIZATION"), ""),
            token(4, "works", "work", None, " "),
        ];
        let config = en();
        let stop = ListStopwords::empty();
        let merger = TokenMerger::new(&config, &stop);

        let mut arena = TagArena::new();
        let mut first = Sentence::new("", 0);
        merger.merge(&tokens, &mut first, &mut arena);
        let tags_after_first = arena.len();

        let mut second = Sentence::new("", 0);
        merger.merge(&tokens, &mut second, &mut arena);

        assert_eq!(arena.len(), tags_after_first);
        let spans_first: Vec<_> = first.iter_tag_occurrences().map(|o| (o.begin, o.end)).collect();
        let spans_second: Vec<_> = second.iter_tag_occurrences().map(|o| (o.begin, o.end)).collect();
        assert_eq!(spans_first, spans_second);
        let tags_first: Vec<_> = first.iter_tag_occurrences().map(|o| o.tag).collect();
        let tags_second: Vec<_> = second.iter_tag_occurrences().map(|o| o.tag).collect();
        assert_eq!(tags_first, tags_second);
    }

    #[test]
    fn tag_sets_accumulate_across_occurrences() {
        let tokens = vec![
            token(0, "run", "run", None, ""),
            token(4, "runs", "run", None, " "),
        ];
        let mut with_pos = tokens.clone();
        with_pos[0].pos = Some("VB".into());
        with_pos[1].pos = Some("VBZ".into());

        let (_sentence, arena) = merge_with(&en(), &ListStopwords::empty(), &with_pos);
        let id = arena.find("run", "en").unwrap();
        let tag = arena.get(id).unwrap();
        assert_eq!(tag.pos, vec!["VB".to_string(), "VBZ".to_string()]);
    }
}
