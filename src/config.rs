//! Pipeline configuration.
//!
//! The consolidation engine consumes a declarative, typed configuration:
//! which processing steps run, which NE labels are excluded from tagging,
//! an optional whitelist of allowed values, and the stopword list. Every
//! recognized step is a [`ProcessingStep`] variant; there are no
//! string-keyed flags.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A recognized processing step of the consolidation pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStep {
    /// NE-label-driven token merging. Enabled by default.
    Ner,
    /// Noun-phrase extraction from constituency trees.
    Phrase,
    /// Typed-dependency extraction from dependency graphs.
    Dependency,
    /// Sentiment score aggregation.
    Sentiment,
    /// Cross-sentence coreference linking.
    Coref,
    /// Whitelist filtering of tag occurrences.
    Whitelist,
}

impl ProcessingStep {
    /// Parse a step name (as accepted on the CLI).
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "ner" => Ok(ProcessingStep::Ner),
            "phrase" => Ok(ProcessingStep::Phrase),
            "dependency" | "deps" => Ok(ProcessingStep::Dependency),
            "sentiment" => Ok(ProcessingStep::Sentiment),
            "coref" => Ok(ProcessingStep::Coref),
            "whitelist" => Ok(ProcessingStep::Whitelist),
            other => Err(Error::invalid_config(format!(
                "unknown processing step: {other:?}"
            ))),
        }
    }
}

/// Typed configuration for one consolidation pipeline.
///
/// # Example
///
/// ```rust
/// use annograph::config::{PipelineConfig, ProcessingStep};
///
/// let config = PipelineConfig::new("en")
///     .unwrap()
///     .with_step(ProcessingStep::Phrase)
///     .with_step(ProcessingStep::Coref)
///     .with_excluded_ner(vec!["CAUSE_OF_DEATH".into()]);
///
/// assert!(config.has_step(ProcessingStep::Ner));
/// assert!(config.has_step(ProcessingStep::Coref));
/// assert!(!config.has_step(ProcessingStep::Sentiment));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Language code attached to every produced tag.
    pub language: String,
    /// Enabled processing steps.
    steps: BTreeSet<ProcessingStep>,
    /// NE labels excluded from tag labeling (merged surface text is kept).
    #[serde(default)]
    pub excluded_ner: Vec<String>,
    /// Allowed surface/lemma values; occurrences matching neither are removed.
    #[serde(default)]
    pub whitelist: Option<Vec<String>>,
    /// Stopword list spec (see [`crate::stopwords::expand_stopword_list`]).
    #[serde(default)]
    pub stopword_list: Option<String>,
    /// Whether the stopword oracle also checks lemmas.
    #[serde(default)]
    pub check_lemma: bool,
}

impl PipelineConfig {
    /// Create a configuration for a language, with NER merging enabled.
    ///
    /// Fails when the language code is empty.
    pub fn new(language: impl Into<String>) -> Result<Self> {
        let language = language.into();
        if language.trim().is_empty() {
            return Err(Error::invalid_config("language code must not be empty"));
        }
        let mut steps = BTreeSet::new();
        steps.insert(ProcessingStep::Ner);
        Ok(Self {
            language,
            steps,
            excluded_ner: Vec::new(),
            whitelist: None,
            stopword_list: None,
            check_lemma: false,
        })
    }

    /// Enable a processing step.
    #[must_use]
    pub fn with_step(mut self, step: ProcessingStep) -> Self {
        self.steps.insert(step);
        self
    }

    /// Disable a processing step.
    #[must_use]
    pub fn without_step(mut self, step: ProcessingStep) -> Self {
        self.steps.remove(&step);
        self
    }

    /// Set the excluded NE labels.
    #[must_use]
    pub fn with_excluded_ner(mut self, labels: Vec<String>) -> Self {
        self.excluded_ner = labels;
        self
    }

    /// Set the whitelist and enable whitelist filtering.
    #[must_use]
    pub fn with_whitelist(mut self, values: Vec<String>) -> Self {
        self.whitelist = Some(values);
        self.steps.insert(ProcessingStep::Whitelist);
        self
    }

    /// Set the stopword list spec.
    #[must_use]
    pub fn with_stopword_list(mut self, list: impl Into<String>, check_lemma: bool) -> Self {
        self.stopword_list = Some(list.into());
        self.check_lemma = check_lemma;
        self
    }

    /// Is a step enabled?
    #[must_use]
    pub fn has_step(&self, step: ProcessingStep) -> bool {
        self.steps.contains(&step)
    }

    /// Is an NE label excluded from tag labeling?
    #[must_use]
    pub fn is_excluded_ner(&self, label: &str) -> bool {
        self.excluded_ner.iter().any(|l| l == label)
    }

    /// Validate invariants that `with_*` calls cannot express.
    ///
    /// Whitelist filtering requires a non-empty whitelist.
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(Error::invalid_config("language code must not be empty"));
        }
        if self.has_step(ProcessingStep::Whitelist) {
            let empty = self
                .whitelist
                .as_ref()
                .map_or(true, |w| w.iter().all(|v| v.trim().is_empty()));
            if empty {
                return Err(Error::invalid_config(
                    "whitelist step enabled but no whitelist values given",
                ));
            }
        }
        Ok(())
    }
}
