//! CLI argument parsing and command execution for the annograph binary.

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use crate::annotation::DocumentAnnotation;
use crate::config::{PipelineConfig, ProcessingStep};
use crate::engine::Consolidator;
use crate::error::Result;

/// Annotation consolidation CLI
#[derive(Parser)]
#[command(name = "annograph")]
#[command(
    author,
    version,
    about = "Consolidate token-level NLP annotations into a deduplicated document model",
    long_about = r#"
annograph - annotation consolidation engine

Reads an annotated document (sentences, tokens, parse trees, dependency
graphs, coreference chains) as JSON and consolidates it: merges contiguous
named-entity tokens, deduplicates tags across sentences, extracts noun
phrases and typed dependencies, and links coreferent mentions.

EXAMPLES:
  annograph consolidate annotated.json
  annograph consolidate --steps phrase,deps,coref --pretty < annotated.json
  annograph tags --language en annotated.json
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The selected subcommand.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Consolidate an annotated document into the document model
    #[command(visible_alias = "c")]
    Consolidate(ConsolidateArgs),

    /// Print the filtered tag list for the first sentence
    #[command(visible_alias = "t")]
    Tags(TagsArgs),
}

/// Pipeline options shared by all commands.
#[derive(Args)]
pub struct PipelineArgs {
    /// Document language code
    #[arg(short, long, default_value = "en")]
    pub language: String,

    /// Extra processing steps to enable (ner is on by default):
    /// phrase, deps, sentiment, coref
    #[arg(short, long, value_delimiter = ',')]
    pub steps: Vec<String>,

    /// NE labels whose merged runs keep no NE/POS labels
    #[arg(long = "exclude-ner", value_delimiter = ',')]
    pub excluded_ner: Vec<String>,

    /// Keep only tags whose value or lemma appears in this list
    #[arg(short, long, value_delimiter = ',')]
    pub whitelist: Vec<String>,

    /// Custom stopword list; prefix with '+' to extend the default list
    #[arg(long)]
    pub stopwords: Option<String>,

    /// Also test lemmas against the stopword list
    #[arg(long)]
    pub check_lemma: bool,
}

/// Arguments for the `consolidate` command.
#[derive(Args)]
pub struct ConsolidateArgs {
    /// Input annotation JSON file; stdin when omitted
    pub input: Option<PathBuf>,

    /// Pipeline options.
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Pretty-print the output JSON
    #[arg(short, long)]
    pub pretty: bool,
}

/// Arguments for the `tags` command.
#[derive(Args)]
pub struct TagsArgs {
    /// Input annotation JSON file; stdin when omitted
    pub input: Option<PathBuf>,

    /// Pipeline options.
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Pretty-print the output JSON
    #[arg(short, long)]
    pub pretty: bool,
}

impl PipelineArgs {
    /// Build a validated pipeline config from the parsed arguments.
    pub fn to_config(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::new(&self.language)?;
        for step in &self.steps {
            config = config.with_step(ProcessingStep::parse(step)?);
        }
        if !self.excluded_ner.is_empty() {
            config = config.with_excluded_ner(self.excluded_ner.clone());
        }
        if !self.whitelist.is_empty() {
            config = config.with_whitelist(self.whitelist.clone());
        }
        if let Some(stopwords) = &self.stopwords {
            config = config.with_stopword_list(stopwords, self.check_lemma);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Parse arguments and run the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Consolidate(args) => consolidate(&args),
        Commands::Tags(args) => tags(&args),
    }
}

fn consolidate(args: &ConsolidateArgs) -> Result<()> {
    let annotation = read_annotation(args.input.as_deref())?;
    let consolidator = Consolidator::new(args.pipeline.to_config()?)?;

    log::info!(
        "consolidating {} sentence(s), {} coref chain(s)",
        annotation.sentences.len(),
        annotation.coref_chains.len()
    );
    let document = consolidator.consolidate(&annotation);

    write_json(&document, args.pretty)
}

fn tags(args: &TagsArgs) -> Result<()> {
    let annotation = read_annotation(args.input.as_deref())?;
    let consolidator = Consolidator::new(args.pipeline.to_config()?)?;
    let tags = consolidator.sentence_tags(&annotation);
    write_json(&tags, args.pretty)
}

fn read_annotation(input: Option<&std::path::Path>) -> Result<DocumentAnnotation> {
    let raw = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    Ok(serde_json::from_str(&raw)?)
}

fn write_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}
