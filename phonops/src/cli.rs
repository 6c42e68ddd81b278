//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use eyre::Result;
use phonops_correct::window::LengthMeasure;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "phon")]
#[command(about = "Phonetic correction of speech-to-text output against a lexicon")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replace phonetically close spans with lexicon entries
    Correct(crate::correct::Args),

    /// List every below-threshold candidate without applying it
    Suggest(crate::correct::Args),

    /// Show the phonetic distance between two strings
    Distance(crate::distance::Args),
}

/// Window length unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Measure {
    /// Content tokens (Han characters, words)
    Tokens,
    /// Phonetic units
    Phones,
}

impl From<Measure> for LengthMeasure {
    fn from(measure: Measure) -> Self {
        match measure {
            Measure::Tokens => LengthMeasure::Tokens,
            Measure::Phones => LengthMeasure::Phones,
        }
    }
}

/// Options shared by every subcommand that builds a corrector.
#[derive(clap::Args, Clone, Debug)]
pub struct CorrectorArgs {
    /// Pronunciation dictionary (JSON)
    #[arg(short, long)]
    pub dictionary: PathBuf,

    /// Corrector settings (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Acceptance threshold on the total distance
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Window length tolerance
    #[arg(long)]
    pub tolerance: Option<usize>,

    /// Window length unit
    #[arg(long, value_enum)]
    pub measure: Option<Measure>,
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Correct(args) => crate::correct::execute(args.try_into()?),
        Commands::Suggest(args) => crate::correct::execute_suggest(args.try_into()?),
        Commands::Distance(args) => crate::distance::execute(args.try_into()?),
    }
}
