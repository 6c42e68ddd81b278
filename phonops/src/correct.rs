//! Correct and suggest subcommands.

use crate::cli::CorrectorArgs;
use crate::config::CorrectorSetup;
use eyre::{Context, Result};
use phonops_correct::lexicon::Lexicon;
use phonops_correct::types::{CorrectionResult, Substitution};
use std::path::PathBuf;
use std::time::Instant;

/// CLI arguments for correction.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Text to correct (default: read from stdin)
    pub text: Option<String>,

    /// Lexicon of reference entries (JSON)
    #[arg(short, long)]
    pub lexicon: PathBuf,

    /// Print JSON instead of plain text
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub corrector: CorrectorArgs,
}

/// Resolved configuration for correction.
#[derive(Debug)]
pub struct Config {
    pub text: String,
    pub lexicon: PathBuf,
    pub json: bool,
    pub setup: CorrectorSetup,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        let text = match args.text {
            Some(text) => text,
            None => std::io::read_to_string(std::io::stdin()).wrap_err("failed to read stdin")?,
        };

        Ok(Self {
            text,
            lexicon: args.lexicon,
            json: args.json,
            setup: args.corrector.try_into()?,
        })
    }
}

/// Run one correction pass.
pub fn correct(config: &Config) -> Result<CorrectionResult> {
    let corrector = config.setup.build()?;
    let lexicon = Lexicon::load(&config.lexicon, &corrector)
        .wrap_err_with(|| format!("failed to load lexicon: {}", config.lexicon.display()))?;

    let s = Instant::now();

    let result = corrector
        .correct(&config.text, &lexicon)
        .wrap_err("correction failed")?;

    tracing::info!(
        substitutions = result.substitutions.len(),
        duration = ?s.elapsed(),
        "correction completed"
    );

    Ok(result)
}

/// List every below-threshold candidate in resolution order.
pub fn suggest(config: &Config) -> Result<Vec<Substitution>> {
    let corrector = config.setup.build()?;
    let lexicon = Lexicon::load(&config.lexicon, &corrector)
        .wrap_err_with(|| format!("failed to load lexicon: {}", config.lexicon.display()))?;

    let candidates = corrector
        .suggest(&config.text, &lexicon)
        .wrap_err("suggestion failed")?;

    Ok(candidates
        .iter()
        .map(|c| c.substitution(&config.text))
        .collect())
}

pub fn execute(config: Config) -> Result<()> {
    let result = correct(&config)?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for sub in &result.substitutions {
            tracing::info!(
                span = %sub.span,
                original = %sub.original,
                replacement = %sub.replacement,
                total = sub.breakdown.total,
                "substituted"
            );
        }
        println!("{}", result.text);
    }

    Ok(())
}

pub fn execute_suggest(config: Config) -> Result<()> {
    let suggestions = suggest(&config)?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else {
        for sub in &suggestions {
            println!(
                "{}\t{}\t{}\t{}",
                sub.span, sub.original, sub.replacement, sub.breakdown
            );
        }
    }

    Ok(())
}
