//! Distance subcommand - compare two strings phonetically.

use crate::cli::CorrectorArgs;
use crate::config::CorrectorSetup;
use eyre::{Context, Result};
use phonops_correct::types::DistanceBreakdown;

/// CLI arguments for distance.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// First string
    pub a: String,

    /// Second string
    pub b: String,

    /// Print JSON instead of plain text
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub corrector: CorrectorArgs,
}

/// Resolved configuration for distance.
#[derive(Debug)]
pub struct Config {
    pub a: String,
    pub b: String,
    pub json: bool,
    pub setup: CorrectorSetup,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            a: args.a,
            b: args.b,
            json: args.json,
            setup: args.corrector.try_into()?,
        })
    }
}

/// Transcriptions of both strings and their distance.
#[derive(Debug, serde::Serialize)]
pub struct Report {
    pub a: String,
    pub b: String,
    pub breakdown: DistanceBreakdown,
}

pub fn measure(config: &Config) -> Result<Report> {
    let corrector = config.setup.build()?;

    let transcribe = |text: &str| {
        corrector
            .transcribe(text)
            .wrap_err_with(|| format!("failed to phonemize {text:?}"))
    };

    Ok(Report {
        a: transcribe(&config.a)?,
        b: transcribe(&config.b)?,
        breakdown: corrector.distance(&config.a, &config.b)?,
    })
}

pub fn execute(config: Config) -> Result<()> {
    let report = measure(&config)?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}\t/{}/", config.a, report.a);
        println!("{}\t/{}/", config.b, report.b);
        println!("{}", report.breakdown);
    }

    Ok(())
}
