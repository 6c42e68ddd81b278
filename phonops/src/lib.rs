//! phonops: command-line phonetic correction of speech-to-text output.

pub mod cli;
pub mod config;
pub mod correct;
pub mod distance;
