//! phonops-correct: phonetic correction of transcribed text against a lexicon.
//!
//! Short spans of ASR output (names, jargon) are compared with reference
//! entries by phonetic distance and replaced in place when close enough.
//!
//! # Architecture
//!
//! - [`traits::Phonemizer`]: grapheme-to-phone collaborator, supplied by the caller
//! - [`distance`], [`prosody`], [`aggregate`]: segmental, tone and stress
//!   distances and their weighted combination
//! - [`window`]: candidate spans of the hypothesis text per entry
//! - [`matcher::Corrector`]: scoring, threshold filtering and greedy
//!   non-overlapping resolution
//!
//! # Quick Start
//!
//! ```ignore
//! use phonops_correct::config::CorrectorConfig;
//! use phonops_correct::dictionary::DictionaryPhonemizer;
//! use phonops_correct::lexicon::Lexicon;
//! use phonops_correct::matcher::Corrector;
//!
//! let phonemizer = DictionaryPhonemizer::from_path("dictionary.json")?;
//! let corrector = Corrector::new(CorrectorConfig::default(), phonemizer)?;
//! let lexicon = Lexicon::load("lexicon.json", &corrector)?;
//!
//! let result = corrector.correct("I flew to mango last year", &lexicon)?;
//! println!("{}", result.text);
//! ```

pub mod aggregate;
pub mod config;
pub mod dictionary;
pub mod distance;
pub mod error;
pub mod lexicon;
pub mod matcher;
pub mod prosody;
pub mod text;
pub mod traits;
pub mod types;
pub mod window;
