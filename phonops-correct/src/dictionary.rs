//! Pronunciation-dictionary phonemizer.
//!
//! Dictionary files are JSON:
//!
//! ```json
//! {
//!   "features": { "m": [-1, 1, 1], "a": [1, 1, -1] },
//!   "languages": {
//!     "zh": { "美": "m ei3", "国": "k uo2" },
//!     "en": { "mango": "ˈm æ ŋ ɡ oʊ" }
//!   }
//! }
//! ```
//!
//! A phone is written as an optional stress mark (`ˈ` primary, `ˌ`
//! secondary), a label, and an optional tone digit `1`-`5` (`5` is neutral).

use crate::error::{PhonemizerError, Result};
use crate::text::tokenize;
use crate::traits::Phonemizer;
use crate::types::{PhoneticSequence, PhoneticUnit, Stress, Tone};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DictionaryFile {
    #[serde(default)]
    features: HashMap<String, Vec<f64>>,
    languages: HashMap<String, HashMap<String, String>>,
}

/// Parse one phone such as `ˈa`, `ei3` or `ʂʅ5`.
pub fn parse_phone(notation: &str) -> Option<PhoneticUnit> {
    let mut rest = notation.trim();
    let mut stress = None;

    if let Some(first) = rest.chars().next()
        && let Some(mark) = Stress::from_mark(first)
    {
        stress = Some(mark);
        rest = &rest[first.len_utf8()..];
    }

    let mut tone = None;
    if let Some(last) = rest.chars().last()
        && let Some(t) = last.to_digit(10).and_then(|d| Tone::from_digit(d as u8))
        && rest.len() > 1
    {
        tone = Some(t);
        rest = &rest[..rest.len() - 1];
    }

    if rest.is_empty() {
        return None;
    }

    let mut unit = PhoneticUnit::new(rest);
    unit.tone = tone;
    unit.stress = stress;
    Some(unit)
}

/// Parse a space-separated pronunciation.
pub fn parse_pronunciation(notation: &str) -> Option<PhoneticSequence> {
    notation.split_whitespace().map(parse_phone).collect()
}

/// Deterministic phonemizer over per-language pronunciation tables.
///
/// Lookup is case-insensitive. A text missing from the table is looked up
/// token by token; any token still missing is an error.
#[derive(Clone, Debug, Default)]
pub struct DictionaryPhonemizer {
    features: HashMap<String, Vec<f64>>,
    languages: HashMap<String, HashMap<String, PhoneticSequence>>,
}

impl DictionaryPhonemizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a feature vector to every phone labelled `label`.
    pub fn with_features(mut self, label: impl Into<String>, features: Vec<f64>) -> Self {
        self.features.insert(label.into(), features);
        self
    }

    /// Add a pronunciation, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`PhonemizerError::Malformed`] if `pronunciation` is empty or
    /// has an empty phone.
    pub fn insert(
        &mut self,
        language: &str,
        token: &str,
        pronunciation: &str,
    ) -> std::result::Result<(), PhonemizerError> {
        let sequence = parse_pronunciation(pronunciation)
            .filter(|seq| !seq.is_empty())
            .ok_or_else(|| PhonemizerError::Malformed {
                text: token.to_owned(),
                reason: format!("bad pronunciation {pronunciation:?}"),
            })?;

        self.languages
            .entry(language.to_owned())
            .or_default()
            .insert(token.to_lowercase(), sequence);

        Ok(())
    }

    pub fn with_entry(
        mut self,
        language: &str,
        token: &str,
        pronunciation: &str,
    ) -> std::result::Result<Self, PhonemizerError> {
        self.insert(language, token, pronunciation)?;
        Ok(self)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: DictionaryFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let file: DictionaryFile = serde_json::from_reader(reader)?;

        let dictionary = Self::from_file(file)?;
        tracing::debug!(
            path = %path.display(),
            languages = dictionary.languages.len(),
            "loaded pronunciation dictionary"
        );

        Ok(dictionary)
    }

    fn from_file(file: DictionaryFile) -> Result<Self> {
        let mut dictionary = Self {
            features: file.features,
            languages: HashMap::new(),
        };

        for (language, entries) in &file.languages {
            for (token, pronunciation) in entries {
                dictionary.insert(language, token, pronunciation)?;
            }
        }

        Ok(dictionary)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    fn lookup(
        &self,
        table: &HashMap<String, PhoneticSequence>,
        text: &str,
        chars: std::ops::Range<usize>,
    ) -> Option<impl Iterator<Item = PhoneticUnit>> {
        let sequence = table.get(&text.to_lowercase())?;

        Some(sequence.units().iter().map(move |unit| {
            let unit = unit.clone().with_source(chars.clone());
            match self.features.get(&unit.label) {
                Some(features) => unit.with_features(features.clone()),
                None => unit,
            }
        }))
    }
}

impl Phonemizer for DictionaryPhonemizer {
    fn phonemize(
        &self,
        text: &str,
        language: &str,
    ) -> std::result::Result<PhoneticSequence, PhonemizerError> {
        if text.trim().is_empty() {
            return Ok(PhoneticSequence::default());
        }

        let table = self
            .languages
            .get(language)
            .ok_or_else(|| PhonemizerError::UnsupportedLanguage(language.to_owned()))?;

        if let Some(units) = self.lookup(table, text.trim(), 0..text.chars().count()) {
            return Ok(units.collect());
        }

        let mut units = Vec::new();
        for token in tokenize(text) {
            let word = token.text(text);
            let found = self
                .lookup(table, word, token.chars.clone())
                .ok_or_else(|| PhonemizerError::UnknownToken {
                    text: word.to_owned(),
                    language: language.to_owned(),
                })?;
            units.extend(found);
        }

        if units.is_empty() {
            return Err(PhonemizerError::UnknownToken {
                text: text.to_owned(),
                language: language.to_owned(),
            });
        }

        Ok(PhoneticSequence::new(units))
    }
}
