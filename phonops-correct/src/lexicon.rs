//! Reference lexicon and its JSON representation.

use crate::error::{LoadError, Result};
use crate::matcher::Corrector;
use crate::traits::Phonemizer;
use crate::types::{Metadata, ReferenceEntry};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::ops::Deref;
use std::path::Path;

/// Lexicon item as written in a JSON file.
///
/// Either a bare surface string or an object with an optional language tag
/// and metadata. Without a language the surface is segmented by script.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntrySpec {
    Surface(String),
    Full {
        surface: String,
        #[serde(default)]
        language: Option<String>,
        #[serde(default)]
        metadata: Metadata,
    },
}

impl EntrySpec {
    pub fn surface(&self) -> &str {
        match self {
            Self::Surface(surface) | Self::Full { surface, .. } => surface,
        }
    }
}

/// Ordered collection of reference entries. Duplicate surfaces are kept.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lexicon {
    entries: Vec<ReferenceEntry>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ReferenceEntry) {
        self.entries.push(entry);
    }

    pub fn as_slice(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    /// Parse entry specs from JSON.
    pub fn parse_specs(json: &str) -> std::result::Result<Vec<EntrySpec>, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Phonemize `specs` into entries.
    pub fn from_specs<P, I>(specs: I, corrector: &Corrector<P>) -> Result<Self>
    where
        P: Phonemizer,
        I: IntoIterator<Item = EntrySpec>,
    {
        specs
            .into_iter()
            .map(|spec| match spec {
                EntrySpec::Surface(surface) => corrector.entry(&surface, Metadata::new()),
                EntrySpec::Full {
                    surface,
                    language: Some(language),
                    metadata,
                } => corrector.entry_in(&surface, &language, metadata),
                EntrySpec::Full {
                    surface,
                    language: None,
                    metadata,
                } => corrector.entry(&surface, metadata),
            })
            .collect()
    }

    /// Load a JSON array of [`EntrySpec`] and phonemize it.
    pub fn load<P: Phonemizer>(path: impl AsRef<Path>, corrector: &Corrector<P>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let specs: Vec<EntrySpec> = serde_json::from_reader(reader)?;

        let lexicon = Self::from_specs(specs, corrector)?;
        tracing::debug!(path = %path.display(), entries = lexicon.len(), "loaded lexicon");

        Ok(lexicon)
    }
}

impl Deref for Lexicon {
    type Target = [ReferenceEntry];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl FromIterator<ReferenceEntry> for Lexicon {
    fn from_iter<I: IntoIterator<Item = ReferenceEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Lexicon {
    type Item = &'a ReferenceEntry;
    type IntoIter = std::slice::Iter<'a, ReferenceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Lexicon {
    type Item = ReferenceEntry;
    type IntoIter = std::vec::IntoIter<ReferenceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_specs() {
        let json = r#"[
            "美国",
            {"surface": "NVIDIA", "language": "en", "metadata": {"kind": "company"}},
            {"surface": "美国"}
        ]"#;

        let specs = Lexicon::parse_specs(json).unwrap();

        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0], EntrySpec::Surface("美国".into()));
        assert!(matches!(
            &specs[1],
            EntrySpec::Full { language: Some(lang), metadata, .. }
                if lang == "en" && metadata["kind"] == "company"
        ));
        assert_eq!(specs[2].surface(), "美国");
    }

    #[test]
    fn rejects_non_array() {
        assert!(matches!(
            Lexicon::parse_specs(r#"{"surface": "x"}"#),
            Err(LoadError::Json(_))
        ));
    }
}
