//! Configuration types for resolved CLI arguments.
//!
//! Settings files are read here and CLI overrides applied before the
//! settings are validated into a [`CorrectorConfig`].

use crate::cli::CorrectorArgs;
use eyre::{Context, Result};
use phonops_correct::config::{CorrectorConfig, CorrectorSettings};
use phonops_correct::dictionary::DictionaryPhonemizer;
use phonops_correct::matcher::Corrector;
use std::path::PathBuf;

/// Resolved corrector configuration.
///
/// Converted from CorrectorArgs via TryFrom.
#[derive(Debug)]
pub struct CorrectorSetup {
    pub dictionary: PathBuf,
    pub config: CorrectorConfig,
}

impl TryFrom<CorrectorArgs> for CorrectorSetup {
    type Error = eyre::Error;

    fn try_from(args: CorrectorArgs) -> Result<Self> {
        let mut settings = match &args.config {
            Some(path) => CorrectorSettings::from_path(path)
                .wrap_err_with(|| format!("failed to read settings: {}", path.display()))?,
            None => CorrectorSettings::default(),
        };

        if let Some(threshold) = args.threshold {
            settings.threshold = threshold;
        }
        if let Some(tolerance) = args.tolerance {
            settings.window.tolerance = tolerance;
        }
        if let Some(measure) = args.measure {
            settings.window.measure = measure.into();
        }

        let config = CorrectorConfig::try_from(settings).wrap_err("invalid corrector settings")?;

        Ok(Self {
            dictionary: args.dictionary,
            config,
        })
    }
}

impl CorrectorSetup {
    /// Load the dictionary and build a corrector.
    pub fn build(&self) -> Result<Corrector<DictionaryPhonemizer>> {
        let phonemizer = DictionaryPhonemizer::from_path(&self.dictionary)
            .wrap_err_with(|| format!("failed to load dictionary: {}", self.dictionary.display()))?;

        Ok(Corrector::new(self.config.clone(), phonemizer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Measure;
    use phonops_correct::window::LengthMeasure;

    fn args() -> CorrectorArgs {
        CorrectorArgs {
            dictionary: PathBuf::from("dict.json"),
            config: None,
            threshold: None,
            tolerance: None,
            measure: None,
        }
    }

    #[test]
    fn defaults_without_settings_file() {
        let setup = CorrectorSetup::try_from(args()).unwrap();

        assert_eq!(setup.config, CorrectorConfig::default());
    }

    #[test]
    fn flags_override_settings() {
        let setup = CorrectorSetup::try_from(CorrectorArgs {
            threshold: Some(0.5),
            tolerance: Some(2),
            measure: Some(Measure::Phones),
            ..args()
        })
        .unwrap();

        assert_eq!(setup.config.threshold, 0.5);
        assert_eq!(setup.config.window.tolerance, 2);
        assert_eq!(setup.config.window.measure, LengthMeasure::Phones);
    }

    #[test]
    fn rejects_negative_threshold() {
        let result = CorrectorSetup::try_from(CorrectorArgs {
            threshold: Some(-1.0),
            ..args()
        });

        assert!(result.is_err());
    }

    #[test]
    fn missing_settings_file_is_an_error() {
        let result = CorrectorSetup::try_from(CorrectorArgs {
            config: Some(PathBuf::from("/nonexistent/settings.json")),
            ..args()
        });

        assert!(result.is_err());
    }
}
