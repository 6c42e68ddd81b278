//! Corrector configuration.
//!
//! [`CorrectorSettings`] is the loosely typed, string-named form read from
//! JSON. It converts into the validated [`CorrectorConfig`] via `TryFrom`.

use crate::aggregate::{ComponentWeights, DistanceModel};
use crate::distance::aline::AlineParams;
use crate::distance::edit::EditCosts;
use crate::distance::features::{FeatureDistance, FeatureDistanceKind};
use crate::distance::{Metric, MetricKind, SegmentalConfig, WeightedMetric};
use crate::error::{ConfigError, LoadError};
use crate::prosody::{ConfusionTable, Normalization, ProsodicClass, ProsodyConfig};
use crate::window::WindowConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default acceptance threshold on the weighted total
pub const DEFAULT_THRESHOLD: f64 = 0.35;

/// Validated corrector configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrectorConfig {
    pub model: DistanceModel,
    /// Candidates with a total at or below this are kept
    pub threshold: f64,
    pub window: WindowConfig,
    /// Whether letters of spelled-out acronyms keep tone and stress
    pub spelled_prosody: bool,
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        Self {
            model: DistanceModel::default(),
            threshold: DEFAULT_THRESHOLD,
            window: WindowConfig::default(),
            spelled_prosody: true,
        }
    }
}

impl CorrectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold.is_nan() || self.threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }

        self.model.validate()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }
}

/// One segmental metric as written in a settings file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricSettings {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub substitution: Option<f64>,
    pub insertion: Option<f64>,
    pub deletion: Option<f64>,
    /// Local feature distance for `feature_edit` and `dtw`
    #[serde(alias = "feature_distance")]
    pub local_cost: Option<String>,
    /// Per-dimension feature weights (ALINE salience for `aline`)
    pub feature_weights: Option<Vec<f64>>,
    pub aline: Option<AlineParams>,
}

fn default_weight() -> f64 {
    1.0
}

impl MetricSettings {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: default_weight(),
            substitution: None,
            insertion: None,
            deletion: None,
            local_cost: None,
            feature_weights: None,
            aline: None,
        }
    }

    fn costs(&self) -> EditCosts {
        let base = EditCosts::default();
        EditCosts {
            substitution: self.substitution.unwrap_or(base.substitution),
            insertion: self.insertion.unwrap_or(base.insertion),
            deletion: self.deletion.unwrap_or(base.deletion),
        }
    }

    fn feature_distance(&self, default: FeatureDistanceKind) -> Result<FeatureDistance, ConfigError> {
        let kind = match &self.local_cost {
            Some(name) => name.parse()?,
            None => default,
        };

        Ok(FeatureDistance::new(kind).with_weights(self.feature_weights.clone().unwrap_or_default()))
    }
}

impl TryFrom<&MetricSettings> for WeightedMetric {
    type Error = ConfigError;

    fn try_from(settings: &MetricSettings) -> Result<Self, Self::Error> {
        let metric = match settings.name.parse::<MetricKind>()? {
            MetricKind::Edit => Metric::Edit(settings.costs()),
            MetricKind::FeatureEdit => Metric::FeatureEdit {
                costs: settings.costs(),
                features: settings.feature_distance(FeatureDistanceKind::Hamming)?,
            },
            MetricKind::Dtw => Metric::Dtw(settings.feature_distance(FeatureDistanceKind::Cosine)?),
            MetricKind::Aline => {
                let mut params = settings.aline.clone().unwrap_or_default();
                if let Some(salience) = &settings.feature_weights {
                    params.salience = salience.clone();
                }
                Metric::Aline(params)
            }
        };

        Ok(WeightedMetric::new(metric, settings.weight))
    }
}

/// Confusion table as written in a settings file.
///
/// Keys of `confusion` are `"a:b"` class pairs, e.g. `"2:3"` for tones or
/// `"primary:secondary"` for stress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfusionSettings {
    pub confusion: BTreeMap<String, f64>,
    pub symmetric: bool,
    pub default_cost: f64,
    pub insertion: f64,
    pub deletion: f64,
}

impl Default for ConfusionSettings {
    fn default() -> Self {
        Self {
            confusion: BTreeMap::new(),
            symmetric: true,
            default_cost: 1.0,
            insertion: 1.0,
            deletion: 1.0,
        }
    }
}

impl<C: ProsodicClass> TryFrom<&ConfusionSettings> for ConfusionTable<C> {
    type Error = ConfigError;

    fn try_from(settings: &ConfusionSettings) -> Result<Self, Self::Error> {
        let mut table = ConfusionTable::new();
        table.symmetric = settings.symmetric;
        table.default_cost = settings.default_cost;
        table.insertion = settings.insertion;
        table.deletion = settings.deletion;

        for (key, &cost) in &settings.confusion {
            let (a, b) = ConfusionTable::<C>::parse_key(key)?;
            table.insert(a, b, cost);
        }

        Ok(table)
    }
}

/// Serde form of [`CorrectorConfig`]. Every field is optional.
///
/// Missing `tone` or `stress` tables fall back to the built-in Mandarin and
/// English tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorrectorSettings {
    pub metrics: Vec<MetricSettings>,
    pub gap_cost: f64,
    pub tone: Option<ConfusionSettings>,
    pub stress: Option<ConfusionSettings>,
    pub normalization: Normalization,
    pub weights: ComponentWeights,
    pub threshold: f64,
    pub window: WindowConfig,
    pub spelled_prosody: bool,
}

impl Default for CorrectorSettings {
    fn default() -> Self {
        Self {
            metrics: vec![MetricSettings::named(MetricKind::Edit.name())],
            gap_cost: 1.0,
            tone: None,
            stress: None,
            normalization: Normalization::default(),
            weights: ComponentWeights::default(),
            threshold: DEFAULT_THRESHOLD,
            window: WindowConfig::default(),
            spelled_prosody: true,
        }
    }
}

impl CorrectorSettings {
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl TryFrom<CorrectorSettings> for CorrectorConfig {
    type Error = ConfigError;

    fn try_from(settings: CorrectorSettings) -> Result<Self, Self::Error> {
        let metrics = settings
            .metrics
            .iter()
            .map(WeightedMetric::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let tone = match &settings.tone {
            Some(table) => ConfusionTable::try_from(table)?,
            None => ConfusionTable::mandarin(),
        };
        let stress = match &settings.stress {
            Some(table) => ConfusionTable::try_from(table)?,
            None => ConfusionTable::english(),
        };

        let config = Self {
            model: DistanceModel {
                segmental: SegmentalConfig {
                    metrics,
                    gap_cost: settings.gap_cost,
                },
                prosody: ProsodyConfig {
                    tone,
                    stress,
                    normalization: settings.normalization,
                },
                weights: settings.weights,
            },
            threshold: settings.threshold,
            window: settings.window,
            spelled_prosody: settings.spelled_prosody,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Stress, Tone};
    use crate::window::LengthMeasure;

    #[test]
    fn default_settings_match_default_config() {
        let config = CorrectorConfig::try_from(CorrectorSettings::default()).unwrap();

        assert_eq!(config, CorrectorConfig::default());
    }

    #[test]
    fn parses_full_settings() {
        let json = r#"{
            "metrics": [
                {"name": "levenshtein", "weight": 2, "substitution": 0.8},
                {"name": "dtw", "local_cost": "euclidean", "feature_weights": [1, 0.5]},
                {"name": "aline", "weight": 0.5, "aline": {"skip": 5}}
            ],
            "tone": {"confusion": {"2:3": 0.3}, "symmetric": false},
            "stress": {"confusion": {"primary:unstressed": 0.9}},
            "normalization": "shorter",
            "weights": {"segmental": 1, "tone": 0.5, "stress": 0},
            "threshold": 0.2,
            "window": {"tolerance": 0, "measure": "phones"},
            "spelled_prosody": false
        }"#;

        let config = CorrectorConfig::try_from(CorrectorSettings::from_json_str(json).unwrap()).unwrap();
        let segmental = &config.model.segmental.metrics;

        assert_eq!(segmental.len(), 3);
        assert_eq!(segmental[0].weight, 2.0);
        assert!(matches!(segmental[0].metric, Metric::Edit(EditCosts { substitution, .. }) if substitution == 0.8));
        assert!(matches!(
            &segmental[1].metric,
            Metric::Dtw(FeatureDistance { kind: FeatureDistanceKind::Euclidean, weights }) if weights.len() == 2
        ));
        assert!(matches!(&segmental[2].metric, Metric::Aline(p) if p.skip == 5.0 && p.substitution == 35.0));

        let tone = &config.model.prosody.tone;
        assert_eq!(tone.substitution(Tone::Second, Tone::Third), 0.3);
        assert_eq!(tone.substitution(Tone::Third, Tone::Second), 1.0);
        assert_eq!(
            config.model.prosody.stress.substitution(Stress::Unstressed, Stress::Primary),
            0.9
        );

        assert_eq!(config.model.prosody.normalization, Normalization::Shorter);
        assert_eq!(config.window, WindowConfig::new(0, LengthMeasure::Phones));
        assert!(!config.spelled_prosody);
    }

    #[test]
    fn unknown_metric_is_fatal() {
        let settings = CorrectorSettings {
            metrics: vec![MetricSettings::named("soundex")],
            ..Default::default()
        };

        assert!(matches!(
            CorrectorConfig::try_from(settings),
            Err(ConfigError::UnknownMetric(_))
        ));
    }

    #[test]
    fn unknown_feature_distance_is_fatal() {
        let mut metric = MetricSettings::named("dtw");
        metric.local_cost = Some("chebyshev".into());
        let settings = CorrectorSettings {
            metrics: vec![metric],
            ..Default::default()
        };

        assert!(matches!(
            CorrectorConfig::try_from(settings),
            Err(ConfigError::UnknownFeatureDistance(_))
        ));
    }

    #[test]
    fn malformed_confusion_key_is_fatal() {
        let settings = CorrectorSettings {
            tone: Some(ConfusionSettings {
                confusion: BTreeMap::from([("2-3".to_owned(), 0.5)]),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert!(matches!(
            CorrectorConfig::try_from(settings),
            Err(ConfigError::MalformedConfusionKey { axis: "tone", .. })
        ));
    }

    #[test]
    fn rejects_negative_threshold_and_weights() {
        let settings = CorrectorSettings {
            threshold: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            CorrectorConfig::try_from(settings),
            Err(ConfigError::InvalidThreshold(_))
        ));

        let settings = CorrectorSettings {
            threshold: f64::NAN,
            ..Default::default()
        };
        assert!(CorrectorConfig::try_from(settings).is_err());

        let json = r#"{"metrics": [{"name": "edit", "weight": -1}]}"#;
        let settings = CorrectorSettings::from_json_str(json).unwrap();
        assert!(matches!(
            CorrectorConfig::try_from(settings),
            Err(ConfigError::NegativeWeight { .. })
        ));
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(CorrectorSettings::from_json_str(r#"{"treshold": 0.3}"#).is_err());
    }
}
