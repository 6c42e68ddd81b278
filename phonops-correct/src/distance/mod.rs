//! Segmental distance between phone sequences.
//!
//! Metrics are a closed set selected by configuration. Each one produces a
//! score normalized per metric (edit costs divided by the longer length, DTW
//! averaged over its path, ALINE normalized by self-similarity), and several
//! metrics combine as a weighted average.

pub mod aline;
pub mod dtw;
pub mod edit;
pub mod features;

use crate::error::ConfigError;
use crate::types::{PhoneticSequence, PhoneticUnit};
use aline::AlineParams;
use edit::EditCosts;
use features::FeatureDistance;
use std::fmt;
use std::str::FromStr;

/// Metric names accepted in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Edit,
    FeatureEdit,
    Dtw,
    Aline,
}

impl MetricKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::FeatureEdit => "feature_edit",
            Self::Dtw => "dtw",
            Self::Aline => "aline",
        }
    }
}

impl FromStr for MetricKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "edit" | "levenshtein" | "phonetic_edit_distance" => Ok(Self::Edit),
            "feature_edit" | "weighted_feature_edit" | "panphon" => Ok(Self::FeatureEdit),
            "dtw" => Ok(Self::Dtw),
            "aline" => Ok(Self::Aline),
            _ => Err(ConfigError::UnknownMetric(s.to_owned())),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Segmental metric with its parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum Metric {
    /// Weighted Levenshtein over labels
    Edit(EditCosts),
    /// Levenshtein with feature-distance substitution
    FeatureEdit {
        costs: EditCosts,
        features: FeatureDistance,
    },
    /// Dynamic time warping over feature vectors
    ///
    /// Labels are ignored. Units without features compare as zero vectors,
    /// so two featureless sequences score 0 under every local distance.
    Dtw(FeatureDistance),
    /// ALINE-style articulatory alignment
    Aline(AlineParams),
}

impl Metric {
    pub fn kind(&self) -> MetricKind {
        match self {
            Self::Edit(_) => MetricKind::Edit,
            Self::FeatureEdit { .. } => MetricKind::FeatureEdit,
            Self::Dtw(_) => MetricKind::Dtw,
            Self::Aline(_) => MetricKind::Aline,
        }
    }

    /// Whether the metric reads unit feature vectors.
    pub fn uses_features(&self) -> bool {
        !matches!(self, Self::Edit(_))
    }

    /// Unnormalized cost.
    ///
    /// Two empty sequences cost 0. An empty side costs the per-unit
    /// insertion/deletion cost (the metric's own for edit metrics, `gap_cost`
    /// otherwise) times the other side's length.
    pub fn raw_cost(&self, a: &[PhoneticUnit], b: &[PhoneticUnit], gap_cost: f64) -> f64 {
        let longer = a.len().max(b.len());

        match self {
            Self::Edit(costs) => edit::edit_cost(a, b, costs),
            Self::FeatureEdit { costs, features } => edit::feature_edit_cost(a, b, costs, features),
            _ if a.is_empty() || b.is_empty() => gap_cost * longer as f64,
            Self::Dtw(local) => dtw::dtw_average(a, b, local) * longer as f64,
            Self::Aline(params) => aline::aline_distance(a, b, params) * longer as f64,
        }
    }

    /// Cost normalized by the longer sequence length.
    pub fn distance(&self, a: &[PhoneticUnit], b: &[PhoneticUnit], gap_cost: f64) -> f64 {
        let longer = a.len().max(b.len());
        if longer == 0 {
            return 0.0;
        }

        self.raw_cost(a, b, gap_cost) / longer as f64
    }
}

/// Metric with its weight in the segmental average.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedMetric {
    pub metric: Metric,
    pub weight: f64,
}

impl WeightedMetric {
    pub fn new(metric: Metric, weight: f64) -> Self {
        Self { metric, weight }
    }
}

/// Segmental distance configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentalConfig {
    pub metrics: Vec<WeightedMetric>,
    /// Per-unit cost against an empty sequence for DTW and ALINE
    pub gap_cost: f64,
}

impl Default for SegmentalConfig {
    fn default() -> Self {
        Self {
            metrics: vec![WeightedMetric::new(Metric::Edit(EditCosts::default()), 1.0)],
            gap_cost: 1.0,
        }
    }
}

impl SegmentalConfig {
    /// Whether any weighted metric reads unit feature vectors.
    pub fn uses_features(&self) -> bool {
        self.metrics
            .iter()
            .any(|m| m.weight > 0.0 && m.metric.uses_features())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metrics.is_empty() {
            return Err(ConfigError::NoMetrics);
        }

        for m in &self.metrics {
            check_weight(m.metric.kind().name(), m.weight)?;
            match &m.metric {
                Metric::Edit(costs) | Metric::FeatureEdit { costs, .. } => check_costs(costs)?,
                Metric::Dtw(_) => {}
                Metric::Aline(params) => {
                    check_cost("aline.skip", params.skip)?;
                    check_cost("aline.feature_scale", params.feature_scale)?;
                }
            }
        }

        if self.metrics.iter().map(|m| m.weight).sum::<f64>() <= 0.0 {
            return Err(ConfigError::ZeroMetricWeight);
        }

        check_cost("gap_cost", self.gap_cost)
    }
}

pub(crate) fn check_weight(name: &str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeWeight {
            name: name.to_owned(),
            value,
        })
    }
}

pub(crate) fn check_cost(name: &str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeCost {
            name: name.to_owned(),
            value,
        })
    }
}

fn check_costs(costs: &EditCosts) -> Result<(), ConfigError> {
    check_cost("substitution", costs.substitution)?;
    check_cost("insertion", costs.insertion)?;
    check_cost("deletion", costs.deletion)
}

/// Weighted average of the configured metrics.
pub fn segmental_distance(a: &PhoneticSequence, b: &PhoneticSequence, config: &SegmentalConfig) -> f64 {
    let (sum, total) = config
        .metrics
        .iter()
        .filter(|m| m.weight > 0.0)
        .fold((0.0, 0.0), |(sum, total), m| {
            let d = m.metric.distance(a.units(), b.units(), config.gap_cost);
            (sum + m.weight * d, total + m.weight)
        });

    if total > 0.0 { sum / total } else { 0.0 }
}
