//! Local distances between articulatory feature vectors.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Distance function over feature vectors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureDistanceKind {
    /// Weighted share of differing dimensions, in `[0, 1]`
    Hamming,
    /// Weighted mean absolute difference
    Manhattan,
    /// Weighted root mean squared difference
    Euclidean,
    /// `(1 - cos) / 2`, in `[0, 1]`
    #[default]
    Cosine,
}

impl FromStr for FeatureDistanceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hamming" => Ok(Self::Hamming),
            "manhattan" | "cityblock" => Ok(Self::Manhattan),
            "euclidean" => Ok(Self::Euclidean),
            "cosine" => Ok(Self::Cosine),
            _ => Err(ConfigError::UnknownFeatureDistance(s.to_owned())),
        }
    }
}

/// Feature distance with optional per-dimension weights.
///
/// Vectors of different length are zero-padded; a missing vector is all
/// zeros. Dimensions beyond `weights` get weight 1.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureDistance {
    pub kind: FeatureDistanceKind,
    pub weights: Vec<f64>,
}

impl FeatureDistance {
    pub fn new(kind: FeatureDistanceKind) -> Self {
        Self {
            kind,
            weights: Vec::new(),
        }
    }

    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = weights;
        self
    }

    fn weight(&self, i: usize) -> f64 {
        self.weights.get(i).copied().unwrap_or(1.0)
    }

    pub fn between(&self, a: Option<&[f64]>, b: Option<&[f64]>) -> f64 {
        let a = a.unwrap_or(&[]);
        let b = b.unwrap_or(&[]);
        let dim = a.len().max(b.len());

        let pairs = (0..dim).map(|i| {
            (
                self.weight(i),
                a.get(i).copied().unwrap_or(0.0),
                b.get(i).copied().unwrap_or(0.0),
            )
        });

        match self.kind {
            FeatureDistanceKind::Hamming => {
                weighted_mean(pairs.map(|(w, x, y)| (w, if x == y { 0.0 } else { 1.0 })))
            }
            FeatureDistanceKind::Manhattan => weighted_mean(pairs.map(|(w, x, y)| (w, (x - y).abs()))),
            FeatureDistanceKind::Euclidean => {
                weighted_mean(pairs.map(|(w, x, y)| (w, (x - y).powi(2)))).sqrt()
            }
            FeatureDistanceKind::Cosine => {
                let (dot, norm_a, norm_b) = pairs.fold((0.0, 0.0, 0.0), |(d, na, nb), (w, x, y)| {
                    (d + w * x * y, na + w * x * x, nb + w * y * y)
                });

                match (norm_a > 0.0, norm_b > 0.0) {
                    (false, false) => 0.0,
                    (true, true) => {
                        let cosine = dot / (norm_a.sqrt() * norm_b.sqrt());
                        (0.5 * (1.0 - cosine)).clamp(0.0, 1.0)
                    }
                    _ => 1.0,
                }
            }
        }
    }
}

fn weighted_mean(values: impl Iterator<Item = (f64, f64)>) -> f64 {
    let (sum, total) = values.fold((0.0, 0.0), |(s, t), (w, v)| (s + w * v, t + w));

    if total > 0.0 { sum / total } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn identical_vectors_have_zero_distance() {
        let v = [1.0, -1.0, 0.0];

        for kind in [
            FeatureDistanceKind::Hamming,
            FeatureDistanceKind::Manhattan,
            FeatureDistanceKind::Euclidean,
            FeatureDistanceKind::Cosine,
        ] {
            let d = FeatureDistance::new(kind).between(Some(&v), Some(&v));
            assert!(d.abs() < EPS, "{kind:?} gave {d}");
        }
    }

    #[test]
    fn hamming_counts_weighted_mismatches() {
        let d = FeatureDistance::new(FeatureDistanceKind::Hamming)
            .with_weights(vec![3.0, 1.0])
            .between(Some(&[1.0, 1.0]), Some(&[-1.0, 1.0]));

        assert!((d - 0.75).abs() < EPS);
    }

    #[test]
    fn missing_vector_is_zero_padded() {
        let d = FeatureDistance::new(FeatureDistanceKind::Manhattan)
            .between(Some(&[1.0, -1.0]), None);

        assert!((d - 1.0).abs() < EPS);
    }

    #[test]
    fn cosine_handles_zero_norms() {
        let cos = FeatureDistance::new(FeatureDistanceKind::Cosine);

        assert!(cos.between(None, None).abs() < EPS);
        assert!((cos.between(Some(&[1.0]), None) - 1.0).abs() < EPS);
        assert!((cos.between(Some(&[1.0, 0.0]), Some(&[-1.0, 0.0])) - 1.0).abs() < EPS);
        assert!((cos.between(Some(&[1.0, 0.0]), Some(&[0.0, 1.0])) - 0.5).abs() < EPS);
    }

    #[test]
    fn parses_names() {
        assert_eq!("Euclidean".parse::<FeatureDistanceKind>().unwrap(), FeatureDistanceKind::Euclidean);
        assert!(matches!(
            "chebyshev".parse::<FeatureDistanceKind>(),
            Err(ConfigError::UnknownFeatureDistance(_))
        ));
    }
}
