//! ALINE-style alignment scoring (Kondrak 2000).
//!
//! Alignment maximizes a similarity score that rewards articulatorily close
//! substitutions, allows one-to-two expansions/compressions, penalizes skips
//! and discounts vowel matches. The score is normalized by the better
//! self-alignment score and turned into a dissimilarity in `[0, 1]`.

use crate::distance::features::{FeatureDistance, FeatureDistanceKind};
use crate::types::PhoneticUnit;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// ALINE scoring constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlineParams {
    /// Penalty for skipping a segment (C_skip)
    pub skip: f64,
    /// Maximum substitution score (C_sub)
    pub substitution: f64,
    /// Maximum expansion/compression score (C_exp)
    pub expansion: f64,
    /// Vowel discount (C_vwl)
    pub vowel: f64,
    /// Scale from mean feature difference to segment difference
    pub feature_scale: f64,
    /// Per-feature salience
    pub salience: Vec<f64>,
    /// Feature index that marks a segment as a vowel when positive
    pub syllabic_feature: Option<usize>,
}

impl Default for AlineParams {
    fn default() -> Self {
        Self {
            skip: 10.0,
            substitution: 35.0,
            expansion: 45.0,
            vowel: 10.0,
            feature_scale: 25.0,
            salience: Vec::new(),
            syllabic_feature: Some(0),
        }
    }
}

struct Scorer<'p> {
    params: &'p AlineParams,
    features: FeatureDistance,
}

impl<'p> Scorer<'p> {
    fn new(params: &'p AlineParams) -> Self {
        Self {
            params,
            features: FeatureDistance::new(FeatureDistanceKind::Manhattan)
                .with_weights(params.salience.clone()),
        }
    }

    fn delta(&self, p: &PhoneticUnit, q: &PhoneticUnit) -> f64 {
        if p.label == q.label {
            0.0
        } else {
            self.params.feature_scale * self.features.between(p.features(), q.features())
        }
    }

    fn vowel(&self, p: &PhoneticUnit) -> f64 {
        let is_vowel = self
            .params
            .syllabic_feature
            .and_then(|i| p.features().and_then(|f| f.get(i)))
            .is_some_and(|&v| v > 0.0);

        if is_vowel { self.params.vowel } else { 0.0 }
    }

    fn substitute(&self, p: &PhoneticUnit, q: &PhoneticUnit) -> f64 {
        self.params.substitution - self.delta(p, q) - self.vowel(p) - self.vowel(q)
    }

    fn expand(&self, p: &PhoneticUnit, q1: &PhoneticUnit, q2: &PhoneticUnit) -> f64 {
        self.params.expansion
            - self.delta(p, q1)
            - self.delta(p, q2)
            - self.vowel(p)
            - self.vowel(q1).max(self.vowel(q2))
    }

    /// Best global alignment score.
    fn score(&self, a: &[PhoneticUnit], b: &[PhoneticUnit]) -> f64 {
        let (n, m) = (a.len(), b.len());
        let skip = self.params.skip;
        let mut s = Array2::<f64>::zeros((n + 1, m + 1));

        for i in 1..=n {
            s[[i, 0]] = -(i as f64) * skip;
        }
        for j in 1..=m {
            s[[0, j]] = -(j as f64) * skip;
        }

        for i in 1..=n {
            for j in 1..=m {
                let mut best = (s[[i - 1, j]] - skip)
                    .max(s[[i, j - 1]] - skip)
                    .max(s[[i - 1, j - 1]] + self.substitute(&a[i - 1], &b[j - 1]));

                if j >= 2 {
                    best = best.max(s[[i - 1, j - 2]] + self.expand(&a[i - 1], &b[j - 2], &b[j - 1]));
                }
                if i >= 2 {
                    best = best.max(s[[i - 2, j - 1]] + self.expand(&b[j - 1], &a[i - 2], &a[i - 1]));
                }

                s[[i, j]] = best;
            }
        }

        s[[n, m]]
    }
}

/// Normalized ALINE dissimilarity in `[0, 1]`.
pub fn aline_distance(a: &[PhoneticUnit], b: &[PhoneticUnit], params: &AlineParams) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }

    let scorer = Scorer::new(params);
    let best_self = scorer.score(a, a).max(scorer.score(b, b));

    if best_self <= 0.0 {
        let same = a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.label == y.label);
        return if same { 0.0 } else { 1.0 };
    }

    (1.0 - scorer.score(a, b) / best_self).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    // [syllabic, voice, labial]
    fn phone(label: &str) -> PhoneticUnit {
        let features = match label {
            "p" => vec![-1.0, -1.0, 1.0],
            "b" => vec![-1.0, 1.0, 1.0],
            "t" => vec![-1.0, -1.0, -1.0],
            "a" => vec![1.0, 1.0, -1.0],
            "o" => vec![1.0, 1.0, 1.0],
            _ => vec![0.0, 0.0, 0.0],
        };
        PhoneticUnit::new(label).with_features(features)
    }

    fn word(labels: &str) -> Vec<PhoneticUnit> {
        labels.split_whitespace().map(phone).collect()
    }

    #[test]
    fn identical_words_have_zero_distance() {
        let w = word("p a t o");

        assert!(aline_distance(&w, &w, &AlineParams::default()).abs() < EPS);
    }

    #[test]
    fn close_consonants_beat_distant_ones() {
        let params = AlineParams::default();
        let base = word("p a");

        let voiced = aline_distance(&base, &word("b a"), &params);
        let vowel = aline_distance(&base, &word("o a"), &params);

        assert!(voiced > 0.0);
        assert!(voiced < vowel, "{voiced} !< {vowel}");
    }

    #[test]
    fn stays_in_unit_range() {
        let params = AlineParams::default();
        let d = aline_distance(&word("p"), &word("a o a o a o"), &params);

        assert!((0.0..=1.0).contains(&d));
    }
}
