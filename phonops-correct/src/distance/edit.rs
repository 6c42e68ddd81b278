//! Weighted edit distances.

use crate::distance::features::FeatureDistance;
use crate::types::PhoneticUnit;
use serde::{Deserialize, Serialize};

/// Per-operation costs for edit distances.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditCosts {
    pub substitution: f64,
    pub insertion: f64,
    pub deletion: f64,
}

impl Default for EditCosts {
    fn default() -> Self {
        Self {
            substitution: 1.0,
            insertion: 1.0,
            deletion: 1.0,
        }
    }
}

/// Weighted Levenshtein recurrence with a caller-supplied substitution cost.
///
/// Deleting from `a` costs `deletion`, inserting from `b` costs `insertion`.
/// Uses two rows, so memory is linear in `b.len()`.
pub fn weighted_edit<T, F>(a: &[T], b: &[T], insertion: f64, deletion: f64, substitute: F) -> f64
where
    F: Fn(&T, &T) -> f64,
{
    let mut prev: Vec<f64> = (0..=b.len()).map(|j| j as f64 * insertion).collect();
    let mut curr = vec![0.0; b.len() + 1];

    for (i, x) in a.iter().enumerate() {
        curr[0] = (i + 1) as f64 * deletion;

        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = (prev[j + 1] + deletion)
                .min(curr[j] + insertion)
                .min(prev[j] + substitute(x, y));
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Raw edit cost over unit labels; identical labels substitute for free.
pub fn edit_cost(a: &[PhoneticUnit], b: &[PhoneticUnit], costs: &EditCosts) -> f64 {
    weighted_edit(a, b, costs.insertion, costs.deletion, |x, y| {
        if x.label == y.label {
            0.0
        } else {
            costs.substitution
        }
    })
}

/// Raw edit cost where substitution is scaled by feature distance.
pub fn feature_edit_cost(
    a: &[PhoneticUnit],
    b: &[PhoneticUnit],
    costs: &EditCosts,
    features: &FeatureDistance,
) -> f64 {
    weighted_edit(a, b, costs.insertion, costs.deletion, |x, y| {
        if x.label == y.label {
            0.0
        } else {
            costs.substitution * features.between(x.features(), y.features())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::features::FeatureDistanceKind;

    const EPS: f64 = 1e-9;

    fn units(labels: &str) -> Vec<PhoneticUnit> {
        labels.split_whitespace().map(PhoneticUnit::new).collect()
    }

    #[test]
    fn classic_levenshtein() {
        let costs = EditCosts::default();

        let d = edit_cost(&units("k i t t e n"), &units("s i t t i n g"), &costs);

        assert!((d - 3.0).abs() < EPS);
    }

    #[test]
    fn empty_side_costs_length_times_indel() {
        let costs = EditCosts {
            substitution: 1.0,
            insertion: 0.5,
            deletion: 2.0,
        };

        assert!((edit_cost(&[], &units("a b c"), &costs) - 1.5).abs() < EPS);
        assert!((edit_cost(&units("a b c"), &[], &costs) - 6.0).abs() < EPS);
        assert!(edit_cost(&[], &[], &costs).abs() < EPS);
    }

    #[test]
    fn substitution_prefers_cheaper_indel_pair() {
        let costs = EditCosts {
            substitution: 5.0,
            insertion: 1.0,
            deletion: 1.0,
        };

        assert!((edit_cost(&units("a"), &units("b"), &costs) - 2.0).abs() < EPS);
    }

    #[test]
    fn feature_substitution_uses_vectors() {
        let a = vec![PhoneticUnit::new("p").with_features(vec![1.0, -1.0])];
        let b = vec![PhoneticUnit::new("b").with_features(vec![1.0, 1.0])];
        let hamming = FeatureDistance::new(FeatureDistanceKind::Hamming);

        let d = feature_edit_cost(&a, &b, &EditCosts::default(), &hamming);

        assert!((d - 0.5).abs() < EPS);
    }
}
