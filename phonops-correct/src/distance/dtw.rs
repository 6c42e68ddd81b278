//! Dynamic time warping over feature-vector sequences.

use crate::distance::features::FeatureDistance;
use crate::types::PhoneticUnit;
use ndarray::Array2;

/// Mean local cost along the optimal warping path.
///
/// Averaging over the number of aligned pairs keeps the score comparable
/// across sequence lengths. Both sequences must be non-empty; returns 0
/// otherwise.
pub fn dtw_average(a: &[PhoneticUnit], b: &[PhoneticUnit], local: &FeatureDistance) -> f64 {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        return 0.0;
    }

    let mut cost = Array2::<f64>::from_elem((n + 1, m + 1), f64::INFINITY);
    let mut steps = Array2::<usize>::zeros((n + 1, m + 1));
    cost[[0, 0]] = 0.0;

    for i in 1..=n {
        for j in 1..=m {
            let local_cost = local.between(a[i - 1].features(), b[j - 1].features());

            // diagonal first so ties resolve to the shortest path
            let (prev_cost, prev_steps) = [(i - 1, j - 1), (i - 1, j), (i, j - 1)]
                .into_iter()
                .map(|(pi, pj)| (cost[[pi, pj]], steps[[pi, pj]]))
                .fold((f64::INFINITY, 0), |best, candidate| {
                    if candidate.0 < best.0 { candidate } else { best }
                });

            cost[[i, j]] = prev_cost + local_cost;
            steps[[i, j]] = prev_steps + 1;
        }
    }

    cost[[n, m]] / steps[[n, m]] as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::features::FeatureDistanceKind;

    const EPS: f64 = 1e-9;

    fn unit(label: &str, features: &[f64]) -> PhoneticUnit {
        PhoneticUnit::new(label).with_features(features.to_vec())
    }

    #[test]
    fn identical_sequences_cost_nothing() {
        let seq = vec![unit("a", &[1.0, 0.0]), unit("b", &[0.0, 1.0])];
        let local = FeatureDistance::new(FeatureDistanceKind::Euclidean);

        assert!(dtw_average(&seq, &seq, &local).abs() < EPS);
    }

    #[test]
    fn stretching_is_free_for_repeated_frames() {
        let a = vec![unit("a", &[1.0]), unit("b", &[-1.0])];
        let b = vec![unit("a", &[1.0]), unit("a", &[1.0]), unit("b", &[-1.0])];
        let local = FeatureDistance::new(FeatureDistanceKind::Manhattan);

        assert!(dtw_average(&a, &b, &local).abs() < EPS);
    }

    #[test]
    fn averages_over_path_length() {
        let a = vec![unit("a", &[1.0]), unit("b", &[1.0])];
        let b = vec![unit("c", &[-1.0]), unit("d", &[-1.0])];
        let local = FeatureDistance::new(FeatureDistanceKind::Manhattan);

        // diagonal path of two pairs, each costing 2
        assert!((dtw_average(&a, &b, &local) - 2.0).abs() < EPS);
    }
}
