//! Feature scaling utilities
//!
//! Both transforms operate in place on a `LabeledObservationVector`. The
//! observations inside are shared handles, so the transforms work on
//! copy-on-write clones: the vector passed in sees the rescaled values
//! while any other holder of the same observations is untouched.

use crate::core::LabeledObservationVector;
use std::sync::Arc;

/// Per-feature mean over the vector. Empty input yields an empty vector.
pub fn feature_means(observations: &LabeledObservationVector) -> Vec<f64> {
    let Some(first) = observations.first() else {
        return Vec::new();
    };
    let mut means = vec![0.0; first.observation.len()];
    for lo in observations {
        for (m, &x) in means.iter_mut().zip(lo.observation.iter()) {
            *m += x;
        }
    }
    let n = observations.len() as f64;
    for m in &mut means {
        *m /= n;
    }
    means
}

/// Per-feature population variance over the vector.
pub fn feature_variances(observations: &LabeledObservationVector) -> Vec<f64> {
    let means = feature_means(observations);
    if means.is_empty() {
        return Vec::new();
    }
    let mut variances = vec![0.0; means.len()];
    for lo in observations {
        for ((v, &x), &m) in variances
            .iter_mut()
            .zip(lo.observation.iter())
            .zip(means.iter())
        {
            let d = x - m;
            *v += d * d;
        }
    }
    let n = observations.len() as f64;
    for v in &mut variances {
        *v /= n;
    }
    variances
}

/// Rescale every feature to [0, 1] by its observed min and max. Constant
/// columns are set to 0.
pub fn transform_zero_one(observations: &mut LabeledObservationVector) {
    let Some(first) = observations.first() else {
        return;
    };
    let width = first.observation.len();
    let mut mins = vec![f64::INFINITY; width];
    let mut maxs = vec![f64::NEG_INFINITY; width];
    for lo in observations.iter() {
        for (j, &x) in lo.observation.iter().enumerate() {
            mins[j] = mins[j].min(x);
            maxs[j] = maxs[j].max(x);
        }
    }

    for lo in observations.iter_mut() {
        let values = Arc::make_mut(&mut lo.observation);
        for (j, x) in values.iter_mut().enumerate() {
            let span = maxs[j] - mins[j];
            *x = if span > 0.0 { (*x - mins[j]) / span } else { 0.0 };
        }
    }
}

/// Standardize every feature to zero mean and unit variance (population
/// variance). Zero-variance columns are only centered.
pub fn transform_zero_mean_unit_variance(observations: &mut LabeledObservationVector) {
    let means = feature_means(observations);
    let variances = feature_variances(observations);
    if means.is_empty() {
        return;
    }

    let stds: Vec<f64> = variances.iter().map(|&v| v.sqrt()).collect();
    for lo in observations.iter_mut() {
        let values = Arc::make_mut(&mut lo.observation);
        for (j, x) in values.iter_mut().enumerate() {
            *x -= means[j];
            if stds[j] > 0.0 {
                *x /= stds[j];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LabeledObservation;
    use approx::assert_relative_eq;

    fn observations(rows: &[Vec<f64>]) -> LabeledObservationVector {
        rows.iter()
            .enumerate()
            .map(|(i, row)| LabeledObservation::new(i, "x", Arc::new(row.clone())))
            .collect()
    }

    #[test]
    fn test_feature_means_and_variances() {
        let obs = observations(&[vec![1.0, 10.0], vec![3.0, 10.0]]);
        assert_eq!(feature_means(&obs), vec![2.0, 10.0]);
        assert_eq!(feature_variances(&obs), vec![1.0, 0.0]);
    }

    #[test]
    fn test_zero_one_transform() {
        let mut obs = observations(&[vec![0.0, 5.0], vec![10.0, 5.0], vec![5.0, 5.0]]);
        transform_zero_one(&mut obs);
        assert_eq!(*obs[0].observation, vec![0.0, 0.0]);
        assert_eq!(*obs[1].observation, vec![1.0, 0.0]);
        assert_eq!(*obs[2].observation, vec![0.5, 0.0]);
    }

    #[test]
    fn test_standardize_round_trip() {
        let mut obs = observations(&[
            vec![1.0, 100.0, 7.0],
            vec![2.0, 250.0, 7.5],
            vec![3.0, 175.0, 6.5],
            vec![4.0, 300.0, 8.0],
        ]);
        transform_zero_mean_unit_variance(&mut obs);

        for mean in feature_means(&obs) {
            assert_relative_eq!(mean, 0.0, epsilon = 1e-10);
        }
        for variance in feature_variances(&obs) {
            assert_relative_eq!(variance, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_standardize_zero_variance_column_is_centered() {
        let mut obs = observations(&[vec![4.0], vec![4.0]]);
        transform_zero_mean_unit_variance(&mut obs);
        assert_eq!(*obs[0].observation, vec![0.0]);
        assert_eq!(*obs[1].observation, vec![0.0]);
    }

    #[test]
    fn test_transform_is_copy_on_write() {
        let shared = Arc::new(vec![1.0, 2.0]);
        let mut obs = vec![
            LabeledObservation::new(0, "x", Arc::clone(&shared)),
            LabeledObservation::new(1, "x", Arc::new(vec![3.0, 4.0])),
        ];
        transform_zero_one(&mut obs);
        // The caller's original handle keeps its values.
        assert_eq!(*shared, vec![1.0, 2.0]);
        assert_eq!(*obs[0].observation, vec![0.0, 0.0]);
    }
}
