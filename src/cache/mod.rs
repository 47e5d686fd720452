//! Kernel function cache
//!
//! Memoizes similarity values during one training run so repeated (i, j)
//! lookups in the SMO loop never recompute the kernel. Similarity is
//! symmetric, so values are keyed by the unordered pair and stored per
//! row, where the row index is min(i, j). The first request touching a
//! row computes and stores the whole row; later queries are served from
//! storage.

use crate::core::LabeledObservationVector;
use crate::kernel::KernelFunction;

/// Lazy, symmetric, row-oriented cache over a fixed observation vector
/// and a fixed bound kernel.
///
/// The cache is only valid for the parameters bound at construction;
/// binding different parameters means calling [`KernelFunctionCache::rebind`],
/// which drops every cached row.
pub struct KernelFunctionCache {
    kernel: KernelFunction,
    observations: LabeledObservationVector,
    rows: Vec<Option<Vec<f64>>>,
}

impl KernelFunctionCache {
    /// Build a cache over `observations`. The observation handles are
    /// cheap clones of the caller's shared corpus.
    pub fn new(kernel: KernelFunction, observations: &LabeledObservationVector) -> Self {
        let n = observations.len();
        Self {
            kernel,
            observations: observations.to_vec(),
            rows: vec![None; n],
        }
    }

    /// Number of observations covered by the cache.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn kernel(&self) -> &KernelFunction {
        &self.kernel
    }

    pub fn labeled_observations(&self) -> &LabeledObservationVector {
        &self.observations
    }

    /// Full similarity for the unordered pair (i, j), computing the row
    /// min(i, j) on first touch.
    pub fn similarity(&mut self, i: usize, j: usize) -> f64 {
        let (row, col) = if i <= j { (i, j) } else { (j, i) };
        if self.rows[row].is_none() {
            let anchor = &self.observations[row].observation;
            let values: Vec<f64> = (row..self.observations.len())
                .map(|c| {
                    self.kernel
                        .similarity(anchor, &self.observations[c].observation)
                })
                .collect();
            self.rows[row] = Some(values);
        }
        // Row is populated above; col - row is within the stored tail.
        self.rows[row].as_ref().expect("row populated")[col - row]
    }

    /// True if row `r` has never been populated.
    pub fn row_not_cached(&self, r: usize) -> bool {
        self.rows[r].is_none()
    }

    /// Number of rows populated so far.
    pub fn rows_cached(&self) -> usize {
        self.rows.iter().filter(|r| r.is_some()).count()
    }

    /// Replace the kernel (e.g. after binding a new parameter candidate)
    /// and invalidate every cached row.
    pub fn rebind(&mut self, kernel: KernelFunction) {
        self.kernel = kernel;
        self.clear();
    }

    /// Drop all cached rows.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            *row = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LabeledObservation, ParameterSet};
    use crate::kernel::{KernelKind, PARAM_CONSTANT};
    use std::sync::Arc;

    fn observations() -> LabeledObservationVector {
        vec![
            LabeledObservation::new(0, "blue", Arc::new(vec![1.0, 2.0])),
            LabeledObservation::new(1, "blue", Arc::new(vec![3.0, 4.0])),
            LabeledObservation::new(2, "green", Arc::new(vec![5.0, 6.0])),
        ]
    }

    #[test]
    fn test_cache_matches_fresh_similarity() {
        let kernel = KernelFunction::new(KernelKind::Linear);
        let obs = observations();
        let mut cache = KernelFunctionCache::new(kernel.clone(), &obs);

        for i in 0..obs.len() {
            for j in 0..obs.len() {
                let fresh = kernel.similarity(&obs[i].observation, &obs[j].observation);
                assert_eq!(cache.similarity(i, j), fresh);
            }
        }
    }

    #[test]
    fn test_cache_symmetric_access_order() {
        let kernel = KernelFunction::new(KernelKind::Rbf);
        let obs = observations();
        let mut forward = KernelFunctionCache::new(kernel.clone(), &obs);
        let mut backward = KernelFunctionCache::new(kernel, &obs);
        assert_eq!(forward.similarity(0, 2), backward.similarity(2, 0));
    }

    #[test]
    fn test_row_not_cached_tracks_smaller_index() {
        let kernel = KernelFunction::new(KernelKind::Linear);
        let obs = observations();
        let mut cache = KernelFunctionCache::new(kernel, &obs);

        assert!(cache.row_not_cached(0));
        assert!(cache.row_not_cached(1));

        // Accessing (2, 1) touches row 1, not row 2.
        cache.similarity(2, 1);
        assert!(!cache.row_not_cached(1));
        assert!(cache.row_not_cached(0));
        assert!(cache.row_not_cached(2));
        assert_eq!(cache.rows_cached(), 1);
    }

    #[test]
    fn test_rebind_invalidates_rows() {
        let obs = observations();
        let mut cache = KernelFunctionCache::new(KernelFunction::new(KernelKind::Linear), &obs);
        let before = cache.similarity(0, 1);
        assert!(!cache.row_not_cached(0));

        let mut shifted = KernelFunction::new(KernelKind::Linear);
        let mut params = ParameterSet::new();
        params.insert(PARAM_CONSTANT.to_string(), 5.0);
        shifted.set_parameters(&params).unwrap();
        cache.rebind(shifted);

        assert!(cache.row_not_cached(0));
        assert_eq!(cache.similarity(0, 1), before + 5.0);
    }
}
