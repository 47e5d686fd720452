//! SVM-based recursive feature elimination
//!
//! Ranks features by repeatedly training linear one-vs-one models and
//! discarding the feature with the smallest squared-weight importance,
//! summed across the binary models. Removal works on an owned copy of
//! the corpus, so the caller's dataset is never modified; each removal
//! swaps the doomed column with the last one and shrinks every row,
//! with the feature descriptors moved in lockstep so original indices
//! survive the reordering.

use crate::core::{
    Diagnostics, Feature, FeatureVector, LabeledObservationVector, Result, SvmDataset, SvmError,
    TrainingInterruption,
};
use crate::kernel::{KernelFunction, KernelKind, KernelParameterRangeMap};
use crate::multiclass::{
    OneVsOneTrainer, Standardization, DEFAULT_EVALUATION_FOLD_COUNT, DEFAULT_TRAIN_FOLD_COUNT,
};
use log::{debug, info};
use std::sync::Arc;

/// One feature's elimination record: the round (1-based) in which the
/// feature was discarded. The feature surviving every round carries the
/// final round number, so higher rounds mean more important features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedFeature {
    pub feature: Feature,
    pub round: usize,
}

/// Recursive feature elimination driver.
///
/// Only the linear kernel is searched: squared primal weights are the
/// importance measure, and no per-feature weight exists for the other
/// kernels.
pub struct SvmRfe {
    linear_parameter_ranges: crate::core::ParameterRangeMap,
    evaluation_fold_count: usize,
    train_fold_count: usize,
    standardization: Standardization,
}

impl Default for SvmRfe {
    fn default() -> Self {
        Self {
            linear_parameter_ranges: KernelFunction::default_parameter_ranges(KernelKind::Linear),
            evaluation_fold_count: DEFAULT_EVALUATION_FOLD_COUNT,
            train_fold_count: DEFAULT_TRAIN_FOLD_COUNT,
            standardization: Standardization::default(),
        }
    }
}

impl SvmRfe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_linear_parameter_ranges(&mut self, ranges: crate::core::ParameterRangeMap) {
        self.linear_parameter_ranges = ranges;
    }

    pub fn set_evaluation_fold_count(&mut self, fold_count: usize) {
        self.evaluation_fold_count = fold_count;
    }

    pub fn set_train_fold_count(&mut self, fold_count: usize) {
        self.train_fold_count = fold_count;
    }

    pub fn set_standardization(&mut self, standardization: Standardization) {
        self.standardization = standardization;
    }

    /// Rank every feature of the dataset, least important first.
    pub fn rank(
        &self,
        dataset: &SvmDataset,
        interruption: &dyn TrainingInterruption,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Vec<RankedFeature>> {
        let mut observations = dataset.labeled_observations().clone();
        match self.standardization {
            Standardization::None => {}
            Standardization::ZeroOne => crate::utils::transform_zero_one(&mut observations),
            Standardization::ZeroMeanUnitVariance => {
                crate::utils::transform_zero_mean_unit_variance(&mut observations)
            }
        }
        let mut features: FeatureVector = dataset.feature_vector().to_vec();

        let total = features.len();
        if diagnostics.allows_info() {
            info!("ranking {} features by recursive elimination", total);
        }

        let trainer = self.linear_trainer();
        let mut ranking = Vec::with_capacity(total);
        let mut round = 1;
        while features.len() > 1 {
            if interruption.should_interrupt() {
                return Err(SvmError::TrainingInterrupted);
            }

            let working = SvmDataset::new(observations.clone(), features.clone())?;
            let model = trainer.train(&working, interruption, diagnostics)?;
            let importance = feature_importance(&model, features.len());

            let doomed = least_important_column(&importance);
            if diagnostics.allows_debug() {
                debug!(
                    "round {}: discarding '{}' (importance {:.6})",
                    round, features[doomed].name, importance[doomed]
                );
            }

            ranking.push(RankedFeature {
                feature: features.swap_remove(doomed),
                round,
            });
            remove_column(&mut observations, doomed);
            round += 1;
        }

        if let Some(survivor) = features.pop() {
            ranking.push(RankedFeature {
                feature: survivor,
                round,
            });
        }
        Ok(ranking)
    }

    fn linear_trainer(&self) -> OneVsOneTrainer {
        let mut ranges = KernelParameterRangeMap::new();
        ranges.insert(KernelKind::Linear, self.linear_parameter_ranges.clone());
        let mut trainer = OneVsOneTrainer::new();
        trainer.set_kernel_parameter_ranges(ranges);
        trainer.set_evaluation_fold_count(self.evaluation_fold_count);
        trainer.set_train_fold_count(self.train_fold_count);
        // Scaling already happened on the working copy.
        trainer.set_standardization(Standardization::None);
        trainer
    }
}

/// Per-column importance: squared linear weights summed across every
/// binary model of the ensemble. Models without support vectors
/// contribute nothing.
fn feature_importance(model: &crate::multiclass::MultiClassSvm, width: usize) -> Vec<f64> {
    let mut importance = vec![0.0; width];
    for svm in model.svms() {
        if let Some(weights) = svm.linear_weights() {
            for (total, w) in importance.iter_mut().zip(weights.iter()) {
                *total += w * w;
            }
        }
    }
    importance
}

/// Index of the smallest importance; ties keep the smallest column.
fn least_important_column(importance: &[f64]) -> usize {
    let mut doomed = 0;
    for (j, &value) in importance.iter().enumerate().skip(1) {
        if value < importance[doomed] {
            doomed = j;
        }
    }
    doomed
}

/// Swap-remove column `j` from every observation row.
fn remove_column(observations: &mut LabeledObservationVector, j: usize) {
    for lo in observations.iter_mut() {
        Arc::make_mut(&mut lo.observation).swap_remove(j);
    }
}
