//! One-vs-one multi-class training
//!
//! Decomposes a multi-label dataset into one binary sub-problem per
//! unordered label pair, grid-searches hyperparameters for each pair with
//! stratified cross-validation, and combines the trained binary models
//! into a voting classifier.

pub mod grid;

pub use self::grid::ParameterSetBuilder;

use crate::cache::KernelFunctionCache;
use crate::core::{
    Diagnostics, Label, LabelPair, LabeledObservationVector, Observation, ParameterSet, Result,
    SvmDataset, SvmError, TrainingInterruption,
};
use crate::kernel::{
    default_kernel_parameter_ranges, KernelFunction, KernelKind, KernelParameterRangeMap, PARAM_C,
};
use crate::kfold::KFoldDivider;
use crate::solver::{SmoTrainer, Svm, DEFAULT_C};
use crate::utils;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default fold count for the outer accuracy estimate of each pair's
/// winning candidate.
pub const DEFAULT_EVALUATION_FOLD_COUNT: usize = 3;
/// Default fold count for candidate selection inside the grid search.
pub const DEFAULT_TRAIN_FOLD_COUNT: usize = 5;

/// Feature scaling applied to the working copy of the corpus before any
/// training starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Standardization {
    None,
    ZeroOne,
    #[default]
    ZeroMeanUnitVariance,
}

impl fmt::Display for Standardization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Standardization::None => "none",
            Standardization::ZeroOne => "zero-one",
            Standardization::ZeroMeanUnitVariance => "standard",
        };
        f.write_str(name)
    }
}

impl FromStr for Standardization {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Standardization::None),
            "zero-one" | "zeroone" => Ok(Standardization::ZeroOne),
            "standard" | "zero-mean" => Ok(Standardization::ZeroMeanUnitVariance),
            other => Err(format!("unknown standardization '{}'", other)),
        }
    }
}

/// Distinct labels in first-appearance order.
pub fn build_label_set(observations: &LabeledObservationVector) -> Vec<Label> {
    let mut labels = Vec::new();
    for lo in observations {
        if !labels.contains(&lo.label) {
            labels.push(lo.label.clone());
        }
    }
    labels
}

/// Every unordered pair of distinct labels: n(n-1)/2 pairs.
pub fn build_label_pair_set(labels: &[Label]) -> Result<Vec<LabelPair>> {
    let mut pairs = Vec::with_capacity(labels.len() * labels.len().saturating_sub(1) / 2);
    for (i, a) in labels.iter().enumerate() {
        for b in &labels[i + 1..] {
            pairs.push(LabelPair::new(a.clone(), b.clone())?);
        }
    }
    Ok(pairs)
}

/// Partition the corpus by label, preserving per-label order.
pub fn build_label_to_labeled_observation_vector(
    observations: &LabeledObservationVector,
) -> BTreeMap<Label, LabeledObservationVector> {
    let mut map: BTreeMap<Label, LabeledObservationVector> = BTreeMap::new();
    for lo in observations {
        map.entry(lo.label.clone()).or_default().push(lo.clone());
    }
    map
}

/// A trained one-vs-one ensemble: one binary model per label pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiClassSvm {
    svms: Vec<Svm>,
    labels: Vec<Label>,
}

impl MultiClassSvm {
    pub(crate) fn new(svms: Vec<Svm>, labels: Vec<Label>) -> Self {
        Self { svms, labels }
    }

    pub fn svms(&self) -> &[Svm] {
        &self.svms
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Classify by majority vote over the binary models. Vote ties are
    /// broken by the larger summed discriminant magnitude, and an exact
    /// magnitude tie by the lexicographically smaller label, so the
    /// answer is deterministic.
    pub fn classify(&self, x: &Observation) -> Result<&Label> {
        if self.svms.is_empty() {
            return Err(SvmError::Configuration(
                "model holds no trained binary classifiers".to_string(),
            ));
        }

        let mut votes: BTreeMap<&Label, usize> = BTreeMap::new();
        let mut magnitudes: BTreeMap<&Label, f64> = BTreeMap::new();
        for svm in &self.svms {
            let d = svm.discriminant(x);
            let winner = svm.class_to_label().label_for(d);
            *votes.entry(winner).or_insert(0) += 1;
            *magnitudes.entry(winner).or_insert(0.0) += d.abs();
        }

        let mut best: Option<(&Label, usize, f64)> = None;
        // BTreeMap iteration is ascending, so keeping strict improvements
        // leaves the lexicographically smallest label on exact ties.
        for (&label, &count) in &votes {
            let magnitude = magnitudes[label];
            let better = match best {
                None => true,
                Some((_, best_count, best_magnitude)) => {
                    count > best_count || (count == best_count && magnitude > best_magnitude)
                }
            };
            if better {
                best = Some((label, count, magnitude));
            }
        }
        // The vote map is non-empty whenever svms is.
        best.map(|(label, _, _)| label).ok_or_else(|| {
            SvmError::Configuration("model holds no trained binary classifiers".to_string())
        })
    }

    /// Fraction of `observations` the ensemble classifies correctly.
    pub fn accuracy(&self, observations: &LabeledObservationVector) -> Result<f64> {
        if observations.is_empty() {
            return Err(SvmError::MalformedInput(
                "cannot score an empty observation vector".to_string(),
            ));
        }
        let mut correct = 0;
        for lo in observations {
            if self.classify(&lo.observation)? == &lo.label {
                correct += 1;
            }
        }
        Ok(correct as f64 / observations.len() as f64)
    }
}

/// One-vs-one trainer with per-pair hyperparameter grid search.
///
/// For every label pair the trainer enumerates all candidates from its
/// kernel parameter ranges, scores each candidate by stratified
/// cross-validation over `train_fold_count` folds, estimates the winning
/// candidate's held-out accuracy over `evaluation_fold_count` folds, and
/// finally retrains the winner on the pair's full subset. Ties between
/// candidates keep the first seen.
pub struct OneVsOneTrainer {
    kernel_parameter_ranges: KernelParameterRangeMap,
    evaluation_fold_count: usize,
    train_fold_count: usize,
    standardization: Standardization,
}

impl Default for OneVsOneTrainer {
    fn default() -> Self {
        Self {
            kernel_parameter_ranges: default_kernel_parameter_ranges(),
            evaluation_fold_count: DEFAULT_EVALUATION_FOLD_COUNT,
            train_fold_count: DEFAULT_TRAIN_FOLD_COUNT,
            standardization: Standardization::default(),
        }
    }
}

impl OneVsOneTrainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_kernel_parameter_ranges(&mut self, ranges: KernelParameterRangeMap) {
        self.kernel_parameter_ranges = ranges;
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

    /// Train a multi-class model over the dataset. Fails with a
    /// configuration error when the dataset carries fewer than two labels
    /// or the parameter ranges are empty; training interruption aborts
    /// the whole run.
    pub fn train(
        &self,
        dataset: &SvmDataset,
        interruption: &dyn TrainingInterruption,
        diagnostics: &dyn Diagnostics,
    ) -> Result<MultiClassSvm> {
        if self.kernel_parameter_ranges.is_empty() {
            return Err(SvmError::Configuration(
                "no kernel parameter ranges to search".to_string(),
            ));
        }

        let mut observations = dataset.labeled_observations().clone();
        match self.standardization {
            Standardization::None => {}
            Standardization::ZeroOne => utils::transform_zero_one(&mut observations),
            Standardization::ZeroMeanUnitVariance => {
                utils::transform_zero_mean_unit_variance(&mut observations)
            }
        }

        let labels = build_label_set(&observations);
        if labels.len() < 2 {
            return Err(SvmError::Configuration(format!(
                "multi-class training requires at least two labels, found {}",
                labels.len()
            )));
        }
        let pairs = build_label_pair_set(&labels)?;
        if diagnostics.allows_info() {
            info!(
                "training {} binary classifiers over {} labels",
                pairs.len(),
                labels.len()
            );
        }

        let mut svms = Vec::with_capacity(pairs.len());
        for pair in &pairs {
            let pair_observations: LabeledObservationVector = observations
                .iter()
                .filter(|lo| pair.contains(&lo.label))
                .cloned()
                .collect();
            let svm =
                self.train_pair(pair, &pair_observations, interruption, diagnostics)?;
            svms.push(svm);
        }

        Ok(MultiClassSvm::new(svms, labels))
    }

    fn train_pair(
        &self,
        pair: &LabelPair,
        observations: &LabeledObservationVector,
        interruption: &dyn TrainingInterruption,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Svm> {
        let mut best: Option<(KernelKind, ParameterSet, f64)> = None;
        for (&kind, ranges) in &self.kernel_parameter_ranges {
            for candidate in ParameterSetBuilder::new(ranges).parameter_sets() {
                let accuracy = self.evaluate_candidate(
                    kind,
                    candidate,
                    observations,
                    self.train_fold_count,
                    interruption,
                )?;
                let Some(accuracy) = accuracy else {
                    if diagnostics.allows_debug() {
                        debug!("pair {}: {} candidate {:?} failed", pair, kind, candidate);
                    }
                    continue;
                };
                if diagnostics.allows_trace() {
                    trace!(
                        "pair {}: {} candidate {:?} scored {:.4}",
                        pair,
                        kind,
                        candidate,
                        accuracy
                    );
                }
                // Strict improvement only: first-seen wins ties.
                let improves = match &best {
                    None => true,
                    Some((_, _, best_accuracy)) => accuracy > *best_accuracy,
                };
                if improves {
                    best = Some((kind, candidate.clone(), accuracy));
                }
            }
        }

        let (kind, parameters, selection_accuracy) = best.ok_or_else(|| {
            SvmError::Configuration(format!(
                "no hyperparameter candidate trained successfully for pair {}",
                pair
            ))
        })?;
        if diagnostics.allows_debug() {
            debug!(
                "pair {}: selected {} {:?} (selection accuracy {:.4})",
                pair, kind, parameters, selection_accuracy
            );
        }

        let evaluation_accuracy = self
            .evaluate_candidate(
                kind,
                &parameters,
                observations,
                self.evaluation_fold_count,
                interruption,
            )?
            .ok_or_else(|| {
                SvmError::Configuration(format!(
                    "winning candidate for pair {} failed its evaluation folds",
                    pair
                ))
            })?;

        let (mut cache, trainer) = bind_candidate(kind, &parameters, observations)?;
        let mut svm = trainer.train(&mut cache, interruption)?;
        svm.set_cross_validation_accuracy(evaluation_accuracy);
        if diagnostics.allows_info() {
            info!(
                "pair {}: cross-validation accuracy {:.4}, {} support vectors",
                pair,
                evaluation_accuracy,
                svm.support_vectors().len()
            );
        }
        Ok(svm)
    }

    /// Cross-validated accuracy of one candidate, or `None` when the
    /// candidate cannot be trained (singular sub-problems, invalid
    /// parameter values). Interruption is never swallowed.
    fn evaluate_candidate(
        &self,
        kind: KernelKind,
        parameters: &ParameterSet,
        observations: &LabeledObservationVector,
        fold_count: usize,
        interruption: &dyn TrainingInterruption,
    ) -> Result<Option<f64>> {
        let mut divider = KFoldDivider::new(fold_count, observations);
        if divider.start().is_err() {
            return Ok(None);
        }

        let mut correct = 0usize;
        let mut total = 0usize;
        while !divider.end() {
            let outcome = bind_candidate(kind, parameters, divider.training_data())
                .and_then(|(mut cache, trainer)| trainer.train(&mut cache, interruption));
            let svm = match outcome {
                Ok(svm) => svm,
                Err(SvmError::TrainingInterrupted) => return Err(SvmError::TrainingInterrupted),
                Err(_) => return Ok(None),
            };
            for lo in divider.testing_data() {
                if svm.classify(&lo.observation) == &lo.label {
                    correct += 1;
                }
                total += 1;
            }
            divider.next();
        }

        if total == 0 {
            return Ok(None);
        }
        Ok(Some(correct as f64 / total as f64))
    }
}

/// Bind one grid candidate: the kernel with its named parameters and an
/// SMO trainer carrying the candidate's `c`.
fn bind_candidate(
    kind: KernelKind,
    parameters: &ParameterSet,
    observations: &LabeledObservationVector,
) -> Result<(KernelFunctionCache, SmoTrainer)> {
    let mut kernel = KernelFunction::new(kind);
    kernel.set_parameters(parameters)?;
    let mut trainer = SmoTrainer::new();
    trainer.set_c(parameters.get(PARAM_C).copied().unwrap_or(DEFAULT_C));
    Ok((KernelFunctionCache::new(kernel, observations), trainer))
}
