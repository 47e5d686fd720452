//! Sequential Minimal Optimization (SMO) trainer
//!
//! Solves the soft-margin binary SVM dual problem by repeatedly picking a
//! pair of Lagrange multipliers that violate the KKT conditions beyond a
//! tolerance and solving the resulting 2-variable sub-problem in closed
//! form, clipped to the box and equality constraints. The bias term is
//! carried through every step using the standard b1/b2 rule.

use crate::cache::KernelFunctionCache;
use crate::core::{
    Label, LabeledObservationVector, Observation, Result, SvmError, TrainingInterruption,
};
use crate::kernel::KernelFunction;
use crate::core::LabelPair;
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default regularization constant.
pub const DEFAULT_C: f64 = 1.0;
/// Default KKT tolerance.
pub const DEFAULT_EPSILON: f64 = 1e-3;
/// Default bound on outer SMO iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Reverse mapping from the numeric classes −1/+1 back to the original
/// labels: the first-seen label maps to −1, the second distinct label
/// to +1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericClassToLabel {
    negative: Label,
    positive: Label,
}

impl NumericClassToLabel {
    pub fn negative(&self) -> &Label {
        &self.negative
    }

    pub fn positive(&self) -> &Label {
        &self.positive
    }

    /// Label for the sign of a discriminant value.
    pub fn label_for(&self, discriminant: f64) -> &Label {
        if discriminant < 0.0 {
            &self.negative
        } else {
            &self.positive
        }
    }
}

/// Deterministically map the two distinct labels of `observations` to
/// −1 and +1 (first-seen → −1), returning the numeric label vector and
/// the reverse mapping. Fails with a configuration error when the input
/// carries fewer or more than two distinct labels.
pub fn assign_numeric_labels(
    observations: &LabeledObservationVector,
) -> Result<(Vec<f64>, NumericClassToLabel)> {
    let mut negative: Option<&Label> = None;
    let mut positive: Option<&Label> = None;

    for lo in observations {
        match (&negative, &positive) {
            (None, _) => negative = Some(&lo.label),
            (Some(n), None) if *n != &lo.label => positive = Some(&lo.label),
            (Some(n), Some(p)) if *n != &lo.label && *p != &lo.label => {
                return Err(SvmError::Configuration(format!(
                    "binary training requires exactly two distinct labels, found a third: '{}'",
                    lo.label
                )));
            }
            _ => {}
        }
    }

    let (negative, positive) = match (negative, positive) {
        (Some(n), Some(p)) => (n.clone(), p.clone()),
        _ => {
            return Err(SvmError::Configuration(
                "binary training requires exactly two distinct labels".to_string(),
            ))
        }
    };

    let y = observations
        .iter()
        .map(|lo| if lo.label == negative { -1.0 } else { 1.0 })
        .collect();

    Ok((y, NumericClassToLabel { negative, positive }))
}

/// Element-wise vector multiply: `out[i] = a[i] * b[i]`.
///
/// All three slices must have the same length.
pub fn elementwise_multiply(a: &[f64], b: &[f64], out: &mut [f64]) {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len(), out.len());
    for ((o, &x), &y) in out.iter_mut().zip(a.iter()).zip(b.iter()) {
        *o = x * y;
    }
}

/// A support vector retained by a trained binary model: the shared
/// observation, its non-zero multiplier, and its numeric class sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportVector {
    pub observation: Arc<Observation>,
    pub alpha: f64,
    pub y: f64,
}

/// A trained binary SVM over one label pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Svm {
    label_pair: LabelPair,
    kernel: KernelFunction,
    support_vectors: Vec<SupportVector>,
    bias: f64,
    class_to_label: NumericClassToLabel,
    /// Held-out accuracy estimated by the outer cross-validation of the
    /// one-vs-one trainer, when available.
    cross_validation_accuracy: Option<f64>,
}

impl Svm {
    pub(crate) fn new(
        kernel: KernelFunction,
        support_vectors: Vec<SupportVector>,
        bias: f64,
        class_to_label: NumericClassToLabel,
    ) -> Result<Self> {
        let label_pair = LabelPair::new(
            class_to_label.negative().clone(),
            class_to_label.positive().clone(),
        )?;
        Ok(Self {
            label_pair,
            kernel,
            support_vectors,
            bias,
            class_to_label,
            cross_validation_accuracy: None,
        })
    }

    pub fn label_pair(&self) -> &LabelPair {
        &self.label_pair
    }

    pub fn kernel(&self) -> &KernelFunction {
        &self.kernel
    }

    pub fn support_vectors(&self) -> &[SupportVector] {
        &self.support_vectors
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn cross_validation_accuracy(&self) -> Option<f64> {
        self.cross_validation_accuracy
    }

    pub fn class_to_label(&self) -> &NumericClassToLabel {
        &self.class_to_label
    }

    pub(crate) fn set_cross_validation_accuracy(&mut self, accuracy: f64) {
        self.cross_validation_accuracy = Some(accuracy);
    }

    /// Signed margin function: Σ alpha_i y_i K(x_i, x) + b.
    pub fn discriminant(&self, x: &Observation) -> f64 {
        let mut value = self.bias;
        for sv in &self.support_vectors {
            value += sv.alpha * sv.y * self.kernel.similarity(&sv.observation, x);
        }
        value
    }

    /// Map the sign of the discriminant through the label mapping.
    pub fn classify(&self, x: &Observation) -> &Label {
        self.class_to_label.label_for(self.discriminant(x))
    }

    /// Primal weight vector for linear kernels: w = Σ alpha_i y_i x_i.
    /// Returns `None` for non-linear kernels, where no per-feature weight
    /// exists, or when the model has no support vectors.
    pub fn linear_weights(&self) -> Option<Vec<f64>> {
        if !matches!(self.kernel, KernelFunction::Linear(_)) {
            return None;
        }
        let first = self.support_vectors.first()?;
        let mut weights = vec![0.0; first.observation.len()];
        for sv in &self.support_vectors {
            for (w, &x) in weights.iter_mut().zip(sv.observation.iter()) {
                *w += sv.alpha * sv.y * x;
            }
        }
        Some(weights)
    }
}

/// SMO trainer for one binary sub-problem.
#[derive(Debug, Clone)]
pub struct SmoTrainer {
    c: f64,
    epsilon: f64,
    max_iterations: usize,
}

impl Default for SmoTrainer {
    fn default() -> Self {
        Self {
            c: DEFAULT_C,
            epsilon: DEFAULT_EPSILON,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SmoTrainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_c(&mut self, c: f64) {
        self.c = c;
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.max_iterations = max_iterations;
    }

    /// Train a binary SVM on the observations held by `cache`, which must
    /// carry exactly two distinct labels. The interruption signal is
    /// polled at outer-iteration boundaries; a positive answer aborts with
    /// [`SvmError::TrainingInterrupted`]. Fails with
    /// [`SvmError::MalformedInput`] when KKT violations remain but no
    /// multiplier ever moved, i.e. the input admits no optimization step
    /// at all.
    pub fn train(
        &self,
        cache: &mut KernelFunctionCache,
        interruption: &dyn TrainingInterruption,
    ) -> Result<Svm> {
        if cache.is_empty() {
            return Err(SvmError::MalformedInput("empty dataset".to_string()));
        }

        let observations = cache.labeled_observations().clone();
        let (y, class_to_label) = assign_numeric_labels(&observations)?;
        let n = observations.len();

        let mut alpha = vec![0.0; n];
        let mut bias = 0.0;
        // E_i = f(x_i) - y_i; all alphas start at zero, so f = b = 0.
        let mut errors: Vec<f64> = y.iter().map(|&yi| -yi).collect();

        let mut iterations = 0;
        let mut num_changed = 0;
        let mut examine_all = true;

        while (num_changed > 0 || examine_all) && iterations < self.max_iterations {
            if interruption.should_interrupt() {
                return Err(SvmError::TrainingInterrupted);
            }
            num_changed = 0;

            for i in 0..n {
                let at_bound = alpha[i] <= 0.0 || alpha[i] >= self.c;
                if !examine_all && at_bound {
                    continue;
                }
                if self.examine_example(i, cache, &y, &mut alpha, &mut errors, &mut bias) {
                    num_changed += 1;
                }
            }

            if examine_all {
                examine_all = false;
            } else if num_changed == 0 {
                examine_all = true;
            }

            iterations += 1;
        }

        let unresolved = (0..n)
            .filter(|&i| self.violates_kkt(alpha[i], errors[i], y[i]))
            .count();
        if unresolved > 0 {
            if alpha.iter().all(|&a| a <= 0.0) {
                return Err(SvmError::MalformedInput(format!(
                    "optimization made no progress: {} multipliers still violate the \
                     KKT conditions and none moved",
                    unresolved
                )));
            }
            warn!(
                "training stopped with {} KKT violations outstanding",
                unresolved
            );
        }

        trace!(
            "smo converged after {} iterations ({} multipliers non-zero)",
            iterations,
            alpha.iter().filter(|&&a| a > self.epsilon).count()
        );

        let mut coefficients = vec![0.0; n];
        elementwise_multiply(&alpha, &y, &mut coefficients);

        let support_vectors: Vec<SupportVector> = observations
            .iter()
            .enumerate()
            .filter(|(i, _)| alpha[*i] > self.epsilon)
            .map(|(i, lo)| SupportVector {
                observation: Arc::clone(&lo.observation),
                alpha: coefficients[i].abs(),
                y: y[i],
            })
            .collect();

        Svm::new(cache.kernel().clone(), support_vectors, bias, class_to_label)
    }

    /// Check one multiplier for a KKT violation and, if found, try a step
    /// against the second multiplier chosen by the |E_i − E_j| heuristic.
    fn examine_example(
        &self,
        i: usize,
        cache: &mut KernelFunctionCache,
        y: &[f64],
        alpha: &mut [f64],
        errors: &mut [f64],
        bias: &mut f64,
    ) -> bool {
        if !self.violates_kkt(alpha[i], errors[i], y[i]) {
            return false;
        }

        if let Some(j) = select_second(i, errors) {
            if self.take_step(i, j, cache, y, alpha, errors, bias) {
                return true;
            }
        }

        // The heuristic choice can fail on a degenerate sub-problem (eta
        // at zero, or a step too small to count). Fall back over the
        // remaining candidates: non-bound multipliers first, then all.
        let n = errors.len();
        for offset in 0..n {
            let j = (i + 1 + offset) % n;
            if j == i || alpha[j] <= 0.0 || alpha[j] >= self.c {
                continue;
            }
            if self.take_step(i, j, cache, y, alpha, errors, bias) {
                return true;
            }
        }
        for offset in 0..n {
            let j = (i + 1 + offset) % n;
            if j == i {
                continue;
            }
            if self.take_step(i, j, cache, y, alpha, errors, bias) {
                return true;
            }
        }
        false
    }

    fn violates_kkt(&self, alpha: f64, error: f64, y: f64) -> bool {
        let r = error * y;
        (r < -self.epsilon && alpha < self.c) || (r > self.epsilon && alpha > 0.0)
    }

    /// Closed-form solve of the 2-variable sub-problem for multipliers
    /// i and j, clipped to the box [0, C] and the equality constraint.
    #[allow(clippy::too_many_arguments)]
    fn take_step(
        &self,
        i: usize,
        j: usize,
        cache: &mut KernelFunctionCache,
        y: &[f64],
        alpha: &mut [f64],
        errors: &mut [f64],
        bias: &mut f64,
    ) -> bool {
        if i == j {
            return false;
        }

        let alpha_i_old = alpha[i];
        let alpha_j_old = alpha[j];
        let e_i = errors[i];
        let e_j = errors[j];
        let s = y[i] * y[j];

        let (low, high) = if (y[i] - y[j]).abs() > f64::EPSILON {
            let diff = alpha_j_old - alpha_i_old;
            (0.0f64.max(diff), self.c.min(self.c + diff))
        } else {
            let sum = alpha_i_old + alpha_j_old;
            (0.0f64.max(sum - self.c), self.c.min(sum))
        };
        if low >= high {
            return false;
        }

        let k_ii = cache.similarity(i, i);
        let k_ij = cache.similarity(i, j);
        let k_jj = cache.similarity(j, j);
        let eta = k_ii + k_jj - 2.0 * k_ij;
        if eta <= 0.0 {
            // Degenerate kernel row: skipping the pair is mathematically
            // safe, progress will come from another pair if any exists.
            return false;
        }

        let mut alpha_j_new = alpha_j_old + y[j] * (e_i - e_j) / eta;
        alpha_j_new = alpha_j_new.clamp(low, high);

        if (alpha_j_new - alpha_j_old).abs()
            < self.epsilon * (alpha_j_new + alpha_j_old + self.epsilon)
        {
            return false;
        }

        let alpha_i_new = alpha_i_old + s * (alpha_j_old - alpha_j_new);

        let delta_i = alpha_i_new - alpha_i_old;
        let delta_j = alpha_j_new - alpha_j_old;

        // Bias from the step's support vectors (b1/b2 rule).
        let b1 = *bias - e_i - y[i] * delta_i * k_ii - y[j] * delta_j * k_ij;
        let b2 = *bias - e_j - y[i] * delta_i * k_ij - y[j] * delta_j * k_jj;
        let bias_new = if alpha_i_new > 0.0 && alpha_i_new < self.c {
            b1
        } else if alpha_j_new > 0.0 && alpha_j_new < self.c {
            b2
        } else {
            (b1 + b2) / 2.0
        };
        let delta_bias = bias_new - *bias;

        alpha[i] = alpha_i_new;
        alpha[j] = alpha_j_new;
        *bias = bias_new;

        for k in 0..errors.len() {
            let k_ik = cache.similarity(i, k);
            let k_jk = cache.similarity(j, k);
            errors[k] += y[i] * delta_i * k_ik + y[j] * delta_j * k_jk + delta_bias;
        }

        true
    }
}

/// Second-choice heuristic: the multiplier maximizing |E_i − E_j|.
fn select_second(i: usize, errors: &[f64]) -> Option<usize> {
    let e_i = errors[i];
    let mut best: Option<(usize, f64)> = None;
    for (j, &e_j) in errors.iter().enumerate() {
        if j == i {
            continue;
        }
        let diff = (e_i - e_j).abs();
        match best {
            Some((_, best_diff)) if diff <= best_diff => {}
            _ => best = Some((j, diff)),
        }
    }
    best.map(|(j, _)| j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LabeledObservation, NeverInterrupt};
    use crate::kernel::KernelKind;

    fn labeled(values: &[(&str, Vec<f64>)]) -> LabeledObservationVector {
        values
            .iter()
            .enumerate()
            .map(|(i, (label, obs))| LabeledObservation::new(i, *label, Arc::new(obs.clone())))
            .collect()
    }

    #[test]
    fn test_assign_numeric_labels_first_seen_is_negative() {
        let observations = labeled(&[
            ("label_0", vec![0.0]),
            ("label_2", vec![0.0]),
            ("label_0", vec![0.0]),
            ("label_2", vec![0.0]),
        ]);
        let (y, mapping) = assign_numeric_labels(&observations).unwrap();
        assert_eq!(y, vec![-1.0, 1.0, -1.0, 1.0]);
        assert_eq!(mapping.negative(), "label_0");
        assert_eq!(mapping.positive(), "label_2");
        assert_eq!(mapping.label_for(-0.5), "label_0");
        assert_eq!(mapping.label_for(0.5), "label_2");
    }

    #[test]
    fn test_assign_numeric_labels_rejects_one_label() {
        let observations = labeled(&[
            ("label_0", vec![0.0]),
            ("label_0", vec![0.0]),
            ("label_0", vec![0.0]),
        ]);
        assert!(matches!(
            assign_numeric_labels(&observations),
            Err(SvmError::Configuration(_))
        ));
    }

    #[test]
    fn test_assign_numeric_labels_rejects_three_labels() {
        let observations = labeled(&[
            ("label_0", vec![0.0]),
            ("label_1", vec![0.0]),
            ("label_2", vec![0.0]),
        ]);
        assert!(matches!(
            assign_numeric_labels(&observations),
            Err(SvmError::Configuration(_))
        ));
    }

    #[test]
    fn test_elementwise_multiply() {
        let a = vec![2.0, 2.0];
        let b = vec![0.5, 0.5];
        let mut c = vec![0.0, 0.0];
        elementwise_multiply(&a, &b, &mut c);
        assert_eq!(c, vec![1.0, 1.0]);
    }

    #[test]
    fn test_train_separable_pair() {
        let observations = labeled(&[("neg", vec![-2.0]), ("pos", vec![2.0])]);
        let mut cache =
            KernelFunctionCache::new(KernelFunction::new(KernelKind::Linear), &observations);
        let svm = SmoTrainer::new().train(&mut cache, &NeverInterrupt).unwrap();

        assert!(!svm.support_vectors().is_empty());
        assert_eq!(svm.classify(&vec![-3.0]), "neg");
        assert_eq!(svm.classify(&vec![3.0]), "pos");
        assert!(svm.discriminant(&vec![-3.0]) < 0.0);
        assert!(svm.discriminant(&vec![3.0]) > 0.0);
    }

    #[test]
    fn test_train_separable_cluster() {
        let observations = labeled(&[
            ("a", vec![1.0, 1.0]),
            ("a", vec![1.5, 0.5]),
            ("a", vec![0.5, 1.5]),
            ("b", vec![5.0, 5.0]),
            ("b", vec![5.5, 4.5]),
            ("b", vec![4.5, 5.5]),
        ]);
        let mut cache =
            KernelFunctionCache::new(KernelFunction::new(KernelKind::Linear), &observations);
        let svm = SmoTrainer::new().train(&mut cache, &NeverInterrupt).unwrap();

        for lo in &observations {
            assert_eq!(svm.classify(&lo.observation), &lo.label);
        }
    }

    #[test]
    fn test_train_respects_box_constraint() {
        let observations = labeled(&[
            ("a", vec![1.0]),
            ("b", vec![-1.0]),
            ("a", vec![0.5]),
            ("b", vec![-0.5]),
        ]);
        let mut trainer = SmoTrainer::new();
        trainer.set_c(0.001);
        let mut cache =
            KernelFunctionCache::new(KernelFunction::new(KernelKind::Linear), &observations);
        let svm = trainer.train(&mut cache, &NeverInterrupt).unwrap();
        for sv in svm.support_vectors() {
            assert!(sv.alpha <= 0.001 + 1e-10);
        }
    }

    #[test]
    fn test_train_identical_points_with_opposite_labels_is_rejected() {
        // No 2-variable sub-problem has positive curvature here, so no
        // multiplier can ever move while the KKT conditions stay violated.
        let observations = labeled(&[("a", vec![1.0, 2.0]), ("b", vec![1.0, 2.0])]);
        let mut cache =
            KernelFunctionCache::new(KernelFunction::new(KernelKind::Linear), &observations);
        let result = SmoTrainer::new().train(&mut cache, &NeverInterrupt);
        assert!(matches!(result, Err(SvmError::MalformedInput(_))));
    }

    #[test]
    fn test_train_falls_back_past_degenerate_second_choice() {
        // For the first two points the |E_i - E_j| heuristic picks the
        // coincident twin, whose sub-problem is degenerate; the remaining
        // candidates still admit progress.
        let observations = labeled(&[
            ("a", vec![0.0]),
            ("b", vec![0.0]),
            ("b", vec![5.0]),
            ("a", vec![-5.0]),
        ]);
        let mut cache =
            KernelFunctionCache::new(KernelFunction::new(KernelKind::Linear), &observations);
        let svm = SmoTrainer::new().train(&mut cache, &NeverInterrupt).unwrap();

        assert!(!svm.support_vectors().is_empty());
        assert_eq!(svm.classify(&vec![5.0]), "b");
        assert_eq!(svm.classify(&vec![-5.0]), "a");
    }

    #[test]
    fn test_train_interrupted() {
        struct AlwaysInterrupt;
        impl TrainingInterruption for AlwaysInterrupt {
            fn should_interrupt(&self) -> bool {
                true
            }
        }

        let observations = labeled(&[("a", vec![1.0]), ("b", vec![-1.0])]);
        let mut cache =
            KernelFunctionCache::new(KernelFunction::new(KernelKind::Linear), &observations);
        let result = SmoTrainer::new().train(&mut cache, &AlwaysInterrupt);
        assert!(matches!(result, Err(SvmError::TrainingInterrupted)));
    }

    #[test]
    fn test_train_empty_dataset() {
        let observations = LabeledObservationVector::new();
        let mut cache =
            KernelFunctionCache::new(KernelFunction::new(KernelKind::Linear), &observations);
        let result = SmoTrainer::new().train(&mut cache, &NeverInterrupt);
        assert!(matches!(result, Err(SvmError::MalformedInput(_))));
    }

    #[test]
    fn test_linear_weights_recover_direction() {
        let observations = labeled(&[
            ("a", vec![-1.0, 0.0]),
            ("a", vec![-2.0, 0.1]),
            ("b", vec![1.0, 0.0]),
            ("b", vec![2.0, -0.1]),
        ]);
        let mut cache =
            KernelFunctionCache::new(KernelFunction::new(KernelKind::Linear), &observations);
        let svm = SmoTrainer::new().train(&mut cache, &NeverInterrupt).unwrap();
        let weights = svm.linear_weights().unwrap();
        // The first feature separates the classes; it must dominate.
        assert!(weights[0].abs() > weights[1].abs());
        assert!(weights[0] > 0.0);
    }

    #[test]
    fn test_linear_weights_none_for_rbf() {
        let observations = labeled(&[("a", vec![-1.0]), ("b", vec![1.0])]);
        let mut cache =
            KernelFunctionCache::new(KernelFunction::new(KernelKind::Rbf), &observations);
        let svm = SmoTrainer::new().train(&mut cache, &NeverInterrupt).unwrap();
        assert!(svm.linear_weights().is_none());
    }
}
