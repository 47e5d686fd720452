//! Stratified k-fold divider for labeled observations
//!
//! Partitions each label's observations independently into `k` contiguous,
//! order-preserving groups whose sizes differ by at most one, then walks
//! the folds with an explicit `start`/`next`/`end` protocol. Fold `i`'s
//! test set is group `i` of every label concatenated in label order; its
//! training set is every other group, with per-label relative order
//! preserved. Before `start` (and after exhaustion) the divider reports
//! `end() == true` and the fold count as a sentinel fold number.

use crate::core::{Label, LabeledObservationVector, Result, SvmError};

pub struct KFoldDivider {
    fold_count: usize,
    observations: LabeledObservationVector,
    /// Per label, per fold: the observation group. Built by `start`.
    groups: Vec<Vec<LabeledObservationVector>>,
    current_fold: usize,
    training: LabeledObservationVector,
    testing: LabeledObservationVector,
}

impl KFoldDivider {
    /// Create a divider for `fold_count` folds. The divider is exhausted
    /// until [`KFoldDivider::start`] is called.
    pub fn new(fold_count: usize, observations: &LabeledObservationVector) -> Self {
        Self {
            fold_count,
            observations: observations.to_vec(),
            groups: Vec::new(),
            current_fold: fold_count,
            training: Vec::new(),
            testing: Vec::new(),
        }
    }

    /// Begin iteration, inferring the label order from first appearance.
    pub fn start(&mut self) -> Result<()> {
        let mut label_order: Vec<Label> = Vec::new();
        for lo in &self.observations {
            if !label_order.contains(&lo.label) {
                label_order.push(lo.label.clone());
            }
        }
        self.start_with_label_order(&label_order)
    }

    /// Begin iteration with an explicit label order.
    pub fn start_with_label_order(&mut self, label_order: &[Label]) -> Result<()> {
        if self.fold_count == 0 {
            return Err(SvmError::MalformedInput(
                "fold count must be at least 1".to_string(),
            ));
        }
        if self.observations.is_empty() {
            return Err(SvmError::MalformedInput(
                "cannot divide an empty observation vector".to_string(),
            ));
        }

        self.groups.clear();
        for label in label_order {
            let members: LabeledObservationVector = self
                .observations
                .iter()
                .filter(|lo| &lo.label == label)
                .cloned()
                .collect();
            if members.len() < self.fold_count {
                return Err(SvmError::MalformedInput(format!(
                    "label '{}' has {} observations, fewer than {} folds",
                    label,
                    members.len(),
                    self.fold_count
                )));
            }
            self.groups.push(split_into_groups(members, self.fold_count));
        }

        self.current_fold = 0;
        self.assemble_fold();
        Ok(())
    }

    /// Advance to the next fold.
    pub fn next(&mut self) {
        if self.current_fold < self.fold_count {
            self.current_fold += 1;
        }
        if self.end() {
            self.training.clear();
            self.testing.clear();
        } else {
            self.assemble_fold();
        }
    }

    /// True once the fold index has reached the fold count (also true
    /// before `start`).
    pub fn end(&self) -> bool {
        self.current_fold >= self.fold_count
    }

    /// Current fold index, or the fold count as a sentinel before `start`
    /// and after exhaustion.
    pub fn fold_number(&self) -> usize {
        self.current_fold
    }

    pub fn training_data(&self) -> &LabeledObservationVector {
        &self.training
    }

    pub fn testing_data(&self) -> &LabeledObservationVector {
        &self.testing
    }

    fn assemble_fold(&mut self) {
        self.training.clear();
        self.testing.clear();
        // Test set first: group `current_fold` of every label in label
        // order, then the remaining groups as training data.
        for label_groups in &self.groups {
            self.testing
                .extend(label_groups[self.current_fold].iter().cloned());
        }
        for label_groups in &self.groups {
            for (g, group) in label_groups.iter().enumerate() {
                if g != self.current_fold {
                    self.training.extend(group.iter().cloned());
                }
            }
        }
    }
}

/// Split one label's members into `k` contiguous groups whose sizes differ
/// by at most one; the first `len % k` groups take the extra element.
fn split_into_groups(
    members: LabeledObservationVector,
    k: usize,
) -> Vec<LabeledObservationVector> {
    let base = members.len() / k;
    let remainder = members.len() % k;
    let mut groups = Vec::with_capacity(k);
    let mut iter = members.into_iter();
    for g in 0..k {
        let size = base + usize::from(g < remainder);
        groups.push(iter.by_ref().take(size).collect());
    }
    groups
}
