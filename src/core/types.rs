//! Core type definitions for the multi-class SVM engine

use crate::core::{Result, SvmError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A single observation: a fixed-length, dense feature row.
///
/// Every observation in one dataset has the same length, equal to the
/// length of the dataset's [`FeatureVector`].
pub type Observation = Vec<f64>;

/// Class label attached to an observation.
pub type Label = String;

/// A feature dimension's stable identity.
///
/// `index` is the position the feature had in the original input and never
/// changes, even when recursive feature elimination reorders or removes
/// columns. `name` is the human-readable column label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub index: usize,
    pub name: String,
}

impl Feature {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

/// Ordered feature descriptors, in lockstep with observation length.
pub type FeatureVector = Vec<Feature>;

/// An observation together with its class label and original position.
///
/// The observation itself is shared with the caller-owned corpus rather
/// than owned here, so subsets and fold splits are cheap to build.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledObservation {
    /// Position of this observation in the original input.
    pub dataset_index: usize,
    pub label: Label,
    pub observation: Arc<Observation>,
}

impl LabeledObservation {
    pub fn new(
        dataset_index: usize,
        label: impl Into<Label>,
        observation: Arc<Observation>,
    ) -> Self {
        Self {
            dataset_index,
            label: label.into(),
            observation,
        }
    }
}

/// The labeled corpus handed around by trainers and dividers.
pub type LabeledObservationVector = Vec<LabeledObservation>;

/// An unordered pair of distinct labels, stored in canonical order so that
/// `LabelPair::new(a, b) == LabelPair::new(b, a)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LabelPair {
    first: Label,
    second: Label,
}

impl LabelPair {
    /// Create a canonically ordered pair. The two labels must be distinct.
    pub fn new(a: impl Into<Label>, b: impl Into<Label>) -> Result<Self> {
        let a = a.into();
        let b = b.into();
        if a == b {
            return Err(SvmError::Configuration(format!(
                "label pair requires two distinct labels, got '{}' twice",
                a
            )));
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { first, second })
    }

    pub fn first(&self) -> &Label {
        &self.first
    }

    pub fn second(&self) -> &Label {
        &self.second
    }

    /// True if `label` is one of the two members.
    pub fn contains(&self, label: &str) -> bool {
        self.first == label || self.second == label
    }
}

impl fmt::Display for LabelPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

/// Mapping from a parameter name to its ordered grid-search candidates.
pub type ParameterRangeMap = BTreeMap<String, Vec<f64>>;

/// A fully bound parameter assignment: one value per parameter name.
pub type ParameterSet = BTreeMap<String, f64>;

/// Immutable aggregate of the full labeled corpus plus its feature
/// descriptors. This is the sole read-only handle passed to trainers.
#[derive(Debug, Clone)]
pub struct SvmDataset {
    labeled_observations: LabeledObservationVector,
    feature_vector: FeatureVector,
}

impl SvmDataset {
    /// Build a dataset, validating the corpus invariants: non-empty input,
    /// non-empty labels, and every observation length equal to the feature
    /// vector length.
    pub fn new(
        labeled_observations: LabeledObservationVector,
        feature_vector: FeatureVector,
    ) -> Result<Self> {
        if labeled_observations.is_empty() {
            return Err(SvmError::MalformedInput("empty dataset".to_string()));
        }
        for lo in &labeled_observations {
            if lo.label.is_empty() {
                return Err(SvmError::MalformedInput(format!(
                    "observation {} carries an empty label",
                    lo.dataset_index
                )));
            }
            if lo.observation.len() != feature_vector.len() {
                return Err(SvmError::MalformedInput(format!(
                    "observation {} has {} features, feature vector has {}",
                    lo.dataset_index,
                    lo.observation.len(),
                    feature_vector.len()
                )));
            }
        }
        Ok(Self {
            labeled_observations,
            feature_vector,
        })
    }

    pub fn labeled_observations(&self) -> &LabeledObservationVector {
        &self.labeled_observations
    }

    pub fn feature_vector(&self) -> &FeatureVector {
        &self.feature_vector
    }

    pub fn observation_count(&self) -> usize {
        self.labeled_observations.len()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_vector.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(values: &[f64]) -> Arc<Observation> {
        Arc::new(values.to_vec())
    }

    #[test]
    fn test_label_pair_canonical_order() {
        let ab = LabelPair::new("b", "a").unwrap();
        let ba = LabelPair::new("a", "b").unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.first(), "a");
        assert_eq!(ab.second(), "b");
        assert!(ab.contains("a"));
        assert!(ab.contains("b"));
        assert!(!ab.contains("c"));
    }

    #[test]
    fn test_label_pair_rejects_identical_labels() {
        assert!(LabelPair::new("a", "a").is_err());
    }

    #[test]
    fn test_label_pair_display() {
        let pair = LabelPair::new("green", "blue").unwrap();
        assert_eq!(pair.to_string(), "blue/green");
    }

    #[test]
    fn test_dataset_validation_ok() {
        let features = vec![Feature::new(0, "f0"), Feature::new(1, "f1")];
        let observations = vec![
            LabeledObservation::new(0, "blue", obs(&[1.0, 2.0])),
            LabeledObservation::new(1, "green", obs(&[3.0, 4.0])),
        ];
        let dataset = SvmDataset::new(observations, features).unwrap();
        assert_eq!(dataset.observation_count(), 2);
        assert_eq!(dataset.feature_count(), 2);
    }

    #[test]
    fn test_dataset_rejects_empty_input() {
        let result = SvmDataset::new(vec![], vec![Feature::new(0, "f0")]);
        assert!(matches!(result, Err(SvmError::MalformedInput(_))));
    }

    #[test]
    fn test_dataset_rejects_length_mismatch() {
        let features = vec![Feature::new(0, "f0"), Feature::new(1, "f1")];
        let observations = vec![LabeledObservation::new(0, "blue", obs(&[1.0]))];
        let result = SvmDataset::new(observations, features);
        assert!(matches!(result, Err(SvmError::MalformedInput(_))));
    }

    #[test]
    fn test_dataset_rejects_empty_label() {
        let features = vec![Feature::new(0, "f0")];
        let observations = vec![LabeledObservation::new(0, "", obs(&[1.0]))];
        let result = SvmDataset::new(observations, features);
        assert!(matches!(result, Err(SvmError::MalformedInput(_))));
    }
}
