//! Model serialization and persistence
//!
//! Wraps a trained multi-class model with provenance metadata and stores
//! the whole thing as JSON, for the CLI and any other place a model
//! outlives the process that trained it.

use crate::core::Result;
use crate::multiclass::MultiClassSvm;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A trained model together with its provenance metadata.
#[derive(Serialize, Deserialize)]
pub struct SerializableModel {
    pub model: MultiClassSvm,
    pub metadata: ModelMetadata,
}

/// Provenance recorded at save time.
#[derive(Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model.
    pub library_version: String,
    /// Labels the model distinguishes.
    pub labels: Vec<String>,
    /// Outer cross-validation accuracy per label pair, where available.
    pub pair_accuracies: BTreeMap<String, f64>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

impl SerializableModel {
    pub fn from_model(model: MultiClassSvm) -> Self {
        let pair_accuracies = model
            .svms()
            .iter()
            .filter_map(|svm| {
                svm.cross_validation_accuracy()
                    .map(|accuracy| (svm.label_pair().to_string(), accuracy))
            })
            .collect();
        let metadata = ModelMetadata {
            library_version: env!("CARGO_PKG_VERSION").to_string(),
            labels: model.labels().to_vec(),
            pair_accuracies,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        Self { model, metadata }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Print model summary
    pub fn print_summary(&self) {
        println!("=== Model Summary ===");
        println!("Labels: {}", self.metadata.labels.join(", "));
        println!("Binary classifiers: {}", self.model.svms().len());
        for (pair, accuracy) in &self.metadata.pair_accuracies {
            println!("  {}: cross-validation accuracy {:.4}", pair, accuracy);
        }
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Feature, LabeledObservation, LogDiagnostics, NeverInterrupt, SvmDataset};
    use crate::kernel::{KernelKind, KernelParameterRangeMap, PARAM_C, PARAM_CONSTANT};
    use crate::multiclass::OneVsOneTrainer;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn trained_model() -> MultiClassSvm {
        let rows: Vec<(&str, Vec<f64>)> = vec![
            ("a", vec![-4.0]),
            ("a", vec![-3.0]),
            ("a", vec![-5.0]),
            ("a", vec![-3.5]),
            ("b", vec![4.0]),
            ("b", vec![3.0]),
            ("b", vec![5.0]),
            ("b", vec![3.5]),
        ];
        let observations = rows
            .iter()
            .enumerate()
            .map(|(i, (label, obs))| LabeledObservation::new(i, *label, Arc::new(obs.clone())))
            .collect();
        let dataset = SvmDataset::new(observations, vec![Feature::new(0, "f0")]).unwrap();

        let mut ranges = crate::core::ParameterRangeMap::new();
        ranges.insert(PARAM_C.to_string(), vec![1.0]);
        ranges.insert(PARAM_CONSTANT.to_string(), vec![0.0]);
        let mut map = KernelParameterRangeMap::new();
        map.insert(KernelKind::Linear, ranges);

        let mut trainer = OneVsOneTrainer::new();
        trainer.set_kernel_parameter_ranges(map);
        trainer.set_train_fold_count(2);
        trainer.set_evaluation_fold_count(2);
        trainer
            .train(&dataset, &NeverInterrupt, &LogDiagnostics)
            .unwrap()
    }

    #[test]
    fn test_model_round_trip() {
        let model = trained_model();
        let serializable = SerializableModel::from_model(model);
        assert_eq!(serializable.metadata.labels, vec!["a", "b"]);
        assert_eq!(serializable.metadata.pair_accuracies.len(), 1);

        let temp_file = NamedTempFile::new().expect("failed to create temp file");
        serializable.save_to_file(temp_file.path()).unwrap();
        let loaded = SerializableModel::load_from_file(temp_file.path()).unwrap();

        assert_eq!(loaded.metadata.labels, serializable.metadata.labels);
        assert_eq!(
            loaded.model.svms().len(),
            serializable.model.svms().len()
        );
        assert_eq!(
            loaded.model.classify(&vec![-4.0]).unwrap(),
            serializable.model.classify(&vec![-4.0]).unwrap()
        );
    }
}
