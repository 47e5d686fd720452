//! Error types for the multi-class SVM engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SvmError {
    /// The caller asked for something structurally impossible, e.g. binary
    /// training on a corpus with other than exactly two distinct labels.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The input corpus violates a dataset invariant: length mismatch,
    /// empty dataset, or a fold count larger than a label's observations.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The external interruption collaborator signalled an abort. Always
    /// fatal to the whole training operation, never retried.
    #[error("training interrupted")]
    TrainingInterrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SvmError>;
