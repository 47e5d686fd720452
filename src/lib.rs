//! Multi-class support vector machine training engine
//!
//! One-vs-one decomposition over an SMO binary solver, with per-pair
//! hyperparameter grid search, stratified k-fold cross-validation, and
//! SVM-based recursive feature elimination.

pub mod cache;
pub mod core;
pub mod data;
pub mod kernel;
pub mod kfold;
pub mod multiclass;
pub mod persistence;
pub mod rfe;
pub mod solver;
pub mod utils;

// Re-export main types for convenience
pub use crate::cache::KernelFunctionCache;
pub use crate::core::error::*;
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::read_shared_and_design_files;
pub use crate::kernel::{KernelFunction, KernelKind, KernelParameterRangeMap};
pub use crate::kfold::KFoldDivider;
pub use crate::multiclass::{MultiClassSvm, OneVsOneTrainer, ParameterSetBuilder, Standardization};
pub use crate::persistence::SerializableModel;
pub use crate::rfe::{RankedFeature, SvmRfe};
pub use crate::solver::{SmoTrainer, SupportVector, Svm};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
