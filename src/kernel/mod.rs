//! Kernel functions for the SVM trainers
//!
//! Every kernel exposes two similarity views: the parameter-free part
//! (independent of additive/scaling constants, so it can be precomputed)
//! and the full similarity that combines it with the bound parameters.
//! Parameters are bound from a named [`ParameterSet`]; names a kernel does
//! not know are ignored, which lets one grid-search parameter set carry
//! both kernel parameters and the SMO `c` constant.

pub mod linear;
pub mod polynomial;
pub mod rbf;
pub mod sigmoid;

pub use self::linear::LinearKernel;
pub use self::polynomial::PolynomialKernel;
pub use self::rbf::RbfKernel;
pub use self::sigmoid::SigmoidKernel;

use crate::core::{Observation, ParameterRangeMap, ParameterSet, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Parameter name for the SMO regularization constant. Carried in kernel
/// parameter ranges so the grid search tunes it alongside kernel
/// parameters; the kernels themselves ignore it.
pub const PARAM_C: &str = "c";
/// Additive constant of the linear, polynomial, and sigmoid kernels.
pub const PARAM_CONSTANT: &str = "constant";
/// Integer degree of the polynomial kernel.
pub const PARAM_DEGREE: &str = "degree";
/// Width parameter of the RBF kernel.
pub const PARAM_GAMMA: &str = "gamma";
/// Dot-product scale of the sigmoid kernel.
pub const PARAM_ALPHA: &str = "alpha";

/// Mapping from kernel kind to the parameter ranges to search for it.
pub type KernelParameterRangeMap = BTreeMap<KernelKind, ParameterRangeMap>;

/// The kernel family members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KernelKind {
    Linear,
    Polynomial,
    Rbf,
    Sigmoid,
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KernelKind::Linear => "linear",
            KernelKind::Polynomial => "polynomial",
            KernelKind::Rbf => "rbf",
            KernelKind::Sigmoid => "sigmoid",
        };
        f.write_str(name)
    }
}

impl FromStr for KernelKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(KernelKind::Linear),
            "polynomial" | "poly" => Ok(KernelKind::Polynomial),
            "rbf" => Ok(KernelKind::Rbf),
            "sigmoid" => Ok(KernelKind::Sigmoid),
            other => Err(format!("unknown kernel '{}'", other)),
        }
    }
}

/// A kernel with its bound parameters: the pluggable similarity measure
/// handed to the SMO trainer and retained inside trained models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KernelFunction {
    Linear(LinearKernel),
    Polynomial(PolynomialKernel),
    Rbf(RbfKernel),
    Sigmoid(SigmoidKernel),
}

impl KernelFunction {
    /// Create a kernel of the given kind with its documented defaults.
    pub fn new(kind: KernelKind) -> Self {
        match kind {
            KernelKind::Linear => KernelFunction::Linear(LinearKernel::default()),
            KernelKind::Polynomial => KernelFunction::Polynomial(PolynomialKernel::default()),
            KernelKind::Rbf => KernelFunction::Rbf(RbfKernel::default()),
            KernelKind::Sigmoid => KernelFunction::Sigmoid(SigmoidKernel::default()),
        }
    }

    pub fn kind(&self) -> KernelKind {
        match self {
            KernelFunction::Linear(_) => KernelKind::Linear,
            KernelFunction::Polynomial(_) => KernelKind::Polynomial,
            KernelFunction::Rbf(_) => KernelKind::Rbf,
            KernelFunction::Sigmoid(_) => KernelKind::Sigmoid,
        }
    }

    /// Bind named parameters. Unknown names are ignored; invalid values
    /// for known names are a configuration error.
    pub fn set_parameters(&mut self, parameters: &ParameterSet) -> Result<()> {
        match self {
            KernelFunction::Linear(k) => k.set_parameters(parameters),
            KernelFunction::Polynomial(k) => k.set_parameters(parameters),
            KernelFunction::Rbf(k) => k.set_parameters(parameters),
            KernelFunction::Sigmoid(k) => k.set_parameters(parameters),
        }
    }

    /// The similarity component independent of any additive or scaling
    /// constant: the dot product for Linear/Polynomial/Sigmoid, the
    /// negative squared Euclidean distance for RBF.
    pub fn parameter_free_similarity(&self, x: &Observation, y: &Observation) -> f64 {
        match self {
            KernelFunction::Linear(k) => k.parameter_free_similarity(x, y),
            KernelFunction::Polynomial(k) => k.parameter_free_similarity(x, y),
            KernelFunction::Rbf(k) => k.parameter_free_similarity(x, y),
            KernelFunction::Sigmoid(k) => k.parameter_free_similarity(x, y),
        }
    }

    /// Full similarity under the currently bound parameters.
    pub fn similarity(&self, x: &Observation, y: &Observation) -> f64 {
        match self {
            KernelFunction::Linear(k) => k.similarity(x, y),
            KernelFunction::Polynomial(k) => k.similarity(x, y),
            KernelFunction::Rbf(k) => k.similarity(x, y),
            KernelFunction::Sigmoid(k) => k.similarity(x, y),
        }
    }

    /// Default grid-search candidate ranges for a kernel kind, including
    /// the SMO `c` range.
    pub fn default_parameter_ranges(kind: KernelKind) -> ParameterRangeMap {
        match kind {
            KernelKind::Linear => LinearKernel::default_parameter_ranges(),
            KernelKind::Polynomial => PolynomialKernel::default_parameter_ranges(),
            KernelKind::Rbf => RbfKernel::default_parameter_ranges(),
            KernelKind::Sigmoid => SigmoidKernel::default_parameter_ranges(),
        }
    }
}

/// Default kernel-to-ranges map covering the whole family.
pub fn default_kernel_parameter_ranges() -> KernelParameterRangeMap {
    let mut map = KernelParameterRangeMap::new();
    for kind in [
        KernelKind::Linear,
        KernelKind::Polynomial,
        KernelKind::Rbf,
        KernelKind::Sigmoid,
    ] {
        map.insert(kind, KernelFunction::default_parameter_ranges(kind));
    }
    map
}

/// Dense dot product. Observations in one dataset always have equal
/// length, which the dataset constructor enforces.
pub(crate) fn dot_product(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y.iter()).map(|(a, b)| a * b).sum()
}

/// Dense squared Euclidean distance.
pub(crate) fn squared_euclidean_distance(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    x.iter()
        .zip(y.iter())
        .map(|(a, b)| {
            let d = a - b;
            d * d
        })
        .sum()
}
