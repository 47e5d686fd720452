//! RBF (Radial Basis Function) kernel implementation
//!
//! K(x, y) = exp(-gamma * ||x - y||²). The parameter-free part is the
//! negative squared Euclidean distance; gamma only scales it inside the
//! exponential, so distances can be cached across gamma candidates.

use crate::core::{Observation, ParameterRangeMap, ParameterSet, Result, SvmError};
use crate::kernel::{squared_euclidean_distance, PARAM_C, PARAM_GAMMA};
use serde::{Deserialize, Serialize};

/// RBF kernel: K(x, y) = exp(-gamma * ||x - y||²)
///
/// High gamma makes only close points similar (risking overfit); low gamma
/// lets distant points influence each other (risking underfit).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RbfKernel {
    gamma: f64,
}

impl RbfKernel {
    pub const DEFAULT_GAMMA: f64 = 1.0;

    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn set_parameters(&mut self, parameters: &ParameterSet) -> Result<()> {
        if let Some(&gamma) = parameters.get(PARAM_GAMMA) {
            if gamma <= 0.0 {
                return Err(SvmError::Configuration(format!(
                    "rbf gamma must be positive, got {}",
                    gamma
                )));
            }
            self.gamma = gamma;
        }
        Ok(())
    }

    pub fn parameter_free_similarity(&self, x: &Observation, y: &Observation) -> f64 {
        -squared_euclidean_distance(x, y)
    }

    pub fn similarity(&self, x: &Observation, y: &Observation) -> f64 {
        (self.gamma * self.parameter_free_similarity(x, y)).exp()
    }

    pub fn default_parameter_ranges() -> ParameterRangeMap {
        let mut ranges = ParameterRangeMap::new();
        ranges.insert(
            PARAM_GAMMA.to_string(),
            vec![0.0001, 0.001, 0.01, 0.1, 1.0, 10.0],
        );
        ranges.insert(PARAM_C.to_string(), vec![0.01, 0.1, 1.0, 10.0, 100.0]);
        ranges
    }
}

impl Default for RbfKernel {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GAMMA)
    }
}
