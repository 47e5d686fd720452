//! Sigmoid (hyperbolic tangent) kernel implementation
//!
//! K(x, y) = tanh(alpha * x·y + constant). Not positive semi-definite for
//! every parameter choice, which is why its default grid keeps alpha small.

use crate::core::{Observation, ParameterRangeMap, ParameterSet, Result};
use crate::kernel::{dot_product, PARAM_ALPHA, PARAM_C, PARAM_CONSTANT};
use serde::{Deserialize, Serialize};

/// Sigmoid kernel: K(x, y) = tanh(alpha * x·y + constant)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmoidKernel {
    alpha: f64,
    constant: f64,
}

impl SigmoidKernel {
    pub const DEFAULT_ALPHA: f64 = 1.0;
    pub const DEFAULT_CONSTANT: f64 = 0.0;

    pub fn new(alpha: f64, constant: f64) -> Self {
        Self { alpha, constant }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn set_parameters(&mut self, parameters: &ParameterSet) -> Result<()> {
        if let Some(&alpha) = parameters.get(PARAM_ALPHA) {
            self.alpha = alpha;
        }
        if let Some(&constant) = parameters.get(PARAM_CONSTANT) {
            self.constant = constant;
        }
        Ok(())
    }

    pub fn parameter_free_similarity(&self, x: &Observation, y: &Observation) -> f64 {
        dot_product(x, y)
    }

    pub fn similarity(&self, x: &Observation, y: &Observation) -> f64 {
        (self.alpha * self.parameter_free_similarity(x, y) + self.constant).tanh()
    }

    pub fn default_parameter_ranges() -> ParameterRangeMap {
        let mut ranges = ParameterRangeMap::new();
        ranges.insert(PARAM_ALPHA.to_string(), vec![0.001, 0.01, 0.1, 1.0]);
        ranges.insert(PARAM_CONSTANT.to_string(), vec![-1.0, 0.0]);
        ranges.insert(PARAM_C.to_string(), vec![0.01, 0.1, 1.0, 10.0]);
        ranges
    }
}

impl Default for SigmoidKernel {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ALPHA, Self::DEFAULT_CONSTANT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sigmoid_similarity() {
        let kernel = SigmoidKernel::default();
        let x = vec![1.0, 2.0];
        let y = vec![0.5, 0.25];
        assert_relative_eq!(kernel.similarity(&x, &y), 1.0f64.tanh(), epsilon = 1e-12);
        assert_eq!(kernel.parameter_free_similarity(&x, &y), 1.0);
    }

    #[test]
    fn test_sigmoid_parameter_binding() {
        let mut kernel = SigmoidKernel::default();
        let mut params = ParameterSet::new();
        params.insert(PARAM_ALPHA.to_string(), 0.5);
        params.insert(PARAM_CONSTANT.to_string(), -1.0);
        kernel.set_parameters(&params).unwrap();

        let x = vec![2.0];
        let y = vec![3.0];
        assert_relative_eq!(kernel.similarity(&x, &y), 2.0f64.tanh(), epsilon = 1e-12);
    }

    #[test]
    fn test_sigmoid_bounded_output() {
        let kernel = SigmoidKernel::new(10.0, 5.0);
        let x = vec![100.0];
        let y = vec![100.0];
        let value = kernel.similarity(&x, &y);
        assert!((-1.0..=1.0).contains(&value));
    }

    #[test]
    fn test_sigmoid_symmetry() {
        let kernel = SigmoidKernel::new(0.1, -1.0);
        let x = vec![1.0, 2.0];
        let y = vec![3.0, -1.0];
        assert_eq!(kernel.similarity(&x, &y), kernel.similarity(&y, &x));
    }
}
