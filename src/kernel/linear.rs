//! Linear kernel implementation

use crate::core::{Observation, ParameterRangeMap, ParameterSet, Result};
use crate::kernel::{dot_product, PARAM_C, PARAM_CONSTANT};
use serde::{Deserialize, Serialize};

/// Linear kernel: K(x, y) = x·y + constant
///
/// The dot product is the parameter-free part; the additive constant is
/// bound separately so precomputed dot products stay valid across
/// parameter candidates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearKernel {
    constant: f64,
}

impl LinearKernel {
    pub const DEFAULT_CONSTANT: f64 = 0.0;

    pub fn new(constant: f64) -> Self {
        Self { constant }
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn set_parameters(&mut self, parameters: &ParameterSet) -> Result<()> {
        if let Some(&constant) = parameters.get(PARAM_CONSTANT) {
            self.constant = constant;
        }
        Ok(())
    }

    pub fn parameter_free_similarity(&self, x: &Observation, y: &Observation) -> f64 {
        dot_product(x, y)
    }

    pub fn similarity(&self, x: &Observation, y: &Observation) -> f64 {
        self.parameter_free_similarity(x, y) + self.constant
    }

    pub fn default_parameter_ranges() -> ParameterRangeMap {
        let mut ranges = ParameterRangeMap::new();
        ranges.insert(PARAM_CONSTANT.to_string(), vec![-1.0, 0.0, 1.0]);
        ranges.insert(
            PARAM_C.to_string(),
            vec![0.01, 0.1, 1.0, 10.0, 100.0],
        );
        ranges
    }
}

impl Default for LinearKernel {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CONSTANT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_similarity() {
        let kernel = LinearKernel::default();
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![4.0, 5.0, 6.0];
        assert_eq!(kernel.similarity(&x, &y), 32.0);
        assert_eq!(kernel.parameter_free_similarity(&x, &y), 32.0);
    }

    #[test]
    fn test_linear_constant_offsets_full_similarity_only() {
        let mut kernel = LinearKernel::default();
        let mut params = ParameterSet::new();
        params.insert(PARAM_CONSTANT.to_string(), 2.5);
        kernel.set_parameters(&params).unwrap();

        let x = vec![1.0, 0.0];
        let y = vec![3.0, 7.0];
        assert_eq!(kernel.parameter_free_similarity(&x, &y), 3.0);
        assert_eq!(kernel.similarity(&x, &y), 5.5);
    }

    #[test]
    fn test_linear_ignores_unknown_parameters() {
        let mut kernel = LinearKernel::default();
        let mut params = ParameterSet::new();
        params.insert(PARAM_C.to_string(), 10.0);
        kernel.set_parameters(&params).unwrap();
        assert_eq!(kernel.constant(), LinearKernel::DEFAULT_CONSTANT);
    }

    #[test]
    fn test_linear_symmetry() {
        let kernel = LinearKernel::new(1.0);
        let x = vec![1.0, -2.0, 0.5];
        let y = vec![0.0, 3.0, -1.0];
        assert_eq!(kernel.similarity(&x, &y), kernel.similarity(&y, &x));
    }
}
