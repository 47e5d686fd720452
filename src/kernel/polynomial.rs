//! Polynomial kernel implementation

use crate::core::{Observation, ParameterRangeMap, ParameterSet, Result, SvmError};
use crate::kernel::{dot_product, PARAM_C, PARAM_CONSTANT, PARAM_DEGREE};
use serde::{Deserialize, Serialize};

/// Polynomial kernel: K(x, y) = (x·y + constant)^degree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolynomialKernel {
    constant: f64,
    degree: i32,
}

impl PolynomialKernel {
    pub const DEFAULT_CONSTANT: f64 = 1.0;
    pub const DEFAULT_DEGREE: i32 = 2;

    pub fn new(constant: f64, degree: i32) -> Self {
        Self { constant, degree }
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn degree(&self) -> i32 {
        self.degree
    }

    pub fn set_parameters(&mut self, parameters: &ParameterSet) -> Result<()> {
        if let Some(&constant) = parameters.get(PARAM_CONSTANT) {
            self.constant = constant;
        }
        if let Some(&degree) = parameters.get(PARAM_DEGREE) {
            let rounded = degree.round();
            if (degree - rounded).abs() > f64::EPSILON || rounded < 1.0 {
                return Err(SvmError::Configuration(format!(
                    "polynomial degree must be a positive integer, got {}",
                    degree
                )));
            }
            self.degree = rounded as i32;
        }
        Ok(())
    }

    pub fn parameter_free_similarity(&self, x: &Observation, y: &Observation) -> f64 {
        dot_product(x, y)
    }

    pub fn similarity(&self, x: &Observation, y: &Observation) -> f64 {
        (self.parameter_free_similarity(x, y) + self.constant).powi(self.degree)
    }

    pub fn default_parameter_ranges() -> ParameterRangeMap {
        let mut ranges = ParameterRangeMap::new();
        ranges.insert(PARAM_CONSTANT.to_string(), vec![0.0, 1.0]);
        ranges.insert(PARAM_DEGREE.to_string(), vec![2.0, 3.0, 4.0]);
        ranges.insert(PARAM_C.to_string(), vec![0.01, 0.1, 1.0, 10.0]);
        ranges
    }
}

impl Default for PolynomialKernel {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CONSTANT, Self::DEFAULT_DEGREE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polynomial_similarity() {
        // (1*0 + 2*1 + 1)^2 = 9
        let kernel = PolynomialKernel::default();
        let x = vec![1.0, 2.0];
        let y = vec![0.0, 1.0];
        assert_eq!(kernel.similarity(&x, &y), 9.0);
        assert_eq!(kernel.parameter_free_similarity(&x, &y), 2.0);
    }

    #[test]
    fn test_polynomial_degree_binding() {
        let mut kernel = PolynomialKernel::default();
        let mut params = ParameterSet::new();
        params.insert(PARAM_DEGREE.to_string(), 3.0);
        params.insert(PARAM_CONSTANT.to_string(), 0.0);
        kernel.set_parameters(&params).unwrap();

        let x = vec![2.0];
        let y = vec![1.0];
        assert_eq!(kernel.similarity(&x, &y), 8.0);
    }

    #[test]
    fn test_polynomial_rejects_fractional_degree() {
        let mut kernel = PolynomialKernel::default();
        let mut params = ParameterSet::new();
        params.insert(PARAM_DEGREE.to_string(), 2.5);
        assert!(matches!(
            kernel.set_parameters(&params),
            Err(SvmError::Configuration(_))
        ));
    }

    #[test]
    fn test_polynomial_rejects_nonpositive_degree() {
        let mut kernel = PolynomialKernel::default();
        let mut params = ParameterSet::new();
        params.insert(PARAM_DEGREE.to_string(), 0.0);
        assert!(matches!(
            kernel.set_parameters(&params),
            Err(SvmError::Configuration(_))
        ));
    }

    #[test]
    fn test_polynomial_symmetry() {
        let kernel = PolynomialKernel::new(1.0, 3);
        let x = vec![1.0, -2.0];
        let y = vec![0.5, 4.0];
        assert_eq!(kernel.similarity(&x, &y), kernel.similarity(&y, &x));
    }
}
