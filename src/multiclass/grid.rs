//! Cartesian-product enumeration of hyperparameter candidates

use crate::core::{ParameterRangeMap, ParameterSet};

/// Enumerates every fully bound parameter assignment reachable from a
/// [`ParameterRangeMap`]: one value per parameter name, in every
/// combination. The number of results is the product of the range sizes.
/// Enumeration order is deterministic (names in map order, the last name
/// varying fastest) but carries no external meaning.
pub struct ParameterSetBuilder {
    parameter_sets: Vec<ParameterSet>,
}

impl ParameterSetBuilder {
    pub fn new(ranges: &ParameterRangeMap) -> Self {
        let names: Vec<&String> = ranges.keys().collect();
        let mut parameter_sets = vec![ParameterSet::new()];

        for name in names {
            let candidates = &ranges[name];
            let mut expanded = Vec::with_capacity(parameter_sets.len() * candidates.len());
            for set in &parameter_sets {
                for &value in candidates {
                    let mut bound = set.clone();
                    bound.insert(name.clone(), value);
                    expanded.push(bound);
                }
            }
            parameter_sets = expanded;
        }

        Self { parameter_sets }
    }

    pub fn parameter_sets(&self) -> &[ParameterSet] {
        &self.parameter_sets
    }

    pub fn len(&self) -> usize {
        self.parameter_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameter_sets.is_empty()
    }
}
