//! Single-objective reference model: a bounded random walk.

use super::{DecisionVariable, DecisionVariables, Model, OBJECTIVE_VALUE};
use rand::{Rng, RngCore};

const DEFAULT_INITIAL_VALUE: f64 = 1000.0;
const DEFAULT_MINIMUM: f64 = 0.0;
const DEFAULT_MAXIMUM: f64 = 2000.0;

/// Each random change moves the objective value up or down by one, capped
/// to `[minimum, maximum]`.
#[derive(Debug, Clone)]
pub struct DumbModel {
    name: String,
    variables: DecisionVariables,
}

impl DumbModel {
    pub fn new() -> Self {
        Self {
            name: "DumbModel".to_string(),
            variables: Self::variables_for(DEFAULT_INITIAL_VALUE, DEFAULT_MINIMUM, DEFAULT_MAXIMUM),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Resets the objective value and its range.
    pub fn with_range(mut self, initial: f64, minimum: f64, maximum: f64) -> Self {
        self.variables = Self::variables_for(initial, minimum, maximum);
        self
    }

    pub fn objective_value(&self) -> f64 {
        self.variables
            .get(OBJECTIVE_VALUE)
            .map_or(0.0, DecisionVariable::value)
    }

    fn variables_for(initial: f64, minimum: f64, maximum: f64) -> DecisionVariables {
        DecisionVariables::new()
            .with(DecisionVariable::new(OBJECTIVE_VALUE, initial).with_bounds(minimum, maximum))
    }
}

impl Default for DumbModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for DumbModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn try_random_change(&mut self, rng: &mut dyn RngCore) {
        let change = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        if let Some(variable) = self.variables.get_mut(OBJECTIVE_VALUE) {
            variable.set_inductive_value(variable.value() + change);
        }
    }

    fn accept_change(&mut self) {
        self.variables.accept_all();
    }

    fn revert_change(&mut self) {
        self.variables.reject_all();
    }

    fn decision_variables(&self) -> &DecisionVariables {
        &self.variables
    }

    fn decision_variables_mut(&mut self) -> &mut DecisionVariables {
        &mut self.variables
    }

    fn clone_model(&self) -> Box<dyn Model> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_defaults() {
        let model = DumbModel::new();
        assert_eq!(model.objective_value(), 1000.0);
        assert_eq!(
            model.decision_variable(OBJECTIVE_VALUE).unwrap().bounds(),
            Some((0.0, 2000.0))
        );
    }

    #[test]
    fn test_random_change_is_unit_step() {
        let mut model = DumbModel::new();
        let mut rng = create_rng(42);
        for _ in 0..50 {
            model.try_random_change(&mut rng);
            let delta = model.decision_variable_change(OBJECTIVE_VALUE).unwrap();
            assert_eq!(delta.abs(), 1.0);
            model.accept_change();
        }
    }

    #[test]
    fn test_change_capped_at_bounds() {
        let mut model = DumbModel::new().with_range(0.0, 0.0, 1.0);
        let mut rng = create_rng(1);
        for _ in 0..100 {
            model.try_random_change(&mut rng);
            model.accept_change();
            let value = model.objective_value();
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_revert_restores_value() {
        let mut model = DumbModel::new();
        let mut rng = create_rng(9);
        model.try_random_change(&mut rng);
        model.revert_change();
        assert_eq!(model.objective_value(), 1000.0);
        assert_eq!(model.decision_variable_change(OBJECTIVE_VALUE).unwrap(), 0.0);
    }
}
