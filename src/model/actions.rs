//! Management actions: togglable interventions contributing to decision
//! variable deltas.

use super::variables::DecisionVariables;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// The contribution an action makes to one decision variable while active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEffect {
    pub variable: String,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementAction {
    name: String,
    active: bool,
    effects: Vec<ActionEffect>,
}

impl ManagementAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: false,
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, variable: impl Into<String>, delta: f64) -> Self {
        self.effects.push(ActionEffect {
            variable: variable.into(),
            delta,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn effects(&self) -> &[ActionEffect] {
        &self.effects
    }

    /// Sets the flag without touching any decision variable. Used when a
    /// model's full state is being restored from a snapshot.
    pub fn set_active_flag(&mut self, active: bool) {
        self.active = active;
    }

    /// Flips the action and writes the resulting deltas into the inductive
    /// values of `variables`. Nothing changes unless every effect names a
    /// known variable.
    pub fn toggle(&mut self, variables: &mut DecisionVariables, model: &str) -> Result<()> {
        if let Some(missing) = self
            .effects
            .iter()
            .find(|effect| variables.get(&effect.variable).is_none())
        {
            return Err(Error::UnknownDecisionVariable {
                model: model.to_string(),
                name: missing.variable.clone(),
            });
        }
        let sign = if self.active { -1.0 } else { 1.0 };
        for effect in &self.effects {
            if let Some(variable) = variables.get_mut(&effect.variable) {
                let next = variable.inductive_value() + sign * effect.delta;
                variable.set_inductive_value(next);
            }
        }
        self.active = !self.active;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DecisionVariable;

    #[test]
    fn test_toggle_applies_and_removes_effects() {
        let mut variables = DecisionVariables::new()
            .with(DecisionVariable::new("Cost", 0.0))
            .with(DecisionVariable::new("Sediment", 0.0));
        let mut action = ManagementAction::new("Gully-1")
            .with_effect("Cost", 5.0)
            .with_effect("Sediment", 2.5);

        action.toggle(&mut variables, "test").unwrap();
        assert!(action.is_active());
        assert_eq!(variables.get("Cost").unwrap().inductive_value(), 5.0);
        variables.accept_all();

        action.toggle(&mut variables, "test").unwrap();
        assert!(!action.is_active());
        assert_eq!(variables.get("Sediment").unwrap().inductive_value(), 0.0);
    }

    #[test]
    fn test_toggle_unknown_variable_is_error() {
        let mut variables = DecisionVariables::new();
        let mut action = ManagementAction::new("a").with_effect("Missing", 1.0);
        let result = action.toggle(&mut variables, "test");
        assert!(matches!(result, Err(Error::UnknownDecisionVariable { .. })));
    }

    #[test]
    fn test_failed_toggle_leaves_variables_untouched() {
        let mut variables = DecisionVariables::new().with(DecisionVariable::new("Cost", 1.0));
        let mut action = ManagementAction::new("a")
            .with_effect("Cost", 5.0)
            .with_effect("Missing", 1.0);

        assert!(action.toggle(&mut variables, "test").is_err());
        assert!(!action.is_active());
        assert_eq!(variables.get("Cost").unwrap().inductive_value(), 1.0);
    }
}
