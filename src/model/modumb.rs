//! Multi-objective reference model.
//!
//! A set of planning units, each with one management action. Activating an
//! action costs money and reduces sediment; the search trades the two off.

use super::{DecisionVariable, DecisionVariables, ManagementAction, Model, Sense};
use crate::error::{Error, Result};
use crate::random::create_rng;
use rand::{Rng, RngCore};

pub const IMPLEMENTATION_COST: &str = "ImplementationCost";
pub const SEDIMENT_REDUCTION: &str = "SedimentReduction";

#[derive(Debug, Clone)]
pub struct MultiObjectiveDumbModel {
    name: String,
    variables: DecisionVariables,
    actions: Vec<ManagementAction>,
    pending_action: Option<usize>,
}

impl MultiObjectiveDumbModel {
    /// Builds `action_count` planning units whose costs and sediment
    /// reductions are drawn from `seed`, all initially inactive.
    pub fn new(action_count: usize, seed: u64) -> Self {
        let mut rng = create_rng(seed);
        let actions = (0..action_count)
            .map(|unit| {
                ManagementAction::new(format!("PlanningUnit-{unit}"))
                    .with_effect(IMPLEMENTATION_COST, rng.random_range(1.0..10.0))
                    .with_effect(SEDIMENT_REDUCTION, rng.random_range(1.0..10.0))
            })
            .collect();
        let variables = DecisionVariables::new()
            .with(DecisionVariable::new(IMPLEMENTATION_COST, 0.0).with_sense(Sense::Minimise))
            .with(DecisionVariable::new(SEDIMENT_REDUCTION, 0.0).with_sense(Sense::Maximise));

        Self {
            name: "MultiObjectiveDumbModel".to_string(),
            variables,
            actions,
            pending_action: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Activates each action with probability one half and commits the
    /// result.
    pub fn with_random_actions(mut self, rng: &mut dyn RngCore) -> Result<Self> {
        for index in 0..self.actions.len() {
            if rng.random_bool(0.5) {
                self.actions[index].toggle(&mut self.variables, &self.name)?;
            }
        }
        self.variables.accept_all();
        Ok(self)
    }
}

impl Model for MultiObjectiveDumbModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn try_random_change(&mut self, rng: &mut dyn RngCore) {
        if self.actions.is_empty() {
            return;
        }
        let index = rng.random_range(0..self.actions.len());
        if self.actions[index]
            .toggle(&mut self.variables, &self.name)
            .is_ok()
        {
            self.pending_action = Some(index);
        }
    }

    fn accept_change(&mut self) {
        self.variables.accept_all();
        self.pending_action = None;
    }

    fn revert_change(&mut self) {
        if let Some(index) = self.pending_action.take() {
            let action = &mut self.actions[index];
            action.set_active_flag(!action.is_active());
        }
        self.variables.reject_all();
    }

    fn decision_variables(&self) -> &DecisionVariables {
        &self.variables
    }

    fn decision_variables_mut(&mut self) -> &mut DecisionVariables {
        &mut self.variables
    }

    fn management_actions(&self) -> &[ManagementAction] {
        &self.actions
    }

    fn restore_management_action(&mut self, index: usize, active: bool) -> Result<()> {
        let model = self.name.clone();
        let action = self
            .actions
            .get_mut(index)
            .ok_or(Error::UnknownManagementAction { model, index })?;
        action.set_active_flag(active);
        Ok(())
    }

    fn clone_model(&self) -> Box<dyn Model> {
        Box::new(self.clone())
    }
}
