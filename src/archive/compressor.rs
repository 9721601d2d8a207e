use super::BooleanArchive;
use crate::error::{Error, Result};
use crate::model::Model;
use serde::{Deserialize, Serialize};

/// Committed decision-variable values and management-action flags of a
/// model, without any reference back to it.
///
/// Variable values are stored positionally; the archive holding a snapshot
/// keeps the variable and action names once for all of its entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedModelState {
    variables: Vec<f64>,
    actions: BooleanArchive,
}

impl CompressedModelState {
    pub fn variables(&self) -> &[f64] {
        &self.variables
    }

    pub fn actions(&self) -> &BooleanArchive {
        &self.actions
    }

    /// True iff every stored value equals the model's committed value.
    pub fn matches_state_of(&self, model: &dyn Model) -> bool {
        let variables = model.decision_variables();
        let actions = model.management_actions();
        variables.len() == self.variables.len()
            && actions.len() == self.actions.len()
            && variables
                .iter()
                .zip(&self.variables)
                .all(|(variable, &stored)| variable.value() == stored)
            && actions
                .iter()
                .zip(self.actions.iter())
                .all(|(action, stored)| action.is_active() == stored)
    }
}

/// Stores and restores model state through [`CompressedModelState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelCompressor;

impl ModelCompressor {
    pub fn compress(&self, model: &dyn Model) -> CompressedModelState {
        CompressedModelState {
            variables: model.decision_variables().values(),
            actions: BooleanArchive::from_bools(
                model.management_actions().iter().map(|action| action.is_active()),
            ),
        }
    }

    /// Pushes `state` into `model`, discarding any pending change.
    ///
    /// `model` must be structurally identical to the one compressed.
    pub fn decompress(&self, state: &CompressedModelState, model: &mut dyn Model) -> Result<()> {
        let variable_count = model.decision_variables().len();
        let action_count = model.management_actions().len();
        if variable_count != state.variables.len() || action_count != state.actions.len() {
            return Err(Error::ArchiveViolation(format!(
                "snapshot of {} variables and {} actions cannot restore model [{}] with {} and {}",
                state.variables.len(),
                state.actions.len(),
                model.name(),
                variable_count,
                action_count,
            )));
        }

        for (variable, &value) in model
            .decision_variables_mut()
            .iter_mut()
            .zip(&state.variables)
        {
            variable.set_value(value);
        }
        for (index, active) in state.actions.iter().enumerate() {
            model.restore_management_action(index, active)?;
        }
        Ok(())
    }
}
