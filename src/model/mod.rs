//! The optimisation target consumed by explorers.
//!
//! A [`Model`] exposes named decision variables and (optionally) togglable
//! management actions. The annealing engine never reaches into a model's
//! internals: it asks for one random perturbation, inspects the pending
//! change through the decision variables, and then resolves that change with
//! exactly one of [`Model::accept_change`] or [`Model::revert_change`].
//!
//! Two reference models ship with the crate: [`DumbModel`] (single
//! objective) and [`MultiObjectiveDumbModel`] (management actions trading
//! cost against sediment reduction).

mod actions;
mod dumb;
mod modumb;
mod variables;

pub use actions::{ActionEffect, ManagementAction};
pub use dumb::DumbModel;
pub use modumb::MultiObjectiveDumbModel;
pub use variables::{DecisionVariable, DecisionVariables, Sense};

use crate::error::{Error, Result};
use rand::RngCore;

/// Name of the decision variable single-objective explorers read by default.
pub const OBJECTIVE_VALUE: &str = "ObjectiveValue";

/// A mutable optimisation target.
///
/// # Contract
///
/// - [`try_random_change`](Model::try_random_change) leaves exactly one
///   pending change, visible as inductive values on the decision variables.
/// - [`accept_change`](Model::accept_change) commits it and
///   [`revert_change`](Model::revert_change) discards it. The explorer calls
///   exactly one of them before the next perturbation.
/// - [`clone_model`](Model::clone_model) returns a fully independent deep
///   copy; concurrent runs never share model state.
///
/// # Examples
///
/// ```
/// use u_anneal::model::{DumbModel, Model, OBJECTIVE_VALUE};
/// use u_anneal::random::create_rng;
///
/// let mut model = DumbModel::new();
/// let mut rng = create_rng(42);
///
/// model.try_random_change(&mut rng);
/// let delta = model.decision_variable_change(OBJECTIVE_VALUE).unwrap();
/// assert_eq!(delta.abs(), 1.0);
///
/// model.revert_change();
/// assert_eq!(model.decision_variable(OBJECTIVE_VALUE).unwrap().value(), 1000.0);
/// ```
pub trait Model: Send {
    fn name(&self) -> &str;

    /// One-off preparation before annealing starts.
    fn initialise(&mut self) {}

    /// Proposes one random, undoable change.
    fn try_random_change(&mut self, rng: &mut dyn RngCore);

    fn accept_change(&mut self);

    fn revert_change(&mut self);

    fn decision_variables(&self) -> &DecisionVariables;

    fn decision_variables_mut(&mut self) -> &mut DecisionVariables;

    fn management_actions(&self) -> &[ManagementAction] {
        &[]
    }

    /// Sets the active flag of action `index` without re-applying its effects.
    fn restore_management_action(&mut self, index: usize, _active: bool) -> Result<()> {
        Err(Error::UnknownManagementAction {
            model: self.name().to_string(),
            index,
        })
    }

    fn clone_model(&self) -> Box<dyn Model>;

    fn decision_variable(&self, name: &str) -> Result<&DecisionVariable> {
        self.decision_variables()
            .get(name)
            .ok_or_else(|| Error::UnknownDecisionVariable {
                model: self.name().to_string(),
                name: name.to_string(),
            })
    }

    /// Pending minus committed value of `name`.
    fn decision_variable_change(&self, name: &str) -> Result<f64> {
        self.decision_variable(name).map(DecisionVariable::change)
    }

    fn set_decision_variable(&mut self, name: &str, value: f64) -> Result<()> {
        let model = self.name().to_string();
        match self.decision_variables_mut().get_mut(name) {
            Some(variable) => {
                variable.set_value(value);
                Ok(())
            }
            None => Err(Error::UnknownDecisionVariable {
                model,
                name: name.to_string(),
            }),
        }
    }

    fn active_management_actions(&self) -> Vec<String> {
        self.management_actions()
            .iter()
            .filter(|action| action.is_active())
            .map(|action| action.name().to_string())
            .collect()
    }

    /// Same committed decision variables and the same action flags.
    fn is_equivalent_to(&self, other: &dyn Model) -> bool {
        let same_actions = self.management_actions().len() == other.management_actions().len()
            && self
                .management_actions()
                .iter()
                .zip(other.management_actions())
                .all(|(a, b)| a.name() == b.name() && a.is_active() == b.is_active());
        same_actions
            && self
                .decision_variables()
                .is_equivalent_to(other.decision_variables())
    }
}

impl Clone for Box<dyn Model> {
    fn clone(&self) -> Self {
        self.clone_model()
    }
}

/// A model without variables whose changes do nothing.
#[derive(Debug, Clone, Default)]
pub struct NullModel {
    variables: DecisionVariables,
}

impl Model for NullModel {
    fn name(&self) -> &str {
        "NullModel"
    }

    fn try_random_change(&mut self, _rng: &mut dyn RngCore) {}

    fn accept_change(&mut self) {}

    fn revert_change(&mut self) {}

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
