use super::{Explorer, Trial};
use crate::cooling::metropolis_probability;
use crate::error::Result;
use crate::model::{Model, OBJECTIVE_VALUE};
use crate::random::ConcurrencySafeRng;
use std::sync::Arc;
use tracing::debug;

/// Single-objective explorer using the Metropolis criterion.
///
/// A change is desirable when it does not worsen the objective variable in
/// its stated sense. Desirable changes are always accepted; others with
/// probability `exp(-delta / T)`.
///
/// # Examples
///
/// ```
/// use u_anneal::explorer::{Explorer, KirkpatrickExplorer};
/// use u_anneal::model::DumbModel;
///
/// let mut explorer = KirkpatrickExplorer::new(Box::new(DumbModel::new())).with_seed(42);
/// explorer.initialise().unwrap();
/// explorer.try_random_change(10.0).unwrap();
///
/// assert_eq!(explorer.change_in_objective_value().abs(), 1.0);
/// ```
pub struct KirkpatrickExplorer {
    id: String,
    model: Box<dyn Model>,
    objective_variable: String,
    rng: Arc<ConcurrencySafeRng>,
    trial: Trial,
}

impl KirkpatrickExplorer {
    pub fn new(model: Box<dyn Model>) -> Self {
        Self {
            id: String::new(),
            model,
            objective_variable: OBJECTIVE_VALUE.to_string(),
            rng: Arc::new(ConcurrencySafeRng::default()),
            trial: Trial::default(),
        }
    }

    /// Names the decision variable holding the objective value.
    pub fn with_objective_variable(mut self, name: impl Into<String>) -> Self {
        self.objective_variable = name.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(ConcurrencySafeRng::seeded(seed));
        self
    }

    /// Draws from `rng`, which may be shared with other explorers.
    pub fn with_rng(mut self, rng: Arc<ConcurrencySafeRng>) -> Self {
        self.rng = rng;
        self
    }

    pub fn objective_variable(&self) -> &str {
        &self.objective_variable
    }
}

impl Explorer for KirkpatrickExplorer {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    fn initialise(&mut self) -> Result<()> {
        self.model.initialise();
        self.trial = Trial {
            objective_value: self.model.decision_variable(&self.objective_variable)?.value(),
            ..Trial::default()
        };
        debug!(id = %self.id, model = self.model.name(), "explorer initialised");
        Ok(())
    }

    fn tear_down(&mut self) -> Result<()> {
        debug!(id = %self.id, "explorer torn down");
        Ok(())
    }

    fn try_random_change(&mut self, temperature: f64) -> Result<()> {
        self.rng
            .with_dyn_rng(|rng| self.model.try_random_change(rng));

        let (change, sense) = match self.model.decision_variable(&self.objective_variable) {
            Ok(variable) => (variable.change(), variable.sense()),
            Err(error) => {
                self.model.revert_change();
                return Err(error);
            }
        };
        let directed_change = sense.to_minimisation(change);

        let desirable = directed_change <= 0.0;
        let probability = if desirable {
            1.0
        } else {
            metropolis_probability(directed_change, temperature)
        };
        let accepted = desirable || self.rng.random_unit() < probability;

        if accepted {
            self.model.accept_change();
        } else {
            self.model.revert_change();
        }

        self.trial = Trial {
            objective_value: self.model.decision_variable(&self.objective_variable)?.value(),
            change_in_objective_value: change,
            change_is_desirable: desirable,
            change_accepted: accepted,
            acceptance_probability: probability,
        };
        Ok(())
    }

    fn trial(&self) -> &Trial {
        &self.trial
    }

    fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    fn model_mut(&mut self) -> &mut dyn Model {
        self.model.as_mut()
    }

    fn rng(&self) -> Option<&ConcurrencySafeRng> {
        Some(self.rng.as_ref())
    }

    fn clone_explorer(&self) -> Box<dyn Explorer> {
        Box::new(Self {
            id: self.id.clone(),
            model: self.model.clone(),
            objective_variable: self.objective_variable.clone(),
            rng: Arc::new(self.rng.fork()),
            trial: self.trial,
        })
    }
}
