//! Solution explorers.
//!
//! An [`Explorer`] owns a [`Model`] and performs one perturbation attempt
//! per annealing iteration: it asks the model for a random change, measures
//! it, decides whether to keep it and resolves it with exactly one of
//! [`Model::accept_change`] / [`Model::revert_change`]. The outcome of the
//! latest attempt is exposed as a [`Trial`] for the annealer to publish.
//!
//! # Variants
//!
//! - [`NullExplorer`]: does nothing; the default until one is configured.
//! - [`KirkpatrickExplorer`]: single objective, Metropolis acceptance.
//! - [`SuppapitnarmExplorer`]: multiple objectives, one coolant per
//!   objective, Pareto archive of accepted states.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Suppapitnarm et al. (2000), "A Simulated Annealing Algorithm for
//!   Multiobjective Optimization"

mod kirkpatrick;
mod null;
mod suppapitnarm;

pub use kirkpatrick::KirkpatrickExplorer;
pub use null::NullExplorer;
pub use suppapitnarm::SuppapitnarmExplorer;

use crate::error::Result;
use crate::model::Model;
use crate::observer::AttributeValue;
use crate::random::ConcurrencySafeRng;
use crate::solution::ArchiveSummary;

/// What happened during the most recent change attempt.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Trial {
    /// Committed objective value after the attempt.
    pub objective_value: f64,
    /// Proposed minus previous objective value.
    pub change_in_objective_value: f64,
    pub change_is_desirable: bool,
    pub change_accepted: bool,
    pub acceptance_probability: f64,
}

/// Drives one perturbation attempt per iteration against an owned model.
///
/// # Contract
///
/// After [`try_random_change`](Explorer::try_random_change) returns, the
/// model holds no pending change. Explorers are exclusively owned by one
/// annealer; [`clone_explorer`](Explorer::clone_explorer) deep-copies the
/// model and gives the copy an independent random stream.
pub trait Explorer: Send {
    fn id(&self) -> &str;

    fn set_id(&mut self, id: &str);

    /// Prepares the model and reads the starting objective value.
    fn initialise(&mut self) -> Result<()> {
        Ok(())
    }

    fn tear_down(&mut self) -> Result<()> {
        Ok(())
    }

    /// Attempts one random change at `temperature`.
    fn try_random_change(&mut self, temperature: f64) -> Result<()>;

    fn trial(&self) -> &Trial;

    fn model(&self) -> &dyn Model;

    fn model_mut(&mut self) -> &mut dyn Model;

    fn clone_explorer(&self) -> Box<dyn Explorer>;

    /// The generator clones fork from, for explorers that draw at random.
    fn rng(&self) -> Option<&ConcurrencySafeRng> {
        None
    }

    /// Extra attributes published with every finished iteration.
    fn iteration_attributes(&self) -> Vec<(&'static str, AttributeValue)> {
        Vec::new()
    }

    /// Snapshot of the solution archive, for explorers that keep one.
    fn archive_summary(&self, _id: &str) -> Option<ArchiveSummary> {
        None
    }

    fn objective_value(&self) -> f64 {
        self.trial().objective_value
    }

    fn change_in_objective_value(&self) -> f64 {
        self.trial().change_in_objective_value
    }

    fn change_is_desirable(&self) -> bool {
        self.trial().change_is_desirable
    }

    fn change_accepted(&self) -> bool {
        self.trial().change_accepted
    }

    fn acceptance_probability(&self) -> f64 {
        self.trial().acceptance_probability
    }
}

impl Clone for Box<dyn Explorer> {
    fn clone(&self) -> Self {
        self.clone_explorer()
    }
}
