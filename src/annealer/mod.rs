//! The annealing state machine.
//!
//! An [`Annealer`] owns one [`Explorer`] and drives the
//! iterate-evaluate-cool loop, publishing an [`Event`] at every step:
//!
//! ```text
//! StartedAnnealing
//!   ( StartedIteration -> try_random_change -> FinishedIteration -> cool down ) x maximum_iterations
//! FinishedAnnealing
//! ```
//!
//! Annealers move through [`AnnealerState::Ready`] →
//! [`AnnealerState::Running`] → [`AnnealerState::Finished`]; a constructed
//! annealer is always `Ready`, so there is no uninitialised state to
//! guard against. Annealing twice without cloning is rejected.
//!
//! # Variants
//!
//! - [`SimpleAnnealer`]: the loop itself.
//! - [`ElapsedTimeTrackingAnnealer`]: delegates to a simple annealer and
//!   reports total wall-clock time as a `Note` event.
//!
//! Use [`AnnealerBuilder`] to assemble either with validated parameters.
//!
//! [`Event`]: crate::observer::Event

mod builder;
mod simple;
mod timed;

pub use builder::{AnnealerBuilder, AnnealerKind, NotifierKind};
pub use simple::SimpleAnnealer;
pub use timed::ElapsedTimeTrackingAnnealer;

use crate::error::{Error, Result};
use crate::explorer::Explorer;
use crate::observer::Observer;
use crate::solution::{ArchiveSummary, Solution};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Lifecycle of one annealer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnealerState {
    #[default]
    Ready,
    Running,
    Finished,
}

impl fmt::Display for AnnealerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnnealerState::Ready => "ready",
            AnnealerState::Running => "running",
            AnnealerState::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Drives one explorer through a full annealing schedule.
pub trait Annealer: Send {
    fn id(&self) -> &str;

    /// Renames the annealer and its explorer.
    fn set_id(&mut self, id: &str);

    fn state(&self) -> AnnealerState;

    fn temperature(&self) -> f64;

    /// Rejects values `<= 0`.
    fn set_temperature(&mut self, temperature: f64) -> Result<()>;

    fn cooling_factor(&self) -> f64;

    fn maximum_iterations(&self) -> u64;

    fn current_iteration(&self) -> u64;

    fn explorer(&self) -> &dyn Explorer;

    fn add_observer(&mut self, observer: Arc<dyn Observer>);

    fn observers(&self) -> &[Arc<dyn Observer>];

    /// Runs the full schedule and returns the final solution.
    ///
    /// Fails with [`Error::InvalidState`] unless the annealer is `Ready`.
    fn anneal(&mut self) -> Result<Solution>;

    /// The solution of a finished run.
    fn solution(&self) -> Option<&Solution>;

    /// Archive contents, for annealers whose explorer keeps one.
    fn archive_summary(&self) -> Option<ArchiveSummary> {
        self.explorer().archive_summary(self.id())
    }

    /// An independent copy: the explorer and model are deep-cloned, the
    /// observers shared.
    fn clone_annealer(&self) -> Box<dyn Annealer>;
}

impl Clone for Box<dyn Annealer> {
    fn clone(&self) -> Self {
        self.clone_annealer()
    }
}

/// Runs [`Annealer::anneal`], turning a panic anywhere inside the run
/// into [`Error::Fault`].
pub fn anneal_guarded(annealer: &mut dyn Annealer) -> Result<Solution> {
    match panic::catch_unwind(AssertUnwindSafe(|| annealer.anneal())) {
        Ok(result) => result,
        Err(payload) => Err(Error::Fault(panic_message(payload.as_ref()))),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::{Explorer, Trial};
    use crate::model::{Model, NullModel};

    #[derive(Clone, Default)]
    struct Exploding {
        model: NullModel,
        trial: Trial,
    }

    impl Explorer for Exploding {
        fn id(&self) -> &str {
            "exploding"
        }

        fn set_id(&mut self, _id: &str) {}

        fn try_random_change(&mut self, _temperature: f64) -> Result<()> {
            panic!("model blew up");
        }

        fn trial(&self) -> &Trial {
            &self.trial
        }

        fn model(&self) -> &dyn Model {
            &self.model
        }

        fn model_mut(&mut self) -> &mut dyn Model {
            &mut self.model
        }

        fn clone_explorer(&self) -> Box<dyn Explorer> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_panic_becomes_fault() {
        let mut annealer = SimpleAnnealer::new()
            .with_maximum_iterations(3)
            .with_explorer(Box::new(Exploding::default()));
        let error = anneal_guarded(&mut annealer).unwrap_err();
        assert!(matches!(error, Error::Fault(_)));
        assert_eq!(
            error.to_string(),
            "annealing function failed: model blew up"
        );
    }

    #[test]
    fn test_guarded_passes_results_through() {
        let mut annealer = SimpleAnnealer::new();
        assert!(anneal_guarded(&mut annealer).is_ok());
        assert!(matches!(
            anneal_guarded(&mut annealer),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(AnnealerState::Finished.to_string(), "finished");
    }
}
