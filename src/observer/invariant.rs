use super::{
    Event, EventType, Observer, CHANGE_ACCEPTED, CHANGE_IN_OBJECTIVE_VALUE, OBJECTIVE_VALUE,
};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::error;

const RELATIVE_TOLERANCE: f64 = 1e-9;

/// Checks the annealing loop invariant on every finished iteration:
///
/// - accepted: `previous + change == current`
/// - rejected: `previous == current`
///
/// A violation is returned as [`Error::InvariantViolation`], which aborts
/// the run. State is kept per source id, so one observer can watch several
/// concurrent runs.
#[derive(Debug, Default)]
pub struct InvariantObserver {
    previous: Mutex<HashMap<String, f64>>,
}

impl InvariantObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn violation(event: &Event, detail: String) -> Error {
        let violation = Error::InvariantViolation {
            id: event.source().to_string(),
            event: event.event_type().to_string(),
            detail,
        };
        error!(%violation, "annealing invariant violated");
        violation
    }

    fn required(event: &Event, name: &str) -> Result<f64> {
        event
            .f64_attribute(name)
            .ok_or_else(|| Self::violation(event, format!("missing attribute {name}")))
    }
}

impl Observer for InvariantObserver {
    fn observe_event(&self, event: &Event) -> Result<()> {
        match event.event_type() {
            EventType::StartedAnnealing => {
                let objective = Self::required(event, OBJECTIVE_VALUE)?;
                self.previous
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(event.source().to_string(), objective);
                Ok(())
            }
            EventType::FinishedIteration => {
                let current = Self::required(event, OBJECTIVE_VALUE)?;
                let change = Self::required(event, CHANGE_IN_OBJECTIVE_VALUE)?;
                let accepted = event
                    .bool_attribute(CHANGE_ACCEPTED)
                    .ok_or_else(|| Self::violation(event, format!("missing attribute {CHANGE_ACCEPTED}")))?;

                let mut previous = self.previous.lock().unwrap_or_else(PoisonError::into_inner);
                let Some(before) = previous.insert(event.source().to_string(), current) else {
                    return Err(Self::violation(event, "iteration before annealing started".into()));
                };

                let expected = if accepted { before + change } else { before };
                let tolerance = RELATIVE_TOLERANCE * expected.abs().max(1.0);
                if (expected - current).abs() > tolerance {
                    let detail = if accepted {
                        format!("previous [{before}] + change [{change}] != current [{current}]")
                    } else {
                        format!("rejected change moved objective from [{before}] to [{current}]")
                    };
                    return Err(Self::violation(event, detail));
                }
                Ok(())
            }
            EventType::FinishedAnnealing => {
                self.previous
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(event.source());
                Ok(())
            }
            EventType::StartedIteration | EventType::Note => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(objective: f64) -> Event {
        Event::new(EventType::StartedAnnealing, "inv").with_attribute(OBJECTIVE_VALUE, objective)
    }

    fn finished(objective: f64, change: f64, accepted: bool) -> Event {
        Event::new(EventType::FinishedIteration, "inv")
            .with_attribute(OBJECTIVE_VALUE, objective)
            .with_attribute(CHANGE_IN_OBJECTIVE_VALUE, change)
            .with_attribute(CHANGE_ACCEPTED, accepted)
    }

    #[test]
    fn test_consistent_sequence_passes() {
        let observer = InvariantObserver::new();
        observer.observe_event(&started(100.0)).unwrap();
        observer.observe_event(&finished(99.0, -1.0, true)).unwrap();
        observer.observe_event(&finished(99.0, 1.0, false)).unwrap();
        observer.observe_event(&finished(100.0, 1.0, true)).unwrap();
    }

    #[test]
    fn test_accepted_mismatch_is_violation() {
        let observer = InvariantObserver::new();
        observer.observe_event(&started(100.0)).unwrap();
        let result = observer.observe_event(&finished(97.0, -1.0, true));
        assert!(matches!(result, Err(Error::InvariantViolation { .. })));
    }

    #[test]
    fn test_rejected_change_must_not_move_objective() {
        let observer = InvariantObserver::new();
        observer.observe_event(&started(100.0)).unwrap();
        let error = observer
            .observe_event(&finished(101.0, 1.0, false))
            .unwrap_err();
        assert!(error.to_string().contains("Id [inv], Event [FinishedIteration]"));
        assert!(error.is_fatal());
    }

    #[test]
    fn test_runs_tracked_independently() {
        let observer = InvariantObserver::new();
        observer.observe_event(&started(10.0)).unwrap();
        let other = Event::new(EventType::StartedAnnealing, "other").with_attribute(OBJECTIVE_VALUE, 50.0);
        observer.observe_event(&other).unwrap();
        observer.observe_event(&finished(11.0, 1.0, true)).unwrap();
    }
}
