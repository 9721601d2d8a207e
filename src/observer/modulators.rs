//! Presentation throttles for free-text logging.
//!
//! A [`Modulator`] is consulted after an observer's filter, and only by
//! observers that format log lines. Unlike filters, modulators are stateful:
//! the elapsed-time modulator remembers when it last let an event through.
//! Observers keep one modulator per event source, copied from a prototype
//! with [`Modulator::fresh`].

use super::event::{Event, CURRENT_ITERATION};
use crate::error::{Error, Result};
use std::time::{Duration, Instant};

pub trait Modulator: Send {
    /// True if `event` should not be presented.
    fn should_modulate(&mut self, event: &Event) -> bool;

    /// A modulator with the same settings and no history.
    fn fresh(&self) -> Box<dyn Modulator>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullModulator;

impl Modulator for NullModulator {
    fn should_modulate(&mut self, _event: &Event) -> bool {
        false
    }

    fn fresh(&self) -> Box<dyn Modulator> {
        Box::new(NullModulator)
    }
}

/// Presents every `n`th iteration event.
#[derive(Debug, Clone, Copy)]
pub struct IterationModulator {
    modulo: u64,
}

impl IterationModulator {
    pub fn new(modulo: u64) -> Result<Self> {
        if modulo == 0 {
            return Err(Error::InvalidParameter {
                name: "iteration_modulo".into(),
                reason: "must be positive".into(),
            });
        }
        Ok(Self { modulo })
    }
}

impl Modulator for IterationModulator {
    fn should_modulate(&mut self, event: &Event) -> bool {
        if !event.event_type().is_iteration() {
            return false;
        }
        event
            .u64_attribute(CURRENT_ITERATION)
            .map_or(true, |iteration| iteration % self.modulo != 0)
    }

    fn fresh(&self) -> Box<dyn Modulator> {
        Box::new(*self)
    }
}

/// Presents at most one iteration event per `interval` of wall-clock time.
#[derive(Debug, Clone)]
pub struct ElapsedTimeModulator {
    interval: Duration,
    last_presented: Option<Instant>,
}

impl ElapsedTimeModulator {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_presented: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Modulator for ElapsedTimeModulator {
    fn should_modulate(&mut self, event: &Event) -> bool {
        if !event.event_type().is_iteration() {
            return false;
        }
        let now = Instant::now();
        match self.last_presented {
            Some(last) if now.duration_since(last) < self.interval => true,
            _ => {
                self.last_presented = Some(now);
                false
            }
        }
    }

    fn fresh(&self) -> Box<dyn Modulator> {
        Box::new(Self::new(self.interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::EventType;

    fn iteration(i: u64) -> Event {
        Event::new(EventType::FinishedIteration, "m").with_attribute(CURRENT_ITERATION, i)
    }

    #[test]
    fn test_iteration_modulator() {
        let mut modulator = IterationModulator::new(10).unwrap();
        assert!(modulator.should_modulate(&iteration(9)));
        assert!(!modulator.should_modulate(&iteration(10)));
        assert!(!modulator.should_modulate(&Event::new(EventType::StartedAnnealing, "m")));
    }

    #[test]
    fn test_elapsed_time_modulator_throttles() {
        let mut modulator = ElapsedTimeModulator::new(Duration::from_secs(3600));
        assert!(!modulator.should_modulate(&iteration(1)));
        assert!(modulator.should_modulate(&iteration(2)));
        assert!(!modulator.should_modulate(&Event::note("m", "always")));
    }

    #[test]
    fn test_fresh_elapsed_time_modulator_forgets_history() {
        let mut modulator = ElapsedTimeModulator::new(Duration::from_secs(3600));
        assert!(!modulator.should_modulate(&iteration(1)));
        let mut copy = modulator.fresh();
        assert!(!copy.should_modulate(&iteration(2)));
        assert!(modulator.should_modulate(&iteration(2)));
    }

    #[test]
    fn test_elapsed_time_modulator_zero_interval() {
        let mut modulator = ElapsedTimeModulator::new(Duration::ZERO);
        for i in 0..5 {
            assert!(!modulator.should_modulate(&iteration(i)));
        }
    }
}
