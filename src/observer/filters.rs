//! Per-event suppression.
//!
//! A [`Filter`] decides whether an observer sees an event at all. Only
//! iteration events are ever suppressed; annealing start/finish and notes
//! always pass.

use super::event::{Event, CURRENT_ITERATION};
use crate::error::{Error, Result};

pub trait Filter: Send + Sync {
    /// True if `event` should be dropped.
    fn should_filter(&self, event: &Event) -> bool;
}

/// Lets everything through.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFilter;

impl Filter for NullFilter {
    fn should_filter(&self, _event: &Event) -> bool {
        false
    }
}

/// Passes iteration events whose `CurrentIteration` is a multiple of `n`.
#[derive(Debug, Clone, Copy)]
pub struct IterationCountFilter {
    modulo: u64,
}

impl IterationCountFilter {
    pub fn new(modulo: u64) -> Result<Self> {
        if modulo == 0 {
            return Err(Error::InvalidParameter {
                name: "iteration_modulo".into(),
                reason: "must be positive".into(),
            });
        }
        Ok(Self { modulo })
    }

    pub fn modulo(&self) -> u64 {
        self.modulo
    }
}

impl Filter for IterationCountFilter {
    fn should_filter(&self, event: &Event) -> bool {
        filter_by_modulo(event, self.modulo)
    }
}

/// Passes about `percentile` of a run's iteration events, evenly spaced.
///
/// The reporting interval is `max(1, round(maximum_iterations * percentile))`,
/// with `percentile` a fraction in `(0, 1]`.
///
/// # Examples
///
/// ```
/// use u_anneal::observer::{Event, EventType, Filter, PercentileOfIterationsFilter};
///
/// let filter = PercentileOfIterationsFilter::new(1000, 0.1).unwrap();
/// assert_eq!(filter.modulo(), 100);
///
/// let event = |i: u64| Event::new(EventType::FinishedIteration, "a")
///     .with_attribute("CurrentIteration", i);
/// assert!(!filter.should_filter(&event(200)));
/// assert!(filter.should_filter(&event(201)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PercentileOfIterationsFilter {
    modulo: u64,
}

impl PercentileOfIterationsFilter {
    pub fn new(maximum_iterations: u64, percentile: f64) -> Result<Self> {
        if percentile.is_nan() || percentile <= 0.0 || percentile > 1.0 {
            return Err(Error::InvalidParameter {
                name: "percentile".into(),
                reason: format!("must be in (0, 1], got {percentile}"),
            });
        }
        let modulo = (maximum_iterations as f64 * percentile).round().max(1.0) as u64;
        Ok(Self { modulo })
    }

    pub fn modulo(&self) -> u64 {
        self.modulo
    }
}

impl Filter for PercentileOfIterationsFilter {
    fn should_filter(&self, event: &Event) -> bool {
        filter_by_modulo(event, self.modulo)
    }
}

fn filter_by_modulo(event: &Event, modulo: u64) -> bool {
    if !event.event_type().is_iteration() {
        return false;
    }
    match event.u64_attribute(CURRENT_ITERATION) {
        Some(iteration) => iteration % modulo != 0,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::EventType;

    fn iteration(event_type: EventType, i: u64) -> Event {
        Event::new(event_type, "test").with_attribute(CURRENT_ITERATION, i)
    }

    #[test]
    fn test_percentile_modulo() {
        assert_eq!(PercentileOfIterationsFilter::new(2000, 0.01).unwrap().modulo(), 20);
        assert_eq!(PercentileOfIterationsFilter::new(10, 0.01).unwrap().modulo(), 1);
        assert_eq!(PercentileOfIterationsFilter::new(0, 0.5).unwrap().modulo(), 1);
        assert!(PercentileOfIterationsFilter::new(10, 0.0).is_err());
        assert!(PercentileOfIterationsFilter::new(10, 1.5).is_err());
    }

    #[test]
    fn test_non_iteration_events_pass() {
        let filter = PercentileOfIterationsFilter::new(100, 0.5).unwrap();
        assert!(!filter.should_filter(&Event::new(EventType::StartedAnnealing, "a")));
        assert!(!filter.should_filter(&Event::new(EventType::FinishedAnnealing, "a")));
        assert!(!filter.should_filter(&Event::note("a", "x")));
    }

    #[test]
    fn test_iteration_events_sampled() {
        let filter = PercentileOfIterationsFilter::new(100, 0.25).unwrap();
        let passed: Vec<u64> = (1..=100)
            .filter(|&i| !filter.should_filter(&iteration(EventType::FinishedIteration, i)))
            .collect();
        assert_eq!(passed, vec![25, 50, 75, 100]);
    }

    #[test]
    fn test_iteration_count_filter() {
        let filter = IterationCountFilter::new(3).unwrap();
        assert!(!filter.should_filter(&iteration(EventType::StartedIteration, 6)));
        assert!(filter.should_filter(&iteration(EventType::StartedIteration, 7)));
        assert!(IterationCountFilter::new(0).is_err());
    }

    #[test]
    fn test_null_filter() {
        assert!(!NullFilter.should_filter(&iteration(EventType::FinishedIteration, 1)));
    }
}
