//! Event/observer notification fabric.
//!
//! Annealers publish [`Event`]s through an [`EventNotifier`]; observers
//! subscribe to one annealer's notifier and read event attributes only.
//!
//! - [`MessageObserver`] writes one human-readable line per event to the
//!   `annealer` tracing target, subject to a [`Filter`] and a [`Modulator`].
//! - [`AttributeObserver`] writes the same events as structured fields.
//! - [`InvariantObserver`] re-derives each iteration's objective value and
//!   aborts the run on any mismatch.
//!
//! Observers are shared (`Arc`) between an annealer and its clones, so
//! stateful observers key their state by event source.

mod event;
mod filters;
mod invariant;
mod message;
mod modulators;
mod notifier;

pub use event::{
    AttributeValue, Event, EventType, ACCEPTANCE_PROBABILITY, CHANGE_ACCEPTED,
    CHANGE_IN_OBJECTIVE_VALUE, CHANGE_IS_DESIRABLE, COOLING_FACTOR, CURRENT_ITERATION,
    MAXIMUM_ITERATIONS, OBJECTIVE_VALUE, TEMPERATURE,
};
pub use filters::{Filter, IterationCountFilter, NullFilter, PercentileOfIterationsFilter};
pub use invariant::InvariantObserver;
pub use message::{AttributeObserver, MessageObserver};
pub use modulators::{ElapsedTimeModulator, IterationModulator, Modulator, NullModulator};
pub use notifier::{AsynchronousNotifier, EventNotifier, SynchronousNotifier, DEFAULT_QUEUE_CAPACITY};

use crate::error::Result;

/// Tracing target standing in for the dedicated "annealer" log level.
pub const ANNEALER_LOG_TARGET: &str = "annealer";

/// Receives events from one or more annealers.
///
/// Returning an error aborts the run that raised `event`.
pub trait Observer: Send + Sync {
    fn observe_event(&self, event: &Event) -> Result<()>;
}
