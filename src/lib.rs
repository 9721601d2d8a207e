//! Simulated annealing engine for single- and multi-objective models.
//!
//! Provides the pieces of an annealing run as small, swappable parts:
//!
//! - **Model**: the optimisation target, exposing named decision variables,
//!   togglable management actions and a pending-change protocol.
//! - **Explorer**: one perturbation attempt per iteration with Metropolis
//!   (Kirkpatrick) or Pareto-archive (Suppapitnarm) acceptance.
//! - **Cooling**: geometric and adaptive temperature schedules.
//! - **Archive**: bounded non-dominated archive of compressed model states.
//! - **Annealer**: the iterate-evaluate-cool state machine, publishing
//!   events to observers.
//! - **Observer**: event notifiers, log observers with filters and
//!   modulators, and a loop-invariant checker.
//! - **Runner**: independent annealer clones run with bounded concurrency.
//! - **Scenario**: typed configuration interpreted into a runner.
//!
//! # Architecture
//!
//! A [`runner::ScenarioRunner`] clones its prototype [`annealer::Annealer`]
//! once per run. Each clone owns a deep copy of its explorer and model and
//! runs single-threaded; only observers (and their logging) are shared.
//! Logging goes through `tracing`; per-event lines use the
//! [`observer::ANNEALER_LOG_TARGET`] target.

pub mod annealer;
pub mod archive;
pub mod cooling;
pub mod error;
pub mod explorer;
pub mod model;
pub mod observer;
pub mod random;
pub mod runner;
pub mod scenario;
pub mod solution;

pub use error::{CompositeError, Error, Result};
