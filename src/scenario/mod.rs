//! Scenario boundary: typed configuration in, runs out.
//!
//! A host (CLI, job server) hands over a parsed [`ScenarioConfig`]; the
//! [`ScenarioInterpreter`] resolves annealer and model types by name,
//! builds observers and returns a [`ScenarioRunner`](crate::runner::ScenarioRunner)
//! or every configuration problem at once.
//!
//! ```
//! use u_anneal::scenario::{AnnealerConfig, ScenarioConfig, ScenarioInterpreter};
//!
//! let config = ScenarioConfig {
//!     name: "Doc".into(),
//!     annealer: AnnealerConfig {
//!         starting_temperature: 10.0,
//!         cooling_factor: 0.99,
//!         maximum_iterations: 100,
//!         ..AnnealerConfig::default()
//!     },
//!     ..ScenarioConfig::default()
//! };
//! let outcomes = ScenarioInterpreter::new().run(&config).unwrap();
//! assert_eq!(outcomes[0].id, "Doc");
//! ```

mod config;
mod interpreter;

pub use config::{
    AnnealerConfig, FilterConfig, ModelConfig, ModulatorConfig, ObserverConfig, ScenarioConfig,
};
pub use interpreter::{
    ModelFactory, ScenarioInterpreter, AVERAGED_SUPPAPITNARM, DUMB_MODEL, KIRKPATRICK,
    MULTI_OBJECTIVE_DUMB_MODEL, SUPPAPITNARM,
};
