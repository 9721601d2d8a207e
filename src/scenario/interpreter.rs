use super::config::{
    AnnealerConfig, FilterConfig, ModelConfig, ModulatorConfig, ObserverConfig, ScenarioConfig,
};
use crate::annealer::{AnnealerBuilder, AnnealerKind};
use crate::cooling::{validate_cooling_factor, CoolantKind};
use crate::error::{CompositeError, Error, Result};
use crate::explorer::{Explorer, KirkpatrickExplorer, NullExplorer, SuppapitnarmExplorer};
use crate::model::{DumbModel, Model, MultiObjectiveDumbModel, OBJECTIVE_VALUE};
use crate::observer::{
    AttributeObserver, ElapsedTimeModulator, Filter, IterationCountFilter, IterationModulator,
    InvariantObserver, MessageObserver, Modulator, NullFilter, NullModulator, Observer,
    PercentileOfIterationsFilter,
};
use crate::runner::{CallableRunner, RunOutcome, ScenarioRunner};
use crate::solution::JsonEncoder;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const KIRKPATRICK: &str = "Kirkpatrick";
pub const SUPPAPITNARM: &str = "Suppapitnarm";
pub const AVERAGED_SUPPAPITNARM: &str = "AveragedSuppapitnarm";

pub const DUMB_MODEL: &str = "DumbModel";
pub const MULTI_OBJECTIVE_DUMB_MODEL: &str = "MultiObjectiveDumbModel";

const DEFAULT_ACTION_COUNT: f64 = 20.0;

/// Builds a model from its configuration.
pub type ModelFactory = Box<dyn Fn(&ModelConfig) -> Result<Box<dyn Model>> + Send + Sync>;

/// Explorer family selected by an annealer type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExplorerFamily {
    Kirkpatrick,
    Suppapitnarm(CoolantKind),
}

fn explorer_family(annealer_type: &str) -> Option<ExplorerFamily> {
    match annealer_type {
        KIRKPATRICK => Some(ExplorerFamily::Kirkpatrick),
        SUPPAPITNARM => Some(ExplorerFamily::Suppapitnarm(CoolantKind::Suppapitnarm)),
        AVERAGED_SUPPAPITNARM => Some(ExplorerFamily::Suppapitnarm(CoolantKind::Averaged)),
        _ => None,
    }
}

fn non_negative_integer(config: &ModelConfig, name: &str, default: f64) -> Result<u64> {
    let value = config.parameter(name).unwrap_or(default);
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Ok(value as u64)
    } else {
        Err(Error::InvalidParameter {
            name: name.to_string(),
            reason: format!("must be a non-negative integer, got {value}"),
        })
    }
}

fn dumb_model(config: &ModelConfig) -> Result<Box<dyn Model>> {
    let model = DumbModel::new();
    let initial = config.parameter("InitialValue");
    let minimum = config.parameter("Minimum");
    let maximum = config.parameter("Maximum");
    if initial.is_none() && minimum.is_none() && maximum.is_none() {
        return Ok(Box::new(model));
    }

    let initial = initial.unwrap_or(model.objective_value());
    let minimum = minimum.unwrap_or(f64::MIN);
    let maximum = maximum.unwrap_or(f64::MAX);
    if minimum > maximum {
        return Err(Error::InvalidParameter {
            name: "Minimum".into(),
            reason: format!("{minimum} exceeds Maximum {maximum}"),
        });
    }
    Ok(Box::new(model.with_range(initial, minimum, maximum)))
}

fn multi_objective_dumb_model(config: &ModelConfig) -> Result<Box<dyn Model>> {
    let actions = non_negative_integer(config, "Actions", DEFAULT_ACTION_COUNT)?;
    let seed = non_negative_integer(config, "Seed", 1.0)?;
    let actions = usize::try_from(actions).map_err(|_| Error::InvalidParameter {
        name: "Actions".into(),
        reason: "too many actions".into(),
    })?;
    Ok(Box::new(MultiObjectiveDumbModel::new(actions, seed)))
}

/// Turns a [`ScenarioConfig`] into a ready-to-run [`ScenarioRunner`].
///
/// Annealer types and model types are looked up by name; unknown names,
/// invalid parameters and invalid observers are all collected into one
/// [`CompositeError`]. Every scenario uses the elapsed-time-tracking
/// annealer.
pub struct ScenarioInterpreter {
    models: HashMap<String, ModelFactory>,
}

impl ScenarioInterpreter {
    /// An interpreter knowing the two reference models.
    pub fn new() -> Self {
        Self {
            models: HashMap::new(),
        }
        .with_model_factory(DUMB_MODEL, dumb_model)
        .with_model_factory(MULTI_OBJECTIVE_DUMB_MODEL, multi_objective_dumb_model)
    }

    /// Registers (or replaces) the factory for `model_type`.
    pub fn with_model_factory<F>(mut self, model_type: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ModelConfig) -> Result<Box<dyn Model>> + Send + Sync + 'static,
    {
        self.models.insert(model_type.into(), Box::new(factory));
        self
    }

    pub fn model_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.models.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn interpret(&self, config: &ScenarioConfig) -> Result<ScenarioRunner, CompositeError> {
        let mut errors = Vec::new();

        let family = explorer_family(&config.annealer.annealer_type);
        if family.is_none() {
            errors.push(Error::UnknownAnnealerType(config.annealer.annealer_type.clone()));
        }

        let model = match self.build_model(&config.model) {
            Ok(model) => Some(model),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let explorer: Box<dyn Explorer> = match (family, model) {
            (Some(family), Some(model)) => match build_explorer(family, &config.annealer, model) {
                Ok(explorer) => explorer,
                Err(e) => {
                    errors.push(e);
                    Box::new(NullExplorer::default())
                }
            },
            _ => Box::new(NullExplorer::default()),
        };

        let mut observers = Vec::with_capacity(config.observers.len());
        for observer in &config.observers {
            match build_observer(observer, config.annealer.maximum_iterations) {
                Ok(observer) => observers.push(observer),
                Err(e) => errors.push(e),
            }
        }

        let mut builder = AnnealerBuilder::new(AnnealerKind::ElapsedTimeTracking)
            .with_id(config.name.as_str())
            .with_starting_temperature(config.annealer.starting_temperature)
            .with_cooling_factor(config.annealer.cooling_factor)
            .with_maximum_iterations(config.annealer.maximum_iterations)
            .with_explorer(explorer)
            .with_notifier(config.annealer.notifier)
            .with_observers(observers);
        for error in errors {
            builder = builder.with_error(error);
        }
        let annealer = builder.build()?;

        let mut runner = ScenarioRunner::new(annealer)
            .with_name(config.name.as_str())
            .with_run_number(config.run_number)
            .with_maximum_concurrent_runs(config.maximum_concurrent_runs);
        if let Some(path) = &config.output_path {
            runner = runner.with_encoder(Arc::new(JsonEncoder::new().with_output_path(path)));
        }
        debug!(scenario = runner.name(), "scenario interpreted");
        Ok(runner)
    }

    /// Interprets `config` and runs it to completion.
    pub fn run(&self, config: &ScenarioConfig) -> Result<Vec<RunOutcome>> {
        self.interpret(config)?.run()
    }

    fn build_model(&self, config: &ModelConfig) -> Result<Box<dyn Model>> {
        let factory = self
            .models
            .get(&config.model_type)
            .ok_or_else(|| Error::UnknownModelType(config.model_type.clone()))?;
        factory(config)
    }
}

impl Default for ScenarioInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn build_explorer(
    family: ExplorerFamily,
    config: &AnnealerConfig,
    model: Box<dyn Model>,
) -> Result<Box<dyn Explorer>> {
    match family {
        ExplorerFamily::Kirkpatrick => {
            model.decision_variable(OBJECTIVE_VALUE)?;
            let explorer = KirkpatrickExplorer::new(model);
            Ok(match config.seed {
                Some(seed) => Box::new(explorer.with_seed(seed)),
                None => Box::new(explorer),
            })
        }
        ExplorerFamily::Suppapitnarm(coolant) => {
            let mut explorer = SuppapitnarmExplorer::new(model)
                .with_coolant(coolant)
                .with_archive_size(config.archive_size)
                .with_eviction_policy(config.eviction)
                .with_tolerance(config.tolerance)
                .with_return_to_base_step(config.return_to_base_step);
            // An invalid factor is reported once, by the annealer builder.
            if validate_cooling_factor(config.cooling_factor).is_ok() {
                explorer = explorer.with_cooling_factor(config.cooling_factor);
            }
            if let Some(seed) = config.seed {
                explorer = explorer.with_seed(seed);
            }
            explorer.validate()?;
            Ok(Box::new(explorer))
        }
    }
}

fn build_filter(config: Option<&FilterConfig>, maximum_iterations: u64) -> Result<Box<dyn Filter>> {
    Ok(match config {
        None => Box::new(NullFilter),
        Some(FilterConfig::PercentileOfIterations { percentile }) => Box::new(
            PercentileOfIterationsFilter::new(maximum_iterations, *percentile)?,
        ),
        Some(FilterConfig::IterationCount { modulo }) => {
            Box::new(IterationCountFilter::new(*modulo)?)
        }
    })
}

fn build_modulator(config: Option<&ModulatorConfig>) -> Result<Box<dyn Modulator>> {
    Ok(match config {
        None => Box::new(NullModulator),
        Some(ModulatorConfig::Iteration { modulo }) => Box::new(IterationModulator::new(*modulo)?),
        Some(ModulatorConfig::ElapsedTime { seconds }) => {
            let interval =
                Duration::try_from_secs_f64(*seconds).map_err(|e| Error::InvalidParameter {
                    name: "seconds".into(),
                    reason: e.to_string(),
                })?;
            Box::new(ElapsedTimeModulator::new(interval))
        }
    })
}

fn build_observer(config: &ObserverConfig, maximum_iterations: u64) -> Result<Arc<dyn Observer>> {
    Ok(match config {
        ObserverConfig::Message { filter, modulator } => Arc::new(
            MessageObserver::new()
                .with_boxed_filter(build_filter(filter.as_ref(), maximum_iterations)?)
                .with_boxed_modulator(build_modulator(modulator.as_ref())?),
        ),
        ObserverConfig::Attribute { filter } => Arc::new(
            AttributeObserver::new()
                .with_boxed_filter(build_filter(filter.as_ref(), maximum_iterations)?),
        ),
        ObserverConfig::Invariant => Arc::new(InvariantObserver::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DecisionVariable, DecisionVariables};
    use rand::RngCore;

    fn kirkpatrick_config() -> ScenarioConfig {
        ScenarioConfig {
            name: "Interpreted".into(),
            annealer: AnnealerConfig {
                starting_temperature: 10.0,
                cooling_factor: 0.997,
                maximum_iterations: 200,
                seed: Some(42),
                ..AnnealerConfig::default()
            },
            observers: vec![ObserverConfig::Invariant],
            ..ScenarioConfig::default()
        }
    }

    #[derive(Clone)]
    struct Fixed {
        variables: DecisionVariables,
    }

    impl Model for Fixed {
        fn name(&self) -> &str {
            "Fixed"
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

    // ---- Registry ----

    #[test]
    fn test_reference_models_registered() {
        assert_eq!(
            ScenarioInterpreter::new().model_types(),
            vec![DUMB_MODEL, MULTI_OBJECTIVE_DUMB_MODEL]
        );
    }

    #[test]
    fn test_custom_model_factory() {
        let interpreter = ScenarioInterpreter::new().with_model_factory("Fixed", |_config: &ModelConfig| {
            Ok(Box::new(Fixed {
                variables: DecisionVariables::new()
                    .with(DecisionVariable::new(OBJECTIVE_VALUE, 7.0)),
            }) as Box<dyn Model>)
        });
        let config = ScenarioConfig {
            model: ModelConfig::new("Fixed"),
            ..kirkpatrick_config()
        };
        let outcomes = interpreter.run(&config).unwrap();
        assert_eq!(outcomes[0].solution.decision_variable(OBJECTIVE_VALUE), Some(7.0));
    }

    // ---- Interpretation ----

    #[test]
    fn test_kirkpatrick_scenario_runs() {
        let interpreter = ScenarioInterpreter::new();
        let mut runner = interpreter.interpret(&kirkpatrick_config()).unwrap();
        assert_eq!(runner.annealer().temperature(), 10.0);
        assert_eq!(runner.annealer().observers().len(), 1);
        let outcomes = runner.run().unwrap();
        assert_eq!(outcomes[0].id, "Interpreted");
    }

    #[test]
    fn test_multi_objective_scenario_produces_summary() {
        let config = ScenarioConfig {
            name: "MO".into(),
            run_number: 2,
            maximum_concurrent_runs: 2,
            annealer: AnnealerConfig {
                annealer_type: AVERAGED_SUPPAPITNARM.into(),
                starting_temperature: 5.0,
                cooling_factor: 0.99,
                maximum_iterations: 300,
                seed: Some(7),
                archive_size: 10,
                return_to_base_step: 50,
                ..AnnealerConfig::default()
            },
            model: ModelConfig::new(MULTI_OBJECTIVE_DUMB_MODEL).with_parameter("Actions", 12.0),
            observers: vec![ObserverConfig::Invariant],
            ..ScenarioConfig::default()
        };
        let outcomes = ScenarioInterpreter::new().run(&config).unwrap();
        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            let summary = outcome.archive_summary.as_ref().unwrap();
            assert_eq!(summary.id, outcome.id);
            assert!(!summary.is_empty());
            assert!(summary.len() <= 10);
        }
    }

    #[test]
    fn test_all_problems_reported_together() {
        let config = ScenarioConfig {
            annealer: AnnealerConfig {
                annealer_type: "Nonsense".into(),
                starting_temperature: -1.0,
                ..AnnealerConfig::default()
            },
            model: ModelConfig::new("Missing"),
            observers: vec![ObserverConfig::Message {
                filter: Some(FilterConfig::IterationCount { modulo: 0 }),
                modulator: None,
            }],
            ..ScenarioConfig::default()
        };
        let error = ScenarioInterpreter::new().interpret(&config).err().unwrap();
        let rendered: Vec<String> = error.errors().iter().map(ToString::to_string).collect();

        assert_eq!(error.len(), 4, "{rendered:?}");
        assert!(error
            .errors()
            .iter()
            .any(|e| matches!(e, Error::UnknownAnnealerType(name) if name == "Nonsense")));
        assert!(error
            .errors()
            .iter()
            .any(|e| matches!(e, Error::UnknownModelType(name) if name == "Missing")));
        assert!(error
            .errors()
            .iter()
            .any(|e| matches!(e, Error::InvalidTemperature(_))));
    }

    #[test]
    fn test_invalid_cooling_factor_reported_once() {
        let config = ScenarioConfig {
            model: ModelConfig::new(MULTI_OBJECTIVE_DUMB_MODEL),
            annealer: AnnealerConfig {
                annealer_type: SUPPAPITNARM.into(),
                cooling_factor: 1.5,
                ..AnnealerConfig::default()
            },
            ..ScenarioConfig::default()
        };
        let error = ScenarioInterpreter::new().interpret(&config).err().unwrap();

        assert_eq!(error.len(), 1);
        assert!(matches!(error.errors()[0], Error::InvalidCoolingFactor(f) if f == 1.5));
    }

    #[test]
    fn test_kirkpatrick_needs_objective_variable() {
        let config = ScenarioConfig {
            model: ModelConfig::new(MULTI_OBJECTIVE_DUMB_MODEL),
            ..kirkpatrick_config()
        };
        let error = ScenarioInterpreter::new().interpret(&config).err().unwrap();
        assert!(matches!(
            error.errors()[0],
            Error::UnknownDecisionVariable { .. }
        ));
    }

    #[test]
    fn test_invalid_model_parameters() {
        let config = ScenarioConfig {
            model: ModelConfig::new(MULTI_OBJECTIVE_DUMB_MODEL).with_parameter("Actions", 2.5),
            annealer: AnnealerConfig {
                annealer_type: SUPPAPITNARM.into(),
                ..AnnealerConfig::default()
            },
            ..ScenarioConfig::default()
        };
        assert!(ScenarioInterpreter::new().interpret(&config).is_err());
    }

    #[test]
    fn test_output_path_writes_solutions() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScenarioConfig {
            output_path: Some(dir.path().to_path_buf()),
            run_number: 2,
            ..kirkpatrick_config()
        };
        ScenarioInterpreter::new().run(&config).unwrap();
        assert!(dir.path().join("Interpreted (1_2).json").exists());
        assert!(dir.path().join("Interpreted (2_2).json").exists());
    }
}
