//! Typed scenario configuration.
//!
//! Parsing a file format is left to the caller: anything serde can read
//! deserialises into a [`ScenarioConfig`]. Missing fields take the
//! documented defaults.

use crate::annealer::NotifierKind;
use crate::archive::{EvictionPolicy, DEFAULT_ARCHIVE_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One scenario: what to anneal, how, how often, and who watches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub name: String,
    pub run_number: u64,
    pub maximum_concurrent_runs: u64,
    /// Directory receiving JSON solutions; nothing is written when absent.
    pub output_path: Option<PathBuf>,
    pub annealer: AnnealerConfig,
    pub model: ModelConfig,
    pub observers: Vec<ObserverConfig>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "Default Scenario".to_string(),
            run_number: 1,
            maximum_concurrent_runs: 1,
            output_path: None,
            annealer: AnnealerConfig::default(),
            model: ModelConfig::default(),
            observers: Vec::new(),
        }
    }
}

/// Annealing parameters. `annealer_type` names the explorer family:
/// `"Kirkpatrick"`, `"Suppapitnarm"` or `"AveragedSuppapitnarm"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealerConfig {
    #[serde(rename = "type")]
    pub annealer_type: String,
    pub starting_temperature: f64,
    pub cooling_factor: f64,
    pub maximum_iterations: u64,
    pub notifier: NotifierKind,
    /// Seeds the explorer; each run clone forks its own stream from it.
    pub seed: Option<u64>,
    pub archive_size: usize,
    pub eviction: EvictionPolicy,
    pub tolerance: f64,
    pub return_to_base_step: u64,
}

impl Default for AnnealerConfig {
    fn default() -> Self {
        Self {
            annealer_type: "Kirkpatrick".to_string(),
            starting_temperature: 1.0,
            cooling_factor: 1.0,
            maximum_iterations: 0,
            notifier: NotifierKind::Synchronous,
            seed: None,
            archive_size: DEFAULT_ARCHIVE_SIZE,
            eviction: EvictionPolicy::default(),
            tolerance: 0.0,
            return_to_base_step: 0,
        }
    }
}

/// A registered model type and its numeric parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    #[serde(rename = "type")]
    pub model_type: String,
    pub parameters: BTreeMap<String, f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_type: "DumbModel".to_string(),
            parameters: BTreeMap::new(),
        }
    }
}

impl ModelConfig {
    pub fn new(model_type: impl Into<String>) -> Self {
        Self {
            model_type: model_type.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FilterConfig {
    PercentileOfIterations { percentile: f64 },
    IterationCount { modulo: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModulatorConfig {
    Iteration { modulo: u64 },
    ElapsedTime { seconds: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObserverConfig {
    Message {
        #[serde(default)]
        filter: Option<FilterConfig>,
        #[serde(default)]
        modulator: Option<ModulatorConfig>,
    },
    Attribute {
        #[serde(default)]
        filter: Option<FilterConfig>,
    },
    Invariant,
}
