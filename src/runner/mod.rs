//! Concurrent execution of independent annealing runs.
//!
//! A [`ScenarioRunner`] clones its prototype annealer once per run and
//! anneals up to `maximum_concurrent_runs` clones at a time on a dedicated
//! rayon pool. Clones never share models or explorers; observers are shared
//! and told apart by the clone id, `"<name> (<k>/<R>)"` when `R > 1`.
//!
//! Decorators in [`decorators`] wrap any [`CallableRunner`].

pub mod decorators;

pub use decorators::{ExclusiveRunner, ProfilingRunner};

use crate::annealer::{anneal_guarded, Annealer};
use crate::error::{CompositeError, Error, Result};
use crate::solution::{ArchiveSummary, Encoder, Solution};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

const DEFAULT_NAME: &str = "Default Scenario";

/// What one successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub id: String,
    pub solution: Solution,
    /// Present when the run's explorer keeps an archive.
    pub archive_summary: Option<ArchiveSummary>,
}

/// Anything that runs a scenario to completion.
pub trait CallableRunner: Send {
    fn name(&self) -> &str;

    /// Blocks until every run has finished.
    fn run(&mut self) -> Result<Vec<RunOutcome>>;
}

/// The parts of a scenario each worker thread reads.
struct RunPlan {
    name: String,
    run_number: u64,
    encoder: Option<Arc<dyn Encoder + Send + Sync>>,
}

impl RunPlan {
    fn clone_id(&self, run: u64) -> String {
        if self.run_number > 1 {
            format!("{} ({}/{})", self.name, run, self.run_number)
        } else {
            self.name.clone()
        }
    }

    fn execute(&self, run: u64, mut annealer: Box<dyn Annealer>) -> Result<RunOutcome> {
        let id = self.clone_id(run);
        annealer.set_id(&id);

        if self.run_number > 1 {
            info!("{id}: run started");
        }
        let result = anneal_guarded(annealer.as_mut());
        if self.run_number > 1 {
            info!("{id}: run finished");
        }

        let solution = result?;
        let archive_summary = annealer.archive_summary();
        if let Some(encoder) = &self.encoder {
            encoder.encode_solution(&solution)?;
            if let Some(summary) = &archive_summary {
                encoder.encode_summary(summary)?;
            }
        }
        Ok(RunOutcome {
            id,
            solution,
            archive_summary,
        })
    }
}

/// Runs `run_number` clones of an annealer, at most
/// `maximum_concurrent_runs` at once.
///
/// Defaults: one run, sequential, named `"Default Scenario"`, no tear-down.
/// Setters ignore zero counts and empty names.
///
/// # Examples
///
/// ```
/// use u_anneal::annealer::SimpleAnnealer;
/// use u_anneal::explorer::KirkpatrickExplorer;
/// use u_anneal::model::DumbModel;
/// use u_anneal::runner::{CallableRunner, ScenarioRunner};
///
/// let annealer = SimpleAnnealer::new()
///     .with_maximum_iterations(100)
///     .with_explorer(Box::new(KirkpatrickExplorer::new(Box::new(DumbModel::new()))));
///
/// let mut runner = ScenarioRunner::new(Box::new(annealer))
///     .with_name("Doc")
///     .with_run_number(3)
///     .with_maximum_concurrent_runs(2);
/// let outcomes = runner.run().unwrap();
/// assert_eq!(outcomes[2].id, "Doc (3/3)");
/// ```
pub struct ScenarioRunner {
    annealer: Box<dyn Annealer>,
    name: String,
    run_number: u64,
    maximum_concurrent_runs: u64,
    tear_down: Box<dyn FnMut() + Send>,
    encoder: Option<Arc<dyn Encoder + Send + Sync>>,
    elapsed: Option<Duration>,
}

impl ScenarioRunner {
    pub fn new(annealer: Box<dyn Annealer>) -> Self {
        Self {
            annealer,
            name: DEFAULT_NAME.to_string(),
            run_number: 1,
            maximum_concurrent_runs: 1,
            tear_down: Box::new(|| {}),
            encoder: None,
            elapsed: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            self.name = name;
        }
        self
    }

    pub fn with_run_number(mut self, run_number: u64) -> Self {
        if run_number > 0 {
            self.run_number = run_number;
        }
        self
    }

    pub fn with_maximum_concurrent_runs(mut self, maximum_concurrent_runs: u64) -> Self {
        if maximum_concurrent_runs > 0 {
            self.maximum_concurrent_runs = maximum_concurrent_runs;
        }
        self
    }

    /// Called once after every run has finished, whatever the outcome.
    pub fn with_tear_down(mut self, tear_down: impl FnMut() + Send + 'static) -> Self {
        self.tear_down = Box::new(tear_down);
        self
    }

    /// Writes each run's solution (and archive summary) as it finishes.
    pub fn with_encoder(mut self, encoder: Arc<dyn Encoder + Send + Sync>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn run_number(&self) -> u64 {
        self.run_number
    }

    pub fn maximum_concurrent_runs(&self) -> u64 {
        self.maximum_concurrent_runs
    }

    pub fn annealer(&self) -> &dyn Annealer {
        self.annealer.as_ref()
    }

    /// Wall-clock time of the last completed `run`.
    pub fn elapsed_time(&self) -> Option<Duration> {
        self.elapsed
    }

    fn log_start(&self) {
        let mode = if self.maximum_concurrent_runs > 1 {
            format!(
                "executing a maximum of {} runs concurrently.",
                self.maximum_concurrent_runs
            )
        } else {
            "executing runs sequentially".to_string()
        };
        info!(
            "Scenario \"{}\": configured for {} run(s), {}",
            self.name, self.run_number, mode
        );
    }

    fn run_scenario(&self) -> Result<Vec<RunOutcome>> {
        let plan = RunPlan {
            name: self.name.clone(),
            run_number: self.run_number,
            encoder: self.encoder.clone(),
        };
        // Forking advances the prototype's generator; rewind it so every
        // invocation of `run` starts from the same streams.
        let rng_state = self.annealer.explorer().rng().map(|rng| rng.snapshot());
        let clones: Vec<(u64, Box<dyn Annealer>)> = (1..=self.run_number)
            .map(|run| (run, self.annealer.clone_annealer()))
            .collect();
        if let (Some(rng), Some(state)) = (self.annealer.explorer().rng(), rng_state) {
            rng.restore(state);
        }

        let threads = self.maximum_concurrent_runs.min(self.run_number);
        let pool = ThreadPoolBuilder::new()
            .num_threads(usize::try_from(threads).unwrap_or(usize::MAX))
            .thread_name(|index| format!("anneal-run-{index}"))
            .build()
            .map_err(|e| Error::Runner(format!("building run pool: {e}")))?;

        let results: Vec<Result<RunOutcome>> = pool.install(|| {
            clones
                .into_par_iter()
                .map(|(run, annealer)| plan.execute(run, annealer))
                .collect()
        });

        let mut outcomes = Vec::with_capacity(results.len());
        let mut failures = CompositeError::new(format!("Scenario \"{}\": runs failed", self.name));
        for result in results {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!(scenario = %self.name, error = %e, "run failed");
                    failures.add(e);
                }
            }
        }
        failures.into_result()?;
        Ok(outcomes)
    }
}

impl CallableRunner for ScenarioRunner {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self) -> Result<Vec<RunOutcome>> {
        self.log_start();
        let start = Instant::now();

        let result = self.run_scenario();

        let elapsed = start.elapsed();
        self.elapsed = Some(elapsed);
        info!("Finished running scenario \"{}\"", self.name);
        info!("Total elapsed time of scenario = [{elapsed:?}]");

        (self.tear_down)();
        result
    }
}
