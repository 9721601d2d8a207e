//! The iterate-evaluate-cool loop.

use super::{Annealer, AnnealerState};
use crate::cooling::{Coolant, CoolantKind, GeometricCoolant};
use crate::error::{Error, Result};
use crate::explorer::{Explorer, NullExplorer};
use crate::observer::{
    Event, EventNotifier, EventType, Observer, SynchronousNotifier, ACCEPTANCE_PROBABILITY,
    CHANGE_ACCEPTED, CHANGE_IN_OBJECTIVE_VALUE, CHANGE_IS_DESIRABLE, COOLING_FACTOR,
    CURRENT_ITERATION, MAXIMUM_ITERATIONS, OBJECTIVE_VALUE, TEMPERATURE,
};
use crate::solution::Solution;
use std::sync::Arc;

const DEFAULT_ID: &str = "Simple Annealer";

/// Single-temperature annealer.
///
/// Defaults: temperature 1, cooling factor 1, zero iterations, a
/// [`NullExplorer`] and a [`SynchronousNotifier`] with no observers.
///
/// # Examples
///
/// ```
/// use u_anneal::annealer::{Annealer, SimpleAnnealer};
/// use u_anneal::explorer::KirkpatrickExplorer;
/// use u_anneal::model::{DumbModel, OBJECTIVE_VALUE};
///
/// let explorer = KirkpatrickExplorer::new(Box::new(DumbModel::new())).with_seed(7);
/// let mut annealer = SimpleAnnealer::new()
///     .with_maximum_iterations(500)
///     .with_explorer(Box::new(explorer));
/// annealer.set_temperature(10.0).unwrap();
/// annealer.set_cooling_factor(0.99).unwrap();
///
/// let solution = annealer.anneal().unwrap();
/// assert_eq!(annealer.current_iteration(), 500);
/// assert!(solution.decision_variable(OBJECTIVE_VALUE).unwrap() < 1000.0);
/// ```
#[derive(Clone)]
pub struct SimpleAnnealer {
    id: String,
    coolant_kind: CoolantKind,
    coolant: Box<dyn Coolant>,
    maximum_iterations: u64,
    current_iteration: u64,
    explorer: Box<dyn Explorer>,
    notifier: Box<dyn EventNotifier>,
    state: AnnealerState,
    solution: Option<Solution>,
}

impl SimpleAnnealer {
    pub fn new() -> Self {
        let mut explorer = NullExplorer::default();
        explorer.set_id(DEFAULT_ID);
        Self {
            id: DEFAULT_ID.to_string(),
            coolant_kind: CoolantKind::Geometric,
            coolant: Box::new(GeometricCoolant::default()),
            maximum_iterations: 0,
            current_iteration: 0,
            explorer: Box::new(explorer),
            notifier: Box::new(SynchronousNotifier::new()),
            state: AnnealerState::Ready,
            solution: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.set_id(&id);
        self
    }

    pub fn with_maximum_iterations(mut self, maximum_iterations: u64) -> Self {
        self.maximum_iterations = maximum_iterations;
        self
    }

    /// Installs `explorer`, renaming it after this annealer.
    pub fn with_explorer(mut self, mut explorer: Box<dyn Explorer>) -> Self {
        explorer.set_id(&self.id);
        self.explorer = explorer;
        self
    }

    /// Replaces the notifier; observers registered so far move across.
    pub fn with_notifier(mut self, mut notifier: Box<dyn EventNotifier>) -> Self {
        for observer in self.notifier.observers() {
            notifier.add_observer(Arc::clone(observer));
        }
        self.notifier = notifier;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.notifier.add_observer(observer);
        self
    }

    /// Rejects factors outside `(0, 1]`.
    pub fn set_cooling_factor(&mut self, cooling_factor: f64) -> Result<()> {
        self.coolant = self
            .coolant_kind
            .build(self.coolant.temperature(), cooling_factor)?;
        Ok(())
    }

    /// Switches the temperature schedule, keeping temperature and factor.
    pub fn set_coolant_kind(&mut self, kind: CoolantKind) -> Result<()> {
        self.coolant = kind.build(self.coolant.temperature(), self.coolant.cooling_factor())?;
        self.coolant_kind = kind;
        Ok(())
    }

    pub fn coolant_kind(&self) -> CoolantKind {
        self.coolant_kind
    }

    pub(crate) fn publish(&mut self, event: Event) -> Result<()> {
        self.notifier.notify(event)
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        self.notifier.flush()
    }

    fn event(&self, event_type: EventType) -> Event {
        Event::new(event_type, self.id.as_str())
    }

    fn started_annealing(&self) -> Event {
        self.event(EventType::StartedAnnealing)
            .with_attribute(MAXIMUM_ITERATIONS, self.maximum_iterations)
            .with_attribute(OBJECTIVE_VALUE, self.explorer.objective_value())
            .with_attribute(TEMPERATURE, self.coolant.temperature())
            .with_attribute(COOLING_FACTOR, self.coolant.cooling_factor())
    }

    fn started_iteration(&self) -> Event {
        self.event(EventType::StartedIteration)
            .with_attribute(CURRENT_ITERATION, self.current_iteration)
            .with_attribute(MAXIMUM_ITERATIONS, self.maximum_iterations)
            .with_attribute(OBJECTIVE_VALUE, self.explorer.objective_value())
            .with_attribute(TEMPERATURE, self.coolant.temperature())
    }

    fn finished_iteration(&self) -> Event {
        let explorer = self.explorer.as_ref();
        self.event(EventType::FinishedIteration)
            .with_attribute(CURRENT_ITERATION, self.current_iteration)
            .with_attribute(MAXIMUM_ITERATIONS, self.maximum_iterations)
            .with_attribute(OBJECTIVE_VALUE, explorer.objective_value())
            .with_attribute(CHANGE_IN_OBJECTIVE_VALUE, explorer.change_in_objective_value())
            .with_attribute(CHANGE_IS_DESIRABLE, explorer.change_is_desirable())
            .with_attribute(ACCEPTANCE_PROBABILITY, explorer.acceptance_probability())
            .with_attribute(CHANGE_ACCEPTED, explorer.change_accepted())
            .with_attributes(explorer.iteration_attributes())
    }

    fn finished_annealing(&self) -> Event {
        self.event(EventType::FinishedAnnealing)
            .with_attribute(CURRENT_ITERATION, self.current_iteration)
            .with_attribute(MAXIMUM_ITERATIONS, self.maximum_iterations)
            .with_attribute(OBJECTIVE_VALUE, self.explorer.objective_value())
            .with_attribute(TEMPERATURE, self.coolant.temperature())
    }

    fn cool_down(&mut self) {
        self.coolant.observe(
            self.explorer.change_in_objective_value(),
            self.explorer.change_accepted(),
        );
        self.coolant.cool_down();
    }

    fn run_schedule(&mut self) -> Result<Solution> {
        let started = self.started_annealing();
        self.publish(started)?;

        while self.current_iteration < self.maximum_iterations {
            self.current_iteration += 1;
            let started = self.started_iteration();
            self.publish(started)?;

            self.explorer.try_random_change(self.coolant.temperature())?;

            let finished = self.finished_iteration();
            self.publish(finished)?;
            self.cool_down();
        }

        let solution = Solution::from_model(self.id.as_str(), self.explorer.model());
        let finished = self.finished_annealing();
        self.publish(finished)?;
        Ok(solution)
    }
}

impl Default for SimpleAnnealer {
    fn default() -> Self {
        Self::new()
    }
}

impl Annealer for SimpleAnnealer {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
        self.explorer.set_id(id);
    }

    fn state(&self) -> AnnealerState {
        self.state
    }

    fn temperature(&self) -> f64 {
        self.coolant.temperature()
    }

    fn set_temperature(&mut self, temperature: f64) -> Result<()> {
        self.coolant.set_temperature(temperature)
    }

    fn cooling_factor(&self) -> f64 {
        self.coolant.cooling_factor()
    }

    fn maximum_iterations(&self) -> u64 {
        self.maximum_iterations
    }

    fn current_iteration(&self) -> u64 {
        self.current_iteration
    }

    fn explorer(&self) -> &dyn Explorer {
        self.explorer.as_ref()
    }

    fn add_observer(&mut self, observer: Arc<dyn Observer>) {
        self.notifier.add_observer(observer);
    }

    fn observers(&self) -> &[Arc<dyn Observer>] {
        self.notifier.observers()
    }

    fn anneal(&mut self) -> Result<Solution> {
        if self.state != AnnealerState::Ready {
            return Err(Error::InvalidState {
                id: self.id.clone(),
                state: self.state.to_string(),
            });
        }
        self.state = AnnealerState::Running;
        self.current_iteration = 0;

        let outcome = self
            .explorer
            .initialise()
            .and_then(|()| self.run_schedule());
        let torn_down = self.explorer.tear_down();
        let flushed = self.notifier.flush();
        self.state = AnnealerState::Finished;

        let solution = outcome?;
        torn_down?;
        flushed?;
        self.solution = Some(solution.clone());
        Ok(solution)
    }

    fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    fn clone_annealer(&self) -> Box<dyn Annealer> {
        Box::new(self.clone())
    }
}
