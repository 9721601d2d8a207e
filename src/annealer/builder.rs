use super::{Annealer, ElapsedTimeTrackingAnnealer, SimpleAnnealer};
use crate::cooling::CoolantKind;
use crate::error::{CompositeError, Error};
use crate::explorer::Explorer;
use crate::observer::{AsynchronousNotifier, EventNotifier, Observer, SynchronousNotifier};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which annealer a builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnnealerKind {
    Simple,
    #[default]
    ElapsedTimeTracking,
}

impl AnnealerKind {
    fn failure_context(self) -> &'static str {
        match self {
            AnnealerKind::Simple => "Failed to build valid simple annealer",
            AnnealerKind::ElapsedTimeTracking => {
                "Failed to build valid elapsed-timed tracking annealer"
            }
        }
    }
}

/// How events reach observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NotifierKind {
    #[default]
    Synchronous,
    Asynchronous,
}

impl NotifierKind {
    pub fn build(self) -> Box<dyn EventNotifier> {
        match self {
            NotifierKind::Synchronous => Box::new(SynchronousNotifier::new()),
            NotifierKind::Asynchronous => Box::new(AsynchronousNotifier::new()),
        }
    }
}

/// Assembles an annealer, collecting every invalid setting.
///
/// Setters never fail; problems accumulate and [`build`](Self::build)
/// reports all of them in one [`CompositeError`].
///
/// # Examples
///
/// ```
/// use u_anneal::annealer::{AnnealerBuilder, AnnealerKind};
///
/// let error = AnnealerBuilder::new(AnnealerKind::Simple)
///     .with_starting_temperature(-1.0)
///     .with_cooling_factor(2.0)
///     .build()
///     .err()
///     .unwrap();
/// assert_eq!(error.len(), 2);
/// ```
pub struct AnnealerBuilder {
    kind: AnnealerKind,
    annealer: SimpleAnnealer,
    id: Option<String>,
    notifier: NotifierKind,
    observers: Vec<Arc<dyn Observer>>,
    errors: CompositeError,
}

impl AnnealerBuilder {
    pub fn new(kind: AnnealerKind) -> Self {
        Self {
            kind,
            annealer: SimpleAnnealer::new(),
            id: None,
            notifier: NotifierKind::default(),
            observers: Vec::new(),
            errors: CompositeError::new(kind.failure_context()),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_starting_temperature(mut self, temperature: f64) -> Self {
        let result = self.annealer.set_temperature(temperature);
        self.errors.capture(result);
        self
    }

    pub fn with_cooling_factor(mut self, cooling_factor: f64) -> Self {
        let result = self.annealer.set_cooling_factor(cooling_factor);
        self.errors.capture(result);
        self
    }

    pub fn with_coolant(mut self, kind: CoolantKind) -> Self {
        let result = self.annealer.set_coolant_kind(kind);
        self.errors.capture(result);
        self
    }

    pub fn with_maximum_iterations(mut self, maximum_iterations: u64) -> Self {
        self.annealer = self.annealer.with_maximum_iterations(maximum_iterations);
        self
    }

    pub fn with_explorer(mut self, explorer: Box<dyn Explorer>) -> Self {
        self.annealer = self.annealer.with_explorer(explorer);
        self
    }

    pub fn with_notifier(mut self, notifier: NotifierKind) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn with_observers<I>(mut self, observers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Observer>>,
    {
        self.observers.extend(observers);
        self
    }

    /// Records a problem found outside the builder, e.g. while preparing
    /// the explorer.
    pub fn with_error(mut self, error: Error) -> Self {
        self.errors.add(error);
        self
    }

    pub fn build(self) -> Result<Box<dyn Annealer>, CompositeError> {
        let kind = self.kind;
        let annealer = self.build_simple()?;
        Ok(match kind {
            AnnealerKind::Simple => Box::new(annealer),
            AnnealerKind::ElapsedTimeTracking => Box::new(ElapsedTimeTrackingAnnealer::new(annealer)),
        })
    }

    /// The configured loop without any decoration.
    pub fn build_simple(self) -> Result<SimpleAnnealer, CompositeError> {
        self.errors.into_result()?;

        let mut annealer = self.annealer.with_notifier(self.notifier.build());
        for observer in self.observers {
            annealer.add_observer(observer);
        }
        if let Some(id) = self.id {
            annealer.set_id(&id);
        }
        Ok(annealer)
    }
}

impl Default for AnnealerBuilder {
    fn default() -> Self {
        Self::new(AnnealerKind::default())
    }
}
