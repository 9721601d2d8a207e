//! Error taxonomy for the annealing engine.
//!
//! Three classes of failure exist:
//!
//! - **Configuration/validation** errors, raised while building annealers,
//!   explorers and scenarios. Builders collect these into a single
//!   [`CompositeError`] so every problem is reported at once.
//! - **Runtime invariant violations** ([`Error::InvariantViolation`],
//!   [`Error::ArchiveViolation`]), which abort the run that raised them.
//! - **I/O and encoding** errors from persistence collaborators, always wrapped
//!   with the operation that failed.

use std::fmt;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid attempt to set annealer temperature to value <= 0 (got {0})")]
    InvalidTemperature(f64),

    #[error("cooling factor must be in (0, 1], got {0}")]
    InvalidCoolingFactor(f64),

    #[error("invalid parameter [{name}]: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("configuration specifies annealer type [{0}], but no annealers are registered for that type")]
    UnknownAnnealerType(String),

    #[error("configuration specifies model type [{0}], but no models are registered for that type")]
    UnknownModelType(String),

    #[error("decision variable [{name}] not defined for model [{model}]")]
    UnknownDecisionVariable { model: String, name: String },

    #[error("management action [{index}] not defined for model [{model}]")]
    UnknownManagementAction { model: String, index: usize },

    #[error("annealer [{id}] cannot anneal while {state}")]
    InvalidState { id: String, state: String },

    #[error("Id [{id}], Event [{event}]: loop invariant broken ({detail})")]
    InvariantViolation {
        id: String,
        event: String,
        detail: String,
    },

    #[error("archive dominance violated: {0}")]
    ArchiveViolation(String),

    #[error("annealing function failed: {0}")]
    Fault(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("json marshaling of [{id}]: {source}")]
    Json {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("runner failure: {0}")]
    Runner(String),

    #[error("cpu profiler: {0}")]
    Profiler(#[from] pprof::Error),

    #[error(transparent)]
    Composite(#[from] CompositeError),
}

impl Error {
    /// Wraps an I/O error with the operation that produced it.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns true for failures that must terminate the run loudly.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvariantViolation { .. } | Error::ArchiveViolation(_) | Error::Fault(_)
        )
    }
}

/// An accumulating collection of errors, reported as one.
///
/// Builders add to a composite as they go and only surface it at the end,
/// so a caller sees every configuration problem in a single pass.
#[derive(Debug, Default)]
pub struct CompositeError {
    context: String,
    errors: Vec<Error>,
}

impl CompositeError {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            errors: Vec::new(),
        }
    }

    pub fn add(&mut self, error: Error) {
        self.errors.push(error);
    }

    /// Records the error half of `result`, returning the success value if any.
    pub fn capture<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.add(error);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// `Ok(())` when nothing was collected, otherwise the composite itself.
    pub fn into_result(self) -> Result<(), CompositeError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for CompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} error(s))", self.context, self.errors.len())?;
        for (index, error) in self.errors.iter().enumerate() {
            write!(f, "\n  {}. {}", index + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompositeError {}
