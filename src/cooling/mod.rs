//! Cooling schedules ("coolants").
//!
//! A [`Coolant`] owns one control temperature and decides how it evolves.
//! The single-objective annealer cools geometrically; the multi-objective
//! explorer keeps one coolant per objective axis and may adapt each of them
//! to the deltas it actually observes.
//!
//! Every coolant keeps its temperature strictly positive: updates that would
//! reach zero (or fail to be finite) are clamped to [`MINIMUM_TEMPERATURE`].
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Suppapitnarm, Seffen, Parks & Clarkson (2000), "A Simulated Annealing
//!   Algorithm for Multiobjective Optimization"

mod adaptive;
mod geometric;

pub use adaptive::{AdaptiveCoolant, Smoothing};
pub use geometric::GeometricCoolant;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest temperature any coolant will report.
pub const MINIMUM_TEMPERATURE: f64 = 1e-12;

/// Produces the next control temperature from run history.
pub trait Coolant: Send + fmt::Debug {
    fn temperature(&self) -> f64;

    /// Rejects values `<= 0`.
    fn set_temperature(&mut self, temperature: f64) -> Result<()>;

    fn cooling_factor(&self) -> f64;

    /// Records the outcome of one trial on this coolant's axis.
    fn observe(&mut self, _delta: f64, _accepted: bool) {}

    /// Advances the schedule by one step.
    fn cool_down(&mut self);

    /// Metropolis acceptance probability at the current temperature.
    fn acceptance_probability(&self, delta: f64) -> f64 {
        metropolis_probability(delta, self.temperature())
    }

    fn clone_coolant(&self) -> Box<dyn Coolant>;
}

impl Clone for Box<dyn Coolant> {
    fn clone(&self) -> Self {
        self.clone_coolant()
    }
}

/// Selects a coolant implementation by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoolantKind {
    #[default]
    Geometric,
    Suppapitnarm,
    Averaged,
}

impl CoolantKind {
    pub fn build(self, temperature: f64, cooling_factor: f64) -> Result<Box<dyn Coolant>> {
        let coolant: Box<dyn Coolant> = match self {
            CoolantKind::Geometric => Box::new(GeometricCoolant::new(temperature, cooling_factor)?),
            CoolantKind::Suppapitnarm => {
                Box::new(AdaptiveCoolant::suppapitnarm(temperature, cooling_factor)?)
            }
            CoolantKind::Averaged => Box::new(AdaptiveCoolant::averaged(
                temperature,
                cooling_factor,
                adaptive::DEFAULT_WINDOW,
            )?),
        };
        Ok(coolant)
    }
}

/// `1` for desirable changes (`delta <= 0`), otherwise `exp(-delta / T)`.
///
/// # Examples
///
/// ```
/// use u_anneal::cooling::metropolis_probability;
///
/// assert_eq!(metropolis_probability(-3.0, 10.0), 1.0);
/// assert!((metropolis_probability(1.0, 1.0) - (-1.0f64).exp()).abs() < 1e-12);
/// ```
pub fn metropolis_probability(delta: f64, temperature: f64) -> f64 {
    if delta <= 0.0 {
        1.0
    } else {
        (-delta / temperature.max(MINIMUM_TEMPERATURE)).exp()
    }
}

/// Keeps a computed temperature strictly positive and finite.
pub fn clamp_temperature(temperature: f64) -> f64 {
    if temperature.is_nan() || temperature < MINIMUM_TEMPERATURE {
        MINIMUM_TEMPERATURE
    } else if temperature.is_infinite() {
        f64::MAX
    } else {
        temperature
    }
}

pub fn validate_temperature(temperature: f64) -> Result<()> {
    if temperature > 0.0 && temperature.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidTemperature(temperature))
    }
}

/// Cooling factors live in `(0, 1]`.
pub fn validate_cooling_factor(cooling_factor: f64) -> Result<()> {
    if cooling_factor > 0.0 && cooling_factor <= 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidCoolingFactor(cooling_factor))
    }
}
