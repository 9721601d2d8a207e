use super::{clamp_temperature, validate_cooling_factor, validate_temperature, Coolant};
use crate::error::{Error, Result};
use std::collections::VecDeque;

/// Number of accepted deltas the averaged schedule remembers.
pub const DEFAULT_WINDOW: usize = 100;

const DEFAULT_TARGET_ACCEPTANCE: f64 = 0.5;

/// Which observed delta drives the temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Smoothing {
    /// The most recent accepted change.
    MostRecent,
    /// Mean of the last `window` accepted changes.
    Averaged { window: usize },
}

/// Temperature recomputed from the magnitude of accepted changes.
///
/// Each step decays an internal scale by the cooling factor. Once at least
/// one non-zero change has been accepted, the temperature becomes
///
/// ```text
/// T = scale * |delta_ref| / ln(1 / p_target)
/// ```
///
/// so that a change of typical size would be accepted with roughly
/// `p_target * scale` odds. Until then the coolant behaves geometrically.
#[derive(Debug, Clone)]
pub struct AdaptiveCoolant {
    temperature: f64,
    cooling_factor: f64,
    scale: f64,
    target_acceptance: f64,
    smoothing: Smoothing,
    history: VecDeque<f64>,
}

impl AdaptiveCoolant {
    pub fn new(temperature: f64, cooling_factor: f64, smoothing: Smoothing) -> Result<Self> {
        validate_temperature(temperature)?;
        validate_cooling_factor(cooling_factor)?;
        if let Smoothing::Averaged { window: 0 } = smoothing {
            return Err(Error::InvalidParameter {
                name: "window".into(),
                reason: "averaging window must be positive".into(),
            });
        }
        Ok(Self {
            temperature,
            cooling_factor,
            scale: 1.0,
            target_acceptance: DEFAULT_TARGET_ACCEPTANCE,
            smoothing,
            history: VecDeque::new(),
        })
    }

    /// Driven by the most recent accepted change.
    pub fn suppapitnarm(temperature: f64, cooling_factor: f64) -> Result<Self> {
        Self::new(temperature, cooling_factor, Smoothing::MostRecent)
    }

    /// Driven by the mean of the last `window` accepted changes.
    pub fn averaged(temperature: f64, cooling_factor: f64, window: usize) -> Result<Self> {
        Self::new(temperature, cooling_factor, Smoothing::Averaged { window })
    }

    /// Sets the acceptance odds aimed for at unit scale. Must be in `(0, 1)`.
    pub fn with_target_acceptance(mut self, probability: f64) -> Result<Self> {
        if probability.is_nan() || probability <= 0.0 || probability >= 1.0 {
            return Err(Error::InvalidParameter {
                name: "target_acceptance".into(),
                reason: format!("must be in (0, 1), got {probability}"),
            });
        }
        self.target_acceptance = probability;
        Ok(self)
    }

    pub fn smoothing(&self) -> Smoothing {
        self.smoothing
    }

    fn reference_delta(&self) -> Option<f64> {
        match self.smoothing {
            Smoothing::MostRecent => self.history.back().copied(),
            Smoothing::Averaged { .. } if self.history.is_empty() => None,
            Smoothing::Averaged { .. } => {
                Some(self.history.iter().sum::<f64>() / self.history.len() as f64)
            }
        }
    }
}

impl Coolant for AdaptiveCoolant {
    fn temperature(&self) -> f64 {
        self.temperature
    }

    fn set_temperature(&mut self, temperature: f64) -> Result<()> {
        validate_temperature(temperature)?;
        self.temperature = temperature;
        Ok(())
    }

    fn cooling_factor(&self) -> f64 {
        self.cooling_factor
    }

    fn observe(&mut self, delta: f64, accepted: bool) {
        if !accepted || delta == 0.0 || !delta.is_finite() {
            return;
        }
        let capacity = match self.smoothing {
            Smoothing::MostRecent => 1,
            Smoothing::Averaged { window } => window,
        };
        if self.history.len() == capacity {
            self.history.pop_front();
        }
        self.history.push_back(delta.abs());
    }

    fn cool_down(&mut self) {
        self.scale *= self.cooling_factor;
        self.temperature = match self.reference_delta() {
            Some(reference) => {
                clamp_temperature(self.scale * reference / (1.0 / self.target_acceptance).ln())
            }
            None => clamp_temperature(self.temperature * self.cooling_factor),
        };
    }

    fn clone_coolant(&self) -> Box<dyn Coolant> {
        Box::new(self.clone())
    }
}
