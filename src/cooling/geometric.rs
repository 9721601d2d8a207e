use super::{clamp_temperature, validate_cooling_factor, validate_temperature, Coolant};
use crate::error::Result;

/// Geometric (exponential) cooling: `T_{k+1} = alpha * T_k`.
///
/// A cooling factor of `1` holds the temperature constant.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometricCoolant {
    temperature: f64,
    cooling_factor: f64,
}

impl GeometricCoolant {
    pub fn new(temperature: f64, cooling_factor: f64) -> Result<Self> {
        validate_temperature(temperature)?;
        validate_cooling_factor(cooling_factor)?;
        Ok(Self {
            temperature,
            cooling_factor,
        })
    }
}

/// Temperature 1, held constant.
impl Default for GeometricCoolant {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            cooling_factor: 1.0,
        }
    }
}

impl Coolant for GeometricCoolant {
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

    fn cool_down(&mut self) {
        self.temperature = clamp_temperature(self.temperature * self.cooling_factor);
    }

    fn clone_coolant(&self) -> Box<dyn Coolant> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooling::MINIMUM_TEMPERATURE;

    #[test]
    fn test_geometric_decay() {
        let mut coolant = GeometricCoolant::new(100.0, 0.5).unwrap();
        coolant.cool_down();
        assert_eq!(coolant.temperature(), 50.0);
        coolant.cool_down();
        assert_eq!(coolant.temperature(), 25.0);
    }

    #[test]
    fn test_unit_factor_holds_temperature() {
        let mut coolant = GeometricCoolant::new(3.0, 1.0).unwrap();
        for _ in 0..10 {
            coolant.cool_down();
        }
        assert_eq!(coolant.temperature(), 3.0);
    }

    #[test]
    fn test_never_reaches_zero() {
        let mut coolant = GeometricCoolant::new(1.0, 1e-3).unwrap();
        for _ in 0..100 {
            coolant.cool_down();
        }
        assert_eq!(coolant.temperature(), MINIMUM_TEMPERATURE);
    }

    #[test]
    fn test_set_temperature_rejects_non_positive() {
        let mut coolant = GeometricCoolant::new(1.0, 0.9).unwrap();
        assert!(coolant.set_temperature(0.0).is_err());
        assert_eq!(coolant.temperature(), 1.0);
        coolant.set_temperature(7.0).unwrap();
        assert_eq!(coolant.temperature(), 7.0);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(GeometricCoolant::new(0.0, 0.9).is_err());
        assert!(GeometricCoolant::new(1.0, 0.0).is_err());
    }
}
