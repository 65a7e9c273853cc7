//! Rudder angle to servo pulse width conversion

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use util::maths::{lin_map, saturate};

use super::EqptError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Linear map between rudder angle and servo pulse width.
///
/// `-max_angle_deg` maps to `min_pulse_us`, `+max_angle_deg` to
/// `max_pulse_us`, and zero to the midpoint.
#[derive(Debug, Clone, Copy)]
pub struct ServoMap {
    /// Units: microseconds
    pub min_pulse_us: f64,

    /// Units: microseconds
    pub max_pulse_us: f64,

    /// Units: degrees
    pub max_angle_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ServoMap {
    /// Create a new map, checking the ranges are usable.
    pub fn new(
        min_pulse_us: f64,
        max_pulse_us: f64,
        max_angle_deg: f64
    ) -> Result<Self, EqptError> {
        if !(min_pulse_us < max_pulse_us) {
            return Err(EqptError::ActuatorFault(format!(
                "servo pulse range is empty ({} to {} us)", min_pulse_us, max_pulse_us
            )));
        }
        if !(max_angle_deg > 0.0) {
            return Err(EqptError::ActuatorFault(format!(
                "servo max angle must be positive, found {}", max_angle_deg
            )));
        }

        Ok(Self { min_pulse_us, max_pulse_us, max_angle_deg })
    }

    /// Get the pulse width for a rudder angle. Angles beyond the servo's
    /// travel are saturated.
    ///
    /// Units: microseconds
    pub fn pulse_width_us(&self, angle_deg: f64) -> f64 {
        let (angle_deg, _) = saturate(angle_deg, -self.max_angle_deg, self.max_angle_deg);

        lin_map(
            (-self.max_angle_deg, self.max_angle_deg),
            (self.min_pulse_us, self.max_pulse_us),
            angle_deg
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pulse_width() {
        let map = ServoMap::new(1000.0, 2000.0, 45.0).unwrap();

        assert_eq!(map.pulse_width_us(0.0), 1500.0);
        assert_eq!(map.pulse_width_us(45.0), 2000.0);
        assert_eq!(map.pulse_width_us(-45.0), 1000.0);
        assert_eq!(map.pulse_width_us(22.5), 1750.0);

        // Saturated to the servo's travel
        assert_eq!(map.pulse_width_us(90.0), 2000.0);
        assert_eq!(map.pulse_width_us(-90.0), 1000.0);
    }

    #[test]
    fn test_invalid_map() {
        assert!(ServoMap::new(2000.0, 1000.0, 45.0).is_err());
        assert!(ServoMap::new(1000.0, 2000.0, 0.0).is_err());
        assert!(ServoMap::new(1000.0, 2000.0, f64::NAN).is_err());
    }
}
