//! Simulated boat
//!
//! Stands in for both the compass and the rudder servo when no hardware is
//! attached. The yaw model is deliberately simple: the boat turns at a rate
//! proportional to the rudder deflection, positive rudder turning clockwise.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;

use super::{EqptError, HeadingSource, RudderActuator, ServoMap};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// One full turn of the compass.
///
/// Units: degrees
const FULL_TURN_DEG: f64 = 360.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimBoat {
    /// Compass heading in [0, 360).
    ///
    /// Units: degrees
    heading_deg: f64,

    /// Current rudder deflection.
    ///
    /// Units: degrees
    rudder_deg: f64,

    /// Yaw rate produced per degree of rudder.
    ///
    /// Units: (degrees/second)/degree
    turn_rate_per_rudder_deg_s: f64,

    /// Time the boat is advanced by for each rudder demand.
    ///
    /// Units: seconds
    step_s: f64,

    servo_map: ServoMap,

    /// Pulse width of the last demand sent to the servo.
    ///
    /// Units: microseconds
    last_pulse_us: Option<f64>,

    /// Number of upcoming compass reads that will fail.
    pending_dropouts: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimBoat {
    pub fn new(
        initial_heading_deg: f64,
        turn_rate_per_rudder_deg_s: f64,
        step_s: f64,
        servo_map: ServoMap
    ) -> Self {
        Self {
            heading_deg: initial_heading_deg.rem_euclid(FULL_TURN_DEG),
            rudder_deg: 0.0,
            turn_rate_per_rudder_deg_s,
            step_s,
            servo_map,
            last_pulse_us: None,
            pending_dropouts: 0,
        }
    }

    /// True heading of the boat, ignoring any simulated sensor dropouts.
    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    pub fn rudder_deg(&self) -> f64 {
        self.rudder_deg
    }

    pub fn last_pulse_us(&self) -> Option<f64> {
        self.last_pulse_us
    }

    /// Make the next `num_reads` compass reads fail with `SensorNotReady`.
    pub fn inject_dropouts(&mut self, num_reads: u32) {
        self.pending_dropouts += num_reads;
    }
}

impl HeadingSource for SimBoat {
    fn read_heading_deg(&mut self) -> Result<f64, EqptError> {
        if self.pending_dropouts > 0 {
            self.pending_dropouts -= 1;
            return Err(EqptError::SensorNotReady);
        }

        Ok(self.heading_deg)
    }
}

impl RudderActuator for SimBoat {
    /// Apply the demand and advance the boat by one step.
    fn set_rudder_angle_deg(&mut self, angle_deg: f64) -> Result<(), EqptError> {
        if !angle_deg.is_finite() {
            return Err(EqptError::ActuatorFault(format!(
                "non-finite rudder demand {}", angle_deg
            )));
        }

        let pulse_us = self.servo_map.pulse_width_us(angle_deg);
        self.last_pulse_us = Some(pulse_us);
        self.rudder_deg = angle_deg;

        self.heading_deg = (
            self.heading_deg
            + self.turn_rate_per_rudder_deg_s * self.rudder_deg * self.step_s
        ).rem_euclid(FULL_TURN_DEG);

        trace!(
            "SimBoat: rudder {:.3} deg ({:.1} us), heading now {:.3} deg",
            self.rudder_deg, pulse_us, self.heading_deg
        );

        Ok(())
    }
}
