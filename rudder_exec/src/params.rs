//! # Rudder Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug)]
pub struct RudderExecParams {

    /// Number of cycles to run before exiting, zero to run until killed
    pub num_cycles: u64,

    /// Write RudderCtrl archives into the session directory
    pub archive: bool,

    /// The constant course given to the controller
    ///
    /// Units: degrees
    pub desired_path_deg: f64,

    /// Heading the simulated boat starts on
    ///
    /// Units: degrees
    pub initial_heading_deg: f64,

    /// Yaw rate of the simulated boat per degree of rudder
    ///
    /// Units: (degrees/second)/degree
    pub turn_rate_per_rudder_deg_s: f64,

    /// Servo pulse width at full negative deflection
    ///
    /// Units: microseconds
    pub servo_min_pulse_us: f64,

    /// Servo pulse width at full positive deflection
    ///
    /// Units: microseconds
    pub servo_max_pulse_us: f64,

    /// Servo deflection at the extreme pulse widths
    ///
    /// Units: degrees
    pub servo_max_angle_deg: f64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_params() {
        let p: RudderExecParams = util::params::from_str(
            include_str!("../../params/rudder_exec.toml")
        ).unwrap();

        assert_eq!(p.num_cycles, 300);
        assert!(p.archive);
        assert_eq!(p.desired_path_deg, 90.0);
        assert!(p.servo_min_pulse_us < p.servo_max_pulse_us);
    }
}
