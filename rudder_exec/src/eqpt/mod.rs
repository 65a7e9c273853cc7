//! # Equipment module
//!
//! Interfaces to the equipment surrounding the rudder controller: the compass
//! supplying the heading, the navigation supplying the desired path, and the
//! rudder servo executing the demand. The controller never talks to these
//! directly, the executable's main loop moves data between them.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Conversion from rudder angles to servo pulse widths.
pub mod servo_map;

/// Simulated boat used in place of the compass and rudder servo.
pub mod sim_boat;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use servo_map::ServoMap;
pub use sim_boat::SimBoat;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Source of the boat's measured heading, usually a compass.
pub trait HeadingSource {
    /// Read the current heading.
    ///
    /// Units: degrees
    fn read_heading_deg(&mut self) -> Result<f64, EqptError>;
}

/// Source of the course the boat should be steering.
pub trait PathSource {
    /// Get the current desired path.
    ///
    /// Units: degrees
    fn desired_path_deg(&mut self) -> Result<f64, EqptError>;
}

/// Actuator moving the rudder.
pub trait RudderActuator {
    /// Command the rudder to the given angle.
    ///
    /// Units: degrees
    fn set_rudder_angle_deg(&mut self, angle_deg: f64) -> Result<(), EqptError>;
}

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// A path source which always demands the same course.
#[derive(Debug, Clone, Copy)]
pub struct FixedPath {
    /// Units: degrees
    pub desired_path_deg: f64,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum EqptError {
    #[error("No new sensor data is available")]
    SensorNotReady,

    #[error("The sensor returned an invalid reading: {0}")]
    InvalidReading(f64),

    #[error("The actuator rejected the demand: {0}")]
    ActuatorFault(String),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl PathSource for FixedPath {
    fn desired_path_deg(&mut self) -> Result<f64, EqptError> {
        Ok(self.desired_path_deg)
    }
}
