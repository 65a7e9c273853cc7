//! # Rudder control module
//!
//! Converts a desired path and a measured compass heading into a rudder angle
//! demand using a PI control law.
//!
//! The law runs once per sample interval:
//!
//! 1. Normalise the desired path and the heading error into (-180, 180].
//! 2. Compute the proportional term and accumulate the integral term from the
//!    same error.
//! 3. Map the combined control action onto the rudder range. The map is
//!    centred on half of the maximum deflection and swings towards the
//!    maximum (clockwise error) or the minimum (otherwise).
//! 4. Saturate to the rudder limits.
//!
//! The integral accumulator is never reset or limited, sustained error will
//! wind it up without bound while the output sits on a limit.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;
use util::{archive::ArchiveError, params::LoadError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Half a turn, the largest magnitude a normalised heading error can have.
///
/// Units: degrees
pub const HALF_TURN_DEG: f64 = 180.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during RudderCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum RudderCtrlError {
    #[error("RudderCtrl has not been initialised")]
    NotInitialised,

    #[error(
        "Received a non-finite input (desired path: {desired_path_deg} deg, \
        heading: {heading_deg} deg)"
    )]
    NonFiniteInput {
        desired_path_deg: f64,
        heading_deg: f64
    },

    #[error(
        "The control law overflowed for desired path {desired_path_deg} deg and \
        heading {heading_deg} deg"
    )]
    NonFiniteResult {
        desired_path_deg: f64,
        heading_deg: f64
    },

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Could not load the parameters: {0}")]
    ParamLoad(#[from] LoadError),

    #[error("Could not set up the archives: {0}")]
    Archive(#[from] ArchiveError),
}
