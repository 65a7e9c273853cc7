//! Parameters structure for RudderCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::RudderCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for rudder control.
///
/// These are fixed once the controller has been initialised.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize)]
pub struct Params {

    // ---- GAINS ----

    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    // ---- TIMING ----

    /// The period between control cycles. The integral term assumes the
    /// controller is called at exactly this rate.
    ///
    /// Units: seconds
    pub sample_interval_s: f64,

    // ---- RUDDER LIMITS ----

    /// Maximum rudder deflection (clockwise turn).
    ///
    /// Units: degrees
    pub rudder_max_deg: f64,

    /// Minimum rudder deflection (counter-clockwise turn). By convention this
    /// is the negative of `rudder_max_deg`.
    ///
    /// Units: degrees
    pub rudder_min_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {

    /// Check the parameters describe a usable controller.
    pub fn validate(&self) -> Result<(), RudderCtrlError> {
        let values = [
            ("k_p", self.k_p),
            ("k_i", self.k_i),
            ("sample_interval_s", self.sample_interval_s),
            ("rudder_max_deg", self.rudder_max_deg),
            ("rudder_min_deg", self.rudder_min_deg),
        ];

        for (name, value) in values.iter() {
            if !value.is_finite() {
                return Err(RudderCtrlError::InvalidParams(
                    format!("{} must be finite, found {}", name, value)
                ));
            }
        }

        if self.sample_interval_s <= 0.0 {
            return Err(RudderCtrlError::InvalidParams(format!(
                "sample_interval_s must be positive, found {}",
                self.sample_interval_s
            )));
        }

        // The executable sleeps out each cycle, so the period must fit in a
        // Duration
        if Duration::try_from_secs_f64(self.sample_interval_s).is_err() {
            return Err(RudderCtrlError::InvalidParams(format!(
                "sample_interval_s is too large to use as a cycle period, found {}",
                self.sample_interval_s
            )));
        }

        if self.rudder_min_deg >= self.rudder_max_deg {
            return Err(RudderCtrlError::InvalidParams(format!(
                "rudder_min_deg ({}) must be less than rudder_max_deg ({})",
                self.rudder_min_deg,
                self.rudder_max_deg
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> Params {
        Params {
            k_p: 2.0,
            k_i: 1.0,
            sample_interval_s: 0.2,
            rudder_max_deg: 45.0,
            rudder_min_deg: -45.0,
        }
    }

    #[test]
    fn test_shipped_params() {
        let p: Params = util::params::from_str(
            include_str!("../../../params/rudder_ctrl.toml")
        ).unwrap();

        assert_eq!(p.k_p, 2.0);
        assert_eq!(p.k_i, 1.0);
        assert_eq!(p.sample_interval_s, 0.2);
        assert_eq!(p.rudder_max_deg, 45.0);
        assert_eq!(p.rudder_min_deg, -45.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(params().validate().is_ok());

        let mut p = params();
        p.sample_interval_s = 0.0;
        assert!(matches!(p.validate(), Err(RudderCtrlError::InvalidParams(_))));

        let mut p = params();
        p.rudder_min_deg = 45.0;
        assert!(matches!(p.validate(), Err(RudderCtrlError::InvalidParams(_))));

        let mut p = params();
        p.k_i = f64::NAN;
        assert!(matches!(p.validate(), Err(RudderCtrlError::InvalidParams(_))));

        let mut p = params();
        p.sample_interval_s = 1e300;
        assert!(matches!(p.validate(), Err(RudderCtrlError::InvalidParams(_))));

        let mut p = params();
        p.rudder_max_deg = f64::INFINITY;
        assert!(matches!(p.validate(), Err(RudderCtrlError::InvalidParams(_))));
    }

    #[test]
    fn test_default_is_invalid() {
        // A zero sample interval can't drive the integral term
        assert!(Params::default().validate().is_err());
    }
}
