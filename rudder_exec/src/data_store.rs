//! # Data Store

use log::{info, warn};

use crate::{
    eqpt::{HeadingSource, PathSource, RudderActuator},
    rudder_ctrl,
};
use util::module::State;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// What happened during a single control cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// A new rudder demand was computed and sent.
    Actuated(f64),

    /// The inputs were unavailable or invalid so the controller was not run.
    /// The previous demand, if any, remains on the actuator.
    Held(Option<f64>),

    /// The demand was computed but the actuator refused it.
    ActuatorFault,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    // RudderCtrl
    pub rudder_ctrl: rudder_ctrl::RudderCtrl,
    pub rudder_ctrl_input: Option<rudder_ctrl::InputData>,
    /// The last demand the actuator accepted
    pub rudder_ctrl_output: Option<rudder_ctrl::OutputData>,
    pub rudder_ctrl_status_rpt: Option<rudder_ctrl::StatusReport>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive cycles where the controller could not be run
    pub num_consec_held_cycles: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {

    /// Create a data store around an already initialised controller.
    pub fn new(rudder_ctrl: rudder_ctrl::RudderCtrl) -> Self {
        Self {
            rudder_ctrl,
            ..Default::default()
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the per-cycle items, the last output is kept so it can be held.
    pub fn cycle_start(&mut self) {
        self.rudder_ctrl_input = None;
        self.rudder_ctrl_status_rpt = None;
    }

    /// Run one full control cycle: acquire the inputs, process rudder control
    /// and send the demand to the actuator.
    ///
    /// Sensor faults and rejected inputs skip the controller for this cycle,
    /// leaving the previous demand on the actuator.
    pub fn run_cycle<B, P>(&mut self, boat: &mut B, path_src: &mut P) -> CycleOutcome
    where
        B: HeadingSource + RudderActuator,
        P: PathSource
    {
        self.cycle_start();

        let outcome = self.proc_cycle(boat, path_src);

        match outcome {
            CycleOutcome::Held(_) => {
                self.num_consec_held_cycles += 1;
            },
            // The actuator is still on its previous demand, so this is not a
            // recovery
            CycleOutcome::ActuatorFault => (),
            CycleOutcome::Actuated(_) => {
                if self.num_consec_held_cycles > 0 {
                    info!(
                        "RudderCtrl resumed after {} held cycles",
                        self.num_consec_held_cycles
                    );
                }
                self.num_consec_held_cycles = 0;
            }
        }

        self.num_cycles += 1;

        outcome
    }

    fn proc_cycle<B, P>(&mut self, boat: &mut B, path_src: &mut P) -> CycleOutcome
    where
        B: HeadingSource + RudderActuator,
        P: PathSource
    {
        let held = CycleOutcome::Held(
            self.rudder_ctrl_output.map(|o| o.rudder_angle_deg)
        );

        // ---- DATA INPUT ----

        let heading_deg = match boat.read_heading_deg() {
            Ok(h) => h,
            Err(e) => {
                warn!("Could not read heading, holding rudder: {}", e);
                return held;
            }
        };

        let desired_path_deg = match path_src.desired_path_deg() {
            Ok(p) => p,
            Err(e) => {
                warn!("Could not get desired path, holding rudder: {}", e);
                return held;
            }
        };

        let input = rudder_ctrl::InputData {
            desired_path_deg,
            heading_deg
        };
        self.rudder_ctrl_input = Some(input);

        // ---- RUDDER CONTROL ----

        let output = match self.rudder_ctrl.proc(&input) {
            Ok((o, r)) => {
                self.rudder_ctrl_status_rpt = Some(r);
                o
            },
            Err(e) => {
                warn!("RudderCtrl processing error, holding rudder: {}", e);
                return held;
            }
        };

        // ---- ACTUATION ----

        // Only demands the actuator accepted are recorded, they are what a
        // held cycle leaves in place
        match boat.set_rudder_angle_deg(output.rudder_angle_deg) {
            Ok(_) => {
                self.rudder_ctrl_output = Some(output);
                CycleOutcome::Actuated(output.rudder_angle_deg)
            },
            Err(e) => {
                warn!("Rudder actuator error: {}", e);
                CycleOutcome::ActuatorFault
            }
        }
    }
}
