//! # Rudder Control Executable
//!
//! Runs the rudder heading controller at a fixed rate.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise RudderCtrl and the equipment
//!     - Main loop, once per RudderCtrl sample interval:
//!         - Heading acquisition from the compass
//!         - Desired path acquisition from navigation
//!         - Rudder control processing
//!         - Rudder actuation
//!         - Archiving
//!
//! The compass and rudder servo are provided by a simulated boat, and the
//! desired path is fixed by the executable's parameters.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Parameters for the rudder executable.
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use params::RudderExecParams;
use rudder_lib::{
    data_store::{CycleOutcome, DataStore},
    eqpt::{FixedPath, ServoMap, SimBoat},
    rudder_ctrl::RudderCtrl,
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "rudder_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Rudder Control Executable v{}\n", env!("CARGO_PKG_VERSION"));
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let exec_params: RudderExecParams = util::params::load("rudder_exec.toml")
        .wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");
    debug!("{:#?}", exec_params);

    // ---- INITIALISE MODULES ----

    let mut rudder_ctrl = RudderCtrl::default();
    rudder_ctrl.init("rudder_ctrl.toml", &session)
        .wrap_err("Failed to initialise RudderCtrl")?;

    let cycle_period_s = rudder_ctrl.params().sample_interval_s;
    let cycle_period = Duration::try_from_secs_f64(cycle_period_s)
        .wrap_err("Invalid RudderCtrl sample interval")?;

    info!("RudderCtrl init complete");
    debug!("{:#?}", rudder_ctrl.params());

    let mut ds = DataStore::new(rudder_ctrl);

    // ---- INITIALISE EQUIPMENT ----

    let servo_map = ServoMap::new(
        exec_params.servo_min_pulse_us,
        exec_params.servo_max_pulse_us,
        exec_params.servo_max_angle_deg
    ).wrap_err("Invalid servo parameters")?;

    let mut boat = SimBoat::new(
        exec_params.initial_heading_deg,
        exec_params.turn_rate_per_rudder_deg_s,
        cycle_period_s,
        servo_map
    );

    let mut path = FixedPath {
        desired_path_deg: exec_params.desired_path_deg
    };

    info!("Equipment initialised (simulated boat)");

    // ---- MAIN LOOP ----

    info!(
        "Initialisation complete, entering main loop at {:.1} Hz\n",
        1.0 / cycle_period_s
    );

    while exec_params.num_cycles == 0 || (ds.num_cycles as u64) < exec_params.num_cycles {

        let cycle_start_instant = Instant::now();

        match ds.run_cycle(&mut boat, &mut path) {
            CycleOutcome::Actuated(angle_deg) => {
                if let Some(rpt) = ds.rudder_ctrl_status_rpt {
                    if rpt.rudder_limited {
                        debug!(
                            "Rudder on its limit at {:.3} deg, integral now {:.3}",
                            angle_deg,
                            ds.rudder_ctrl.state().integral_accum
                        );
                    }
                }
            },
            CycleOutcome::Held(_) | CycleOutcome::ActuatorFault => ()
        }

        // ---- WRITE ARCHIVES ----

        if exec_params.archive {
            if let Err(e) = ds.rudder_ctrl.write() {
                warn!("Could not write RudderCtrl archives: {}", e);
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            },
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period_s
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }
    }

    // ---- SHUTDOWN ----

    info!("Completed {} cycles", ds.num_cycles);
    info!("    Final heading: {:.3} deg", boat.heading_deg());
    info!("    Final rudder: {:.3} deg", boat.rudder_deg());
    info!("    Integral accumulator: {:.3}", ds.rudder_ctrl.state().integral_accum);
    info!("End of execution");

    Ok(())
}
