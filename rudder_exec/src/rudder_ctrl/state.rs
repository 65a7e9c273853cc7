//! Implementations for the RudderCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use serde::Serialize;

// Internal
use super::{Params, RudderCtrlError, HALF_TURN_DEG};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::{norm_angle_deg, saturate},
    module::State,
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Rudder control module state
#[derive(Default)]
pub struct RudderCtrl {

    pub(crate) params: Params,

    pub(crate) state: CtrlState,

    initialised: bool,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) output: Option<OutputData>,
    arch_output: Archiver,

    /// Number of cycles which produced an output
    num_procs: u64,

    /// Set when a cycle has run since the archives were last written
    pending_archive: bool,
}

/// The memory the control law carries between cycles.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq)]
pub struct CtrlState {
    /// Running sum of `k_i * error * sample_interval` over every cycle so far.
    ///
    /// Units: degrees
    pub integral_accum: f64,

    /// Normalised heading error from the most recent cycle, shared by the
    /// proportional and integral terms.
    ///
    /// Units: degrees
    pub last_error_deg: f64,
}

/// Input data to rudder control.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputData {
    /// The course the boat should be on. Any angle in (-540, 540] is
    /// accepted and normalised.
    ///
    /// Units: degrees
    pub desired_path_deg: f64,

    /// The heading measured by the compass.
    ///
    /// Units: degrees
    pub heading_deg: f64,
}

/// Output demand from RudderCtrl that the rudder actuator must execute.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq)]
pub struct OutputData {
    /// Rudder angle demand, always within the configured rudder limits.
    ///
    /// Units: degrees
    pub rudder_angle_deg: f64,
}

/// The direction of correction chosen from the sign of the heading error.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum TurnDir {
    /// Positive error, the rudder swings towards its maximum.
    Clockwise,
    /// Zero or negative error, the rudder swings towards its minimum.
    CounterClockwise,
}

impl Default for TurnDir {
    fn default() -> Self {
        TurnDir::CounterClockwise
    }
}

/// Status report for RudderCtrl processing.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct StatusReport {
    /// Normalised heading error
    pub error_deg: f64,

    /// Proportional term
    pub p_term: f64,

    /// Integral term, equal to the accumulator after this cycle
    pub i_term: f64,

    /// Sum of the proportional and integral terms
    pub control_action: f64,

    /// Which side of the rudder range the action was mapped towards
    pub turn_dir: TurnDir,

    /// Rudder demand before saturation
    pub unclamped_rudder_deg: f64,

    /// Set if the rudder demand had to be saturated to a limit
    pub rudder_limited: bool,
}

/// A row of the status report archive.
#[derive(Serialize)]
struct ReportRecord {
    time_s: f64,
    cycle: u64,
    error_deg: f64,
    p_term: f64,
    i_term: f64,
    control_action: f64,
    turn_dir: TurnDir,
    unclamped_rudder_deg: f64,
    rudder_limited: bool,
}

/// A row of the output archive.
#[derive(Serialize)]
struct OutputRecord {
    time_s: f64,
    cycle: u64,
    rudder_angle_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for RudderCtrl {
    type InitData = &'static str;
    type InitError = RudderCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = RudderCtrlError;

    /// Initialise the RudderCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        let params: Params = params::load(init_data)?;
        params.validate()?;

        self.arch_report = Archiver::from_path(
            session, "rudder_ctrl/status_report.csv"
        )?;
        self.arch_output = Archiver::from_path(
            session, "rudder_ctrl/output.csv"
        )?;

        self.params = params;
        self.state = CtrlState::default();
        self.initialised = true;

        Ok(())
    }

    /// Perform cyclic processing of rudder control.
    ///
    /// Non-finite inputs, and inputs which overflow the law, are rejected
    /// before any state is touched, so the caller can skip the cycle and hold
    /// its last output.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        if !self.initialised {
            return Err(RudderCtrlError::NotInitialised);
        }

        if !input_data.desired_path_deg.is_finite() || !input_data.heading_deg.is_finite() {
            warn!(
                "Rejecting non-finite RudderCtrl input: {:?}", input_data
            );
            return Err(RudderCtrlError::NonFiniteInput {
                desired_path_deg: input_data.desired_path_deg,
                heading_deg: input_data.heading_deg
            });
        }

        // Work out the heading error, both terms use this same value
        let desired_path_deg = norm_angle_deg(input_data.desired_path_deg);
        let error_deg = norm_angle_deg(desired_path_deg - input_data.heading_deg);

        let p_term = self.calc_p_term(error_deg);
        let i_term = self.calc_i_term(error_deg);
        let control_action = p_term + i_term;

        let (turn_dir, unclamped_rudder_deg) = self.map_to_rudder(
            error_deg,
            control_action
        );

        // Finite inputs far outside a turn can still overflow. Nothing is
        // committed to the controller's memory unless every term is finite.
        let terms = [error_deg, p_term, i_term, control_action, unclamped_rudder_deg];
        if terms.iter().any(|t| !t.is_finite()) {
            warn!(
                "Rejecting RudderCtrl input which overflows the control law: {:?}",
                input_data
            );
            return Err(RudderCtrlError::NonFiniteResult {
                desired_path_deg: input_data.desired_path_deg,
                heading_deg: input_data.heading_deg
            });
        }

        self.state = CtrlState {
            integral_accum: i_term,
            last_error_deg: error_deg
        };

        let (rudder_angle_deg, limited) = saturate(
            unclamped_rudder_deg,
            self.params.rudder_min_deg,
            self.params.rudder_max_deg
        );

        self.report = StatusReport {
            error_deg,
            p_term,
            i_term,
            control_action,
            turn_dir,
            unclamped_rudder_deg,
            rudder_limited: limited,
        };

        if limited {
            debug!(
                "Rudder demand of {:.3} deg saturated to {:.3} deg",
                unclamped_rudder_deg, rudder_angle_deg
            );
        }

        trace!(
            "RudderCtrl:\n    error: {:.3} deg\n    P: {:.3}, I: {:.3}\n    rudder: {:.3} deg",
            error_deg, p_term, i_term, rudder_angle_deg
        );

        let output = OutputData { rudder_angle_deg };
        self.output = Some(output);
        self.num_procs += 1;
        self.pending_archive = true;

        Ok((output, self.report))
    }
}

impl Archived for RudderCtrl {
    /// Write the report and output of the latest cycle.
    ///
    /// Only cycles which ran since the previous write are archived, so held
    /// or rejected cycles leave no rows.
    fn write(&mut self) -> Result<(), ArchiveError> {
        let output = match self.output {
            Some(o) if self.pending_archive => o,
            _ => return Ok(())
        };
        self.pending_archive = false;

        let time_s = session::get_elapsed_seconds();
        let rpt = self.report;

        self.arch_report.serialise(ReportRecord {
            time_s,
            cycle: self.num_procs,
            error_deg: rpt.error_deg,
            p_term: rpt.p_term,
            i_term: rpt.i_term,
            control_action: rpt.control_action,
            turn_dir: rpt.turn_dir,
            unclamped_rudder_deg: rpt.unclamped_rudder_deg,
            rudder_limited: rpt.rudder_limited,
        })?;
        self.arch_output.serialise(OutputRecord {
            time_s,
            cycle: self.num_procs,
            rudder_angle_deg: output.rudder_angle_deg,
        })?;

        Ok(())
    }
}

impl RudderCtrl {

    /// Create an initialised controller directly from a set of parameters,
    /// without loading a file or archiving.
    pub fn with_params(params: Params) -> Result<Self, RudderCtrlError> {
        params.validate()?;

        Ok(Self {
            params,
            initialised: true,
            ..Default::default()
        })
    }

    /// Run one control cycle and return the rudder angle demand.
    ///
    /// Shorthand for `proc` when only the angle is needed.
    ///
    /// Units: degrees
    pub fn control_cycle(
        &mut self,
        desired_path_deg: f64,
        heading_deg: f64
    ) -> Result<f64, RudderCtrlError> {
        let (output, _) = self.proc(&InputData {
            desired_path_deg,
            heading_deg
        })?;

        Ok(output.rudder_angle_deg)
    }

    /// The parameters the controller is running with.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The controller's memory after the latest cycle.
    pub fn state(&self) -> &CtrlState {
        &self.state
    }

    /// The most recent output, `None` before the first successful cycle.
    pub fn output(&self) -> Option<OutputData> {
        self.output
    }

    /// The number of cycles which have produced an output.
    pub fn num_procs(&self) -> u64 {
        self.num_procs
    }

    /// Proportional term for the given error.
    fn calc_p_term(&self, error_deg: f64) -> f64 {
        self.params.k_p * error_deg
    }

    /// Integral term for the given error, i.e. the accumulator once this
    /// error has been added to it. The accumulator itself is not updated.
    fn calc_i_term(&self, error_deg: f64) -> f64 {
        self.state.integral_accum
            + self.params.k_i * error_deg * self.params.sample_interval_s
    }

    /// Map a control action onto the rudder range.
    ///
    /// The map is centred on half the maximum deflection. A positive error
    /// swings the demand towards the maximum, anything else swings it
    /// towards the minimum, scaled by `control_action / 180`. A zero error
    /// therefore demands half the maximum deflection, not zero.
    fn map_to_rudder(&self, error_deg: f64, control_action: f64) -> (TurnDir, f64) {
        let centre_deg = self.params.rudder_max_deg / 2.0;

        let (turn_dir, limit_deg) = if error_deg > 0.0 {
            (TurnDir::Clockwise, self.params.rudder_max_deg)
        }
        else {
            (TurnDir::CounterClockwise, self.params.rudder_min_deg)
        };

        (
            turn_dir,
            centre_deg + (limit_deg - centre_deg) * (control_action / HALF_TURN_DEG)
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < TOLERANCE,
            "expected {}, got {}", expected, actual
        );
    }

    fn params() -> Params {
        Params {
            k_p: 2.0,
            k_i: 1.0,
            sample_interval_s: 0.2,
            rudder_max_deg: 45.0,
            rudder_min_deg: -45.0,
        }
    }

    fn ctrl() -> RudderCtrl {
        RudderCtrl::with_params(params()).unwrap()
    }

    #[test]
    fn test_large_error_saturates() {
        let mut rc = ctrl();

        // error 90, P 180, I 18, action 198 -> 47.25 before clamping
        let (output, report) = rc.proc(&InputData {
            desired_path_deg: 90.0,
            heading_deg: 0.0
        }).unwrap();

        assert_eq!(output.rudder_angle_deg, 45.0);
        assert_close(report.error_deg, 90.0);
        assert_close(report.p_term, 180.0);
        assert_close(report.i_term, 18.0);
        assert_close(report.control_action, 198.0);
        assert_close(report.unclamped_rudder_deg, 47.25);
        assert_eq!(report.turn_dir, TurnDir::Clockwise);
        assert!(report.rudder_limited);
        assert_close(rc.state().integral_accum, 18.0);
        assert_close(rc.state().last_error_deg, 90.0);
    }

    #[test]
    fn test_integrator_windup() {
        let mut rc = ctrl();

        assert_eq!(rc.control_cycle(90.0, 0.0).unwrap(), 45.0);

        // Second cycle: I 36, action 216 -> 49.5 before clamping
        let (output, report) = rc.proc(&InputData {
            desired_path_deg: 90.0,
            heading_deg: 0.0
        }).unwrap();
        assert_eq!(output.rudder_angle_deg, 45.0);
        assert_close(report.unclamped_rudder_deg, 49.5);
        assert_close(rc.state().integral_accum, 36.0);

        // Sustained error keeps growing the accumulator while the output sits
        // on the limit
        for _ in 0..98 {
            assert_eq!(rc.control_cycle(90.0, 0.0).unwrap(), 45.0);
        }
        assert!((rc.state().integral_accum - 1800.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_error_offset() {
        let mut rc = ctrl();

        // Zero error takes the counter-clockwise branch and lands on the
        // centre of the map, half the maximum deflection
        let (output, report) = rc.proc(&InputData {
            desired_path_deg: 0.0,
            heading_deg: 0.0
        }).unwrap();

        assert_eq!(output.rudder_angle_deg, 22.5);
        assert_eq!(report.turn_dir, TurnDir::CounterClockwise);
        assert!(!report.rudder_limited);
        assert_eq!(rc.state().integral_accum, 0.0);
    }

    #[test]
    fn test_small_errors() {
        // error 10, P 20, I 2 -> 22.5 + 22.5 * 22/180
        let mut rc = ctrl();
        assert_close(rc.control_cycle(10.0, 0.0).unwrap(), 25.25);

        // error -10, P -20, I -2 -> 22.5 + (-67.5) * (-22/180)
        let mut rc = ctrl();
        assert_close(rc.control_cycle(0.0, 10.0).unwrap(), 30.75);
    }

    #[test]
    fn test_error_wraps() {
        // 5 - 355 = -350, which wraps to an error of +10
        let mut rc = ctrl();
        rc.control_cycle(5.0, 355.0).unwrap();
        assert_close(rc.state().last_error_deg, 10.0);
        assert_eq!(rc.report.turn_dir, TurnDir::Clockwise);

        // Desired path 350 normalises to -10 before the error is taken
        let mut rc = ctrl();
        assert_close(rc.control_cycle(350.0, 0.0).unwrap(), 30.75);
        assert_close(rc.state().last_error_deg, -10.0);
    }

    #[test]
    fn test_output_within_limits() {
        let configs = [
            params(),
            Params { k_p: 0.1, k_i: 0.0, ..params() },
            Params { k_p: 10.0, k_i: 5.0, sample_interval_s: 1.0, ..params() },
            Params { rudder_max_deg: 30.0, rudder_min_deg: -20.0, ..params() },
            Params { k_p: -3.0, k_i: -0.5, ..params() },
        ];

        for p in configs.iter() {
            let mut rc = RudderCtrl::with_params(*p).unwrap();

            let mut desired = -535.0;
            while desired <= 540.0 {
                let mut heading = -180.0;
                while heading <= 180.0 {
                    let angle = rc.control_cycle(desired, heading).unwrap();
                    assert!(
                        angle >= p.rudder_min_deg && angle <= p.rudder_max_deg,
                        "{} outside limits for desired {} heading {} with {:?}",
                        angle, desired, heading, p
                    );
                    heading += 17.5;
                }
                desired += 12.5;
            }
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut rc = ctrl();
        rc.control_cycle(10.0, 0.0).unwrap();
        let before = *rc.state();

        match rc.control_cycle(f64::NAN, 0.0) {
            Err(e @ RudderCtrlError::NonFiniteInput { .. }) => assert_eq!(
                e.to_string(),
                "Received a non-finite input (desired path: NaN deg, heading: 0 deg)"
            ),
            r => panic!("Expected NonFiniteInput, got {:?}", r)
        }
        assert!(rc.control_cycle(0.0, f64::INFINITY).is_err());

        // Rejected cycles leave the memory and last output alone
        assert_eq!(*rc.state(), before);
        assert_close(rc.output().unwrap().rudder_angle_deg, 25.25);
    }

    #[test]
    fn test_not_initialised() {
        let mut rc = RudderCtrl::default();
        assert!(matches!(
            rc.control_cycle(0.0, 0.0),
            Err(RudderCtrlError::NotInitialised)
        ));
        assert!(rc.output().is_none());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let p = Params { sample_interval_s: -0.2, ..params() };
        assert!(matches!(
            RudderCtrl::with_params(p),
            Err(RudderCtrlError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_overflowing_inputs_rejected() {
        let mut rc = ctrl();
        rc.control_cycle(10.0, 0.0).unwrap();
        let before = *rc.state();

        // Finite, but the difference overflows to infinity
        match rc.control_cycle(f64::MAX, -f64::MAX) {
            Err(RudderCtrlError::NonFiniteResult { .. }) => (),
            r => panic!("Expected NonFiniteResult, got {:?}", r)
        }
        assert!(rc.control_cycle(-f64::MAX, f64::MAX).is_err());
        assert_eq!(*rc.state(), before);
        assert_eq!(rc.num_procs(), 1);

        // The controller carries on as if the bad cycles never happened
        let angle = rc.control_cycle(10.0, 0.0).unwrap();
        assert!(angle >= -45.0 && angle <= 45.0);
        assert_close(rc.state().integral_accum, 4.0);
    }

    #[test]
    fn test_accumulator_overflow_rejected() {
        let mut rc = ctrl();
        rc.state.integral_accum = f64::MAX;
        let before = *rc.state();

        // k_i * error * dt pushes the accumulator past f64::MAX
        let p = Params { k_i: f64::MAX, sample_interval_s: 1.0, ..params() };
        rc.params = p;
        assert!(matches!(
            rc.control_cycle(90.0, 0.0),
            Err(RudderCtrlError::NonFiniteResult { .. })
        ));
        assert_eq!(*rc.state(), before);
    }

    #[test]
    fn test_archive_only_fresh_cycles() {
        let dir = std::env::temp_dir()
            .join(format!("rudder_ctrl_archive_{}", std::process::id()));
        let report_path = dir.join("status_report.csv");
        let output_path = dir.join("output.csv");

        let mut rc = ctrl();
        rc.arch_report = Archiver::from_file(&report_path).unwrap();
        rc.arch_output = Archiver::from_file(&output_path).unwrap();

        // Nothing to write before the first cycle
        rc.write().unwrap();

        rc.control_cycle(90.0, 0.0).unwrap();
        rc.write().unwrap();

        // Held cycles call write without running the controller
        rc.write().unwrap();
        rc.write().unwrap();
        assert!(rc.control_cycle(f64::NAN, 0.0).is_err());
        rc.write().unwrap();

        rc.control_cycle(90.0, 0.0).unwrap();
        rc.write().unwrap();

        let output = std::fs::read_to_string(&output_path).unwrap();
        let rows: Vec<Vec<&str>> = output
            .lines()
            .map(|l| l.split(',').collect())
            .collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["time_s", "cycle", "rudder_angle_deg"]);
        assert_eq!(&rows[1][1..], &["1", "45.0"]);
        assert_eq!(&rows[2][1..], &["2", "45.0"]);

        let report = std::fs::read_to_string(&report_path).unwrap();
        let rows: Vec<Vec<&str>> = report
            .lines()
            .map(|l| l.split(',').collect())
            .collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][..2], ["time_s", "cycle"]);
        assert_eq!(rows[1][1], "1");
        assert_eq!(rows[1][4], "18.0");
        assert_eq!(rows[2][1], "2");
        assert_eq!(rows[2][4], "36.0");
    }

    #[test]
    fn test_archive_without_init() {
        // Archivers are inactive until `init` so writing is a no-op
        let mut rc = ctrl();
        rc.control_cycle(90.0, 0.0).unwrap();
        assert!(rc.write().is_ok());
    }
}
