//! boremap — geometric calibration and point planning for bore field mapping.
//!
//! A gantry-mounted magnetic probe is moved through the interior of a
//! cylindrical bore. The stages are:
//!
//! 1. **Fit** – touch points on the bore wall → bore axis and radius
//!    (Levenberg–Marquardt, axis parallel to machine x).
//! 2. **Plan** – sweep pattern candidates filtered to the bore interior minus
//!    clearance, an optional secondary region and the gantry envelope.
//! 3. **Frame** – bore-centered reference frame; readings are reported in it.
//! 4. **Survey** – move, sample, record, through collaborator traits.
//!
//! Potentiometer calibration for the auxiliary motor rig lives in
//! [`potentiometer`].
//!
//! # Public API
//! - [`Calibrator`] and [`CalibrationConfig`] as primary entry points
//! - geometry value types and filters
//! - [`MotionController`] / [`ProbeReader`] collaborator traits
//! - CSV persistence in [`io`]

mod api;
mod config;
pub mod cylinder;
mod frame;
pub mod geometry;
pub mod io;
pub mod motion;
pub mod potentiometer;
pub mod solver;
mod survey;
pub mod sweep;

pub use api::{
    Calibration, CalibrationError, CalibrationReport, Calibrator, SegmentSummary, FRAME_FILE,
};
pub use config::{BoreSpec, CalibrationConfig};
pub use cylinder::{
    fit_cylinder, fit_cylinder_with_stats, simulate_touch_points, CylinderFit,
    CylinderFitConfig, FitError, FitStats, TouchSimulationConfig,
};
pub use frame::{compute_origin, Frame, FrameError};
pub use geometry::{Envelope, GeometryError, Point3, PointSet, RegionShape};
pub use motion::{
    AxisTarget, FieldVector, GcodeGantry, GcodeProgram, MotionController, MotionError,
    ProbeError, ProbeOrientation, ProbeReader, SimulatedProbe,
};
pub use survey::{
    run_survey, run_sweep_survey, FieldReading, SegmentReadings, SurveyError, SurveyOptions,
};
pub use sweep::{generate_plan, BoreGeometry, SweepConfig, SweepPattern, SweepPlan, SweepSegment};
