//! High-level calibration API.
//!
//! [`Calibrator`] ties the stages together: touch points → cylinder fit →
//! sweep plan → bore frame. A failed fit aborts before any plan is built.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::CalibrationConfig;
use crate::cylinder::{fit_cylinder_with_stats, CylinderFit, FitError, FitStats};
use crate::frame::{compute_origin, Frame};
use crate::geometry::{GeometryError, Point3};
use crate::io::{self, PersistError};
use crate::sweep::{generate_plan, BoreGeometry, SweepPlan};

/// File name of the persisted bore frame.
pub const FRAME_FILE: &str = "origin_info.csv";

// ── Error type ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CalibrationError {
    Fit(FitError),
    Geometry(GeometryError),
    Persist(PersistError),
}

impl std::fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fit(e) => write!(f, "fit failed: {}", e),
            Self::Geometry(e) => write!(f, "point generation failed: {}", e),
            Self::Persist(e) => write!(f, "could not write calibration output: {}", e),
        }
    }
}

impl std::error::Error for CalibrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fit(e) => Some(e),
            Self::Geometry(e) => Some(e),
            Self::Persist(e) => Some(e),
        }
    }
}

impl From<FitError> for CalibrationError {
    fn from(e: FitError) -> Self {
        Self::Fit(e)
    }
}

impl From<GeometryError> for CalibrationError {
    fn from(e: GeometryError) -> Self {
        Self::Geometry(e)
    }
}

impl From<PersistError> for CalibrationError {
    fn from(e: PersistError) -> Self {
        Self::Persist(e)
    }
}

// ── Results ────────────────────────────────────────────────────────────────

/// Everything produced by one calibration run.
#[derive(Debug, Clone)]
pub struct Calibration {
    pub fit: CylinderFit,
    pub stats: FitStats,
    /// Machine x of the first touch point.
    pub x_ref: f64,
    pub frame: Frame,
    pub plan: SweepPlan,
}

/// Point count of one plan segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub label: String,
    pub points: usize,
}

/// JSON summary of a calibration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub fit: CylinderFit,
    pub stats: FitStats,
    pub x_ref: f64,
    pub frame: Frame,
    pub pattern: String,
    pub segments: Vec<SegmentSummary>,
    pub total_points: usize,
}

impl Calibration {
    pub fn report(&self, config: &CalibrationConfig) -> CalibrationReport {
        CalibrationReport {
            fit: self.fit,
            stats: self.stats.clone(),
            x_ref: self.x_ref,
            frame: self.frame,
            pattern: config.sweep.pattern.name().to_string(),
            segments: self
                .plan
                .segments
                .iter()
                .map(|s| SegmentSummary {
                    label: s.label.clone(),
                    points: s.len(),
                })
                .collect(),
            total_points: self.plan.len(),
        }
    }

    /// Write `origin_info.csv` and one `<label>.csv` per plan segment into
    /// `dir`. Returns the written paths.
    pub fn write_outputs(&self, dir: &Path) -> Result<Vec<std::path::PathBuf>, PersistError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.plan.segments.len() + 1);
        let frame_path = dir.join(FRAME_FILE);
        io::write_frame_file(&frame_path, &self.frame)?;
        written.push(frame_path);
        for segment in &self.plan.segments {
            let path = dir.join(format!("{}.csv", segment.label));
            io::write_points_file(&path, &segment.points)?;
            written.push(path);
        }
        Ok(written)
    }
}

// ── Calibrator ─────────────────────────────────────────────────────────────

/// Primary calibration interface. Create once, calibrate many touch sets.
///
/// ```no_run
/// use boremap::{Calibrator, Point3};
///
/// let touch = vec![
///     Point3::new(5.0, 125.0, 115.0),
///     Point3::new(5.0, 265.0, -25.0),
///     Point3::new(5.0, 125.0, -165.0),
///     Point3::new(5.0, -15.0, -25.0),
/// ];
/// let calibration = Calibrator::new().calibrate(&touch).unwrap();
/// println!("{} points planned", calibration.plan.len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    config: CalibrationConfig,
}

impl Calibrator {
    /// Calibrator with laboratory defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CalibrationConfig) -> Self {
        Self { config }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::with_config(CalibrationConfig::from_json_file(path)?))
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CalibrationConfig {
        &mut self.config
    }

    /// Fit the bore cross-section.
    pub fn fit(&self, touch: &[Point3]) -> Result<(CylinderFit, FitStats), FitError> {
        fit_cylinder_with_stats(touch, &self.config.fit_config())
    }

    fn bore(&self, fit: &CylinderFit, x_ref: f64) -> BoreGeometry {
        BoreGeometry {
            fit: *fit,
            x_ref,
            length: self.config.bore.length,
        }
    }

    /// Sweep plan for an existing fit.
    pub fn plan(&self, fit: &CylinderFit, x_ref: f64) -> Result<SweepPlan, GeometryError> {
        generate_plan(&self.bore(fit, x_ref), &self.config.envelope, &self.config.sweep)
    }

    /// Bore frame for an existing fit.
    pub fn frame(&self, fit: &CylinderFit, x_ref: f64) -> Frame {
        compute_origin(fit, self.config.bore.length, x_ref, self.config.flipped)
    }

    /// Run fit → plan → frame on `touch`.
    pub fn calibrate(&self, touch: &[Point3]) -> Result<Calibration, CalibrationError> {
        let (fit, stats) = self.fit(touch)?;
        // The fit succeeded, so at least one finite point exists.
        let x_ref = touch
            .iter()
            .find(|p| p.is_finite())
            .map_or(0.0, |p| p.x);
        let plan = self.plan(&fit, x_ref)?;
        let frame = self.frame(&fit, x_ref);
        tracing::info!(
            "calibrated bore: center=({:.3}, {:.3}) r={:.3} rms={:.3} mm, {} planned points",
            fit.center_y,
            fit.center_z,
            fit.radius,
            stats.rms_residual_mm,
            plan.len()
        );
        Ok(Calibration {
            fit,
            stats,
            x_ref,
            frame,
            plan,
        })
    }
}
