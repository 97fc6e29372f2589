use serde::{Deserialize, Serialize};

use crate::geometry::{GeometryError, Point3};
use crate::solver::SolverOptions;

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors raised while fitting (or simulating input for) a bore cylinder.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// Fewer usable (finite) touch points than the model has parameters.
    InsufficientPoints { needed: usize, got: usize },
    /// The optimizer returned no solution or a non-finite one, ended on a
    /// non-positive radius, or was started from an invalid initial radius.
    FitDidNotConverge {
        max_iteration: usize,
        /// Radius the fit ended on (mm); NaN when there was no solution.
        radius: f64,
    },
    /// Rejection sampling could not place the requested number of simulated
    /// touch points inside the envelope.
    SimulationExhausted { requested: usize, generated: usize },
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientPoints { needed, got } => write!(
                f,
                "cylinder fit needs at least {} finite touch points, got {}",
                needed, got
            ),
            Self::FitDidNotConverge {
                max_iteration,
                radius,
            } => write!(
                f,
                "cylinder fit did not converge within {} iterations (radius {:.3})",
                max_iteration, radius
            ),
            Self::SimulationExhausted {
                requested,
                generated,
            } => write!(
                f,
                "touch simulation placed only {} of {} points inside the envelope",
                generated, requested
            ),
        }
    }
}

impl std::error::Error for FitError {}

// ── Fit result ─────────────────────────────────────────────────────────────

/// Calibrated bore cross-section. The axis is parallel to machine x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylinderFit {
    /// Axis y coordinate (mm).
    pub center_y: f64,
    /// Axis z coordinate (mm).
    pub center_z: f64,
    /// Bore radius (mm), always > 0 for a successful fit.
    pub radius: f64,
}

impl CylinderFit {
    pub fn new(center_y: f64, center_z: f64, radius: f64) -> Self {
        Self {
            center_y,
            center_z,
            radius,
        }
    }

    /// Point on the bore axis at machine coordinate `x`.
    pub fn axis_point(&self, x: f64) -> Point3 {
        Point3::new(x, self.center_y, self.center_z)
    }

    /// Signed distance of `p` from the bore wall (positive outside).
    pub fn residual(&self, p: &Point3) -> f64 {
        p.radial_distance_yz(&self.axis_point(p.x)) - self.radius
    }

    /// Radius left after subtracting `clearance` from the wall.
    pub fn usable_radius(&self, clearance: f64) -> Result<f64, GeometryError> {
        if !clearance.is_finite() || clearance < 0.0 || clearance >= self.radius {
            return Err(GeometryError::InvalidClearance {
                radius: self.radius,
                clearance,
            });
        }
        Ok(self.radius - clearance)
    }
}

/// Diagnostics of a successful fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitStats {
    /// Finite touch points used by the solver.
    pub n_points: usize,
    /// Final cost `½ Σ rᵢ²` (mm²).
    pub cost: f64,
    pub rms_residual_mm: f64,
    pub max_abs_residual_mm: f64,
}

// ── Configuration ──────────────────────────────────────────────────────────

/// Cylinder fit parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CylinderFitConfig {
    /// Radius used as the initial guess (mm).
    pub initial_radius: f64,
    /// Levenberg–Marquardt limits.
    pub solver: SolverOptions,
}

impl Default for CylinderFitConfig {
    fn default() -> Self {
        Self {
            initial_radius: 145.0,
            solver: SolverOptions::default(),
        }
    }
}

/// Parameters for synthesizing touch points on a known bore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchSimulationConfig {
    /// Bore axis point in machine coordinates; `x` is the touch plane.
    pub bore_center: Point3,
    /// Nominal bore radius (mm).
    pub nominal_radius: f64,
    /// Probe tip radius (mm); the touch point is the probe center.
    pub probe_radius: f64,
    /// Additional inward scatter, drawn uniformly from `[0, radius_variance]` (mm).
    pub radius_variance: f64,
    /// Rejection-sampling attempts allowed per point.
    pub max_attempts_per_point: usize,
}

impl Default for TouchSimulationConfig {
    fn default() -> Self {
        Self {
            bore_center: Point3::new(5.0, 125.0, -25.0),
            nominal_radius: 145.0,
            probe_radius: 5.0,
            radius_variance: 3.0,
            max_attempts_per_point: 1000,
        }
    }
}
