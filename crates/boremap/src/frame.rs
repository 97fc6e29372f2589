//! Bore reference frame and the machine ↔ bore point transform.
//!
//! A [`Frame`] stores an origin and three orthonormal basis rows. Points map
//! into the frame as `B·(p − o)` and back as `Bᵀ·q + o`.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::cylinder::CylinderFit;
use crate::geometry::Point3;

const ORTHONORMAL_TOL: f64 = 1e-9;

// ── Error type ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Basis rows are not unit length and mutually orthogonal.
    NotOrthonormal {
        /// Largest entry of `|B·Bᵀ − I|`.
        max_error: f64,
    },
    /// Origin or basis contains NaN/∞.
    NonFinite,
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOrthonormal { max_error } => write!(
                f,
                "frame basis is not orthonormal (max |B·Bᵀ − I| = {:.3e})",
                max_error
            ),
            Self::NonFinite => write!(f, "frame contains non-finite values"),
        }
    }
}

impl std::error::Error for FrameError {}

// ── Frame ──────────────────────────────────────────────────────────────────

/// Coordinate frame: origin plus basis rows `[x̂, ŷ, ẑ]`, all in machine
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub origin: Point3,
    pub axes: [Point3; 3],
}

impl Frame {
    /// Validate and build a frame.
    pub fn new(origin: Point3, axes: [Point3; 3]) -> Result<Self, FrameError> {
        let frame = Self { origin, axes };
        frame.validate()?;
        Ok(frame)
    }

    /// Frame with identity basis at `origin`.
    pub fn identity_at(origin: Point3) -> Self {
        Self {
            origin,
            axes: [
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
        }
    }

    pub fn validate(&self) -> Result<(), FrameError> {
        if !self.origin.is_finite() || !self.axes.iter().all(Point3::is_finite) {
            return Err(FrameError::NonFinite);
        }
        let b = self.basis();
        let max_error = (b * b.transpose() - Matrix3::identity()).amax();
        if max_error > ORTHONORMAL_TOL {
            return Err(FrameError::NotOrthonormal { max_error });
        }
        Ok(())
    }

    /// Basis matrix with the axes as rows.
    pub fn basis(&self) -> Matrix3<f64> {
        let [x, y, z] = self.axes;
        Matrix3::new(x.x, x.y, x.z, y.x, y.y, y.z, z.x, z.y, z.z)
    }

    /// Machine point → frame coordinates.
    pub fn to_frame(&self, p: &Point3) -> Point3 {
        Point3::from_vector(&(self.basis() * (*p - self.origin).to_vector()))
    }

    /// Frame coordinates → machine point.
    pub fn to_machine(&self, q: &Point3) -> Point3 {
        Point3::from_vector(&(self.basis().transpose() * q.to_vector())) + self.origin
    }

    pub fn points_to_frame(&self, points: &[Point3]) -> Vec<Point3> {
        let b = self.basis();
        points
            .iter()
            .map(|p| Point3::from_vector(&(b * (*p - self.origin).to_vector())))
            .collect()
    }

    pub fn points_to_machine(&self, points: &[Point3]) -> Vec<Point3> {
        let bt = self.basis().transpose();
        points
            .iter()
            .map(|q| Point3::from_vector(&(bt * q.to_vector())) + self.origin)
            .collect()
    }

    /// `[origin, x̂, ŷ, ẑ]`, the row layout of `origin_info.csv`.
    pub fn to_rows(&self) -> [[f64; 3]; 4] {
        [
            self.origin.to_array(),
            self.axes[0].to_array(),
            self.axes[1].to_array(),
            self.axes[2].to_array(),
        ]
    }

    pub fn from_rows(rows: [[f64; 3]; 4]) -> Result<Self, FrameError> {
        Self::new(
            rows[0].into(),
            [rows[1].into(), rows[2].into(), rows[3].into()],
        )
    }
}

/// Bore frame for a fitted cylinder.
///
/// The origin sits on the axis halfway along the bore,
/// `(x_ref + bore_length / 2, center_y, center_z)`. With `flipped` the frame
/// is rotated 180° about z (x̂ and ŷ negated).
pub fn compute_origin(fit: &CylinderFit, bore_length: f64, x_ref: f64, flipped: bool) -> Frame {
    let mut frame = Frame::identity_at(fit.axis_point(x_ref + bore_length / 2.0));
    if flipped {
        frame.axes[0] = Point3::new(-1.0, 0.0, 0.0);
        frame.axes[1] = Point3::new(0.0, -1.0, 0.0);
    }
    tracing::debug!(
        "bore frame origin ({:.3}, {:.3}, {:.3}){}",
        frame.origin.x,
        frame.origin.y,
        frame.origin.z,
        if flipped { " flipped" } else { "" }
    );
    frame
}
