//! Core geometric value types and the geometry error type.

use std::ops::{Add, Sub};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors raised by geometry primitives and lattice generation.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Lattice spacing was zero, negative or non-finite.
    InvalidSpacing {
        /// Offending spacing value (mm).
        spacing: f64,
    },
    /// Two point sets that must be paired element-wise differ in length.
    DimensionMismatch {
        /// Length of the first set.
        left: usize,
        /// Length of the second set.
        right: usize,
    },
    /// An envelope axis has `min > max` or a non-finite bound.
    InvalidEnvelope {
        /// Axis name (`'x'`, `'y'` or `'z'`).
        axis: char,
        /// Lower bound (mm).
        min: f64,
        /// Upper bound (mm).
        max: f64,
    },
    /// Clearance is negative or leaves no usable bore radius.
    InvalidClearance {
        /// Fitted bore radius (mm).
        radius: f64,
        /// Requested clearance (mm).
        clearance: f64,
    },
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSpacing { spacing } => {
                write!(f, "invalid lattice spacing {} mm: must be positive", spacing)
            }
            Self::DimensionMismatch { left, right } => {
                write!(f, "point set length mismatch: {} vs {}", left, right)
            }
            Self::InvalidEnvelope { axis, min, max } => {
                write!(f, "invalid envelope range on {}: [{}, {}]", axis, min, max)
            }
            Self::InvalidClearance { radius, clearance } => write!(
                f,
                "clearance {} mm leaves no usable interior in bore of radius {} mm",
                clearance, radius
            ),
        }
    }
}

impl std::error::Error for GeometryError {}

// ── Points ─────────────────────────────────────────────────────────────────

/// A point (or displacement) in millimeters.
///
/// Whether a value is expressed in machine or bore coordinates is tracked by
/// the caller; the type carries no frame tag.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// An ordered collection of points. Filters and transforms return new sets.
pub type PointSet = Vec<Point3>;

impl Point3 {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn from_vector(v: &Vector3<f64>) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance to `other` measured in the y-z plane (i.e. from an x-parallel
    /// axis through `other`).
    pub fn radial_distance_yz(&self, other: &Self) -> f64 {
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dy * dy + dz * dz).sqrt()
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        p.to_array()
    }
}

impl Add for Point3 {
    type Output = Point3;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Point3;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

// ── Envelope ───────────────────────────────────────────────────────────────

/// Axis-aligned reachable volume of the gantry, `[min, max]` per axis in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub x: [f64; 2],
    pub y: [f64; 2],
    pub z: [f64; 2],
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            x: [0.0, 375.0],
            y: [0.0, 250.0],
            z: [-150.0, 100.0],
        }
    }
}

impl Envelope {
    /// Build and validate an envelope.
    pub fn new(x: [f64; 2], y: [f64; 2], z: [f64; 2]) -> Result<Self, GeometryError> {
        let env = Self { x, y, z };
        env.validate()?;
        Ok(env)
    }

    /// Check `min <= max` and finiteness on every axis.
    pub fn validate(&self) -> Result<(), GeometryError> {
        for (axis, [min, max]) in ['x', 'y', 'z'].into_iter().zip(self.ranges()) {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(GeometryError::InvalidEnvelope { axis, min, max });
            }
        }
        Ok(())
    }

    pub fn ranges(&self) -> [[f64; 2]; 3] {
        [self.x, self.y, self.z]
    }

    /// Inclusive containment test on all three axes.
    pub fn contains(&self, p: &Point3) -> bool {
        in_range(p.x, self.x) && in_range(p.y, self.y) && in_range(p.z, self.z)
    }

    /// Clamp a point into the envelope, axis by axis.
    pub fn clamp(&self, p: &Point3) -> Point3 {
        Point3::new(
            clamp_axis(p.x, self.x),
            clamp_axis(p.y, self.y),
            clamp_axis(p.z, self.z),
        )
    }

    /// Keep only points inside the envelope.
    pub fn filter(&self, points: &[Point3]) -> PointSet {
        points.iter().copied().filter(|p| self.contains(p)).collect()
    }
}

#[inline]
fn in_range(v: f64, range: [f64; 2]) -> bool {
    range[0] <= v && v <= range[1]
}

#[inline]
pub(crate) fn clamp_axis(v: f64, range: [f64; 2]) -> f64 {
    v.max(range[0]).min(range[1])
}
