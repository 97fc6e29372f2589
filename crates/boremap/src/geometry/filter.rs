//! Distance predicates and containment filters.
//!
//! All filters use inclusive boundaries (`<=`): a point lying exactly on the
//! surface of a shape is kept.

use serde::{Deserialize, Serialize};

use super::types::{GeometryError, Point3, PointSet};

/// Absolute difference along a single axis.
#[inline]
pub fn linear_distance(a: f64, b: f64) -> f64 {
    (a - b).abs()
}

/// Pairwise Euclidean distances between two equally long point sets.
pub fn euclidean_distance(p1: &[Point3], p2: &[Point3]) -> Result<Vec<f64>, GeometryError> {
    if p1.len() != p2.len() {
        return Err(GeometryError::DimensionMismatch {
            left: p1.len(),
            right: p2.len(),
        });
    }
    Ok(p1.iter().zip(p2).map(|(a, b)| a.distance(b)).collect())
}

pub fn in_cuboid(p: &Point3, center: &Point3, length: f64, width: f64, height: f64) -> bool {
    linear_distance(p.x, center.x) <= length / 2.0
        && linear_distance(p.y, center.y) <= width / 2.0
        && linear_distance(p.z, center.z) <= height / 2.0
}

/// Containment in a cylinder whose axis is parallel to x and passes through
/// `(center.y, center.z)`, centered axially on `center.x`.
pub fn in_cylinder(p: &Point3, center: &Point3, radius: f64, length: f64) -> bool {
    p.radial_distance_yz(center) <= radius && linear_distance(p.x, center.x) <= length / 2.0
}

pub fn in_sphere(p: &Point3, center: &Point3, radius: f64) -> bool {
    p.distance(center) <= radius
}

/// Points within an axis-aligned box of the given full dimensions
/// (`length` along x, `width` along y, `height` along z).
pub fn points_in_cuboid(
    points: &[Point3],
    center: &Point3,
    length: f64,
    width: f64,
    height: f64,
) -> PointSet {
    points
        .iter()
        .copied()
        .filter(|p| in_cuboid(p, center, length, width, height))
        .collect()
}

/// Points within an x-parallel cylinder. See [`in_cylinder`].
pub fn points_in_cylinder(
    points: &[Point3],
    center: &Point3,
    radius: f64,
    length: f64,
) -> PointSet {
    points
        .iter()
        .copied()
        .filter(|p| in_cylinder(p, center, radius, length))
        .collect()
}

pub fn points_in_sphere(points: &[Point3], center: &Point3, radius: f64) -> PointSet {
    points
        .iter()
        .copied()
        .filter(|p| in_sphere(p, center, radius))
        .collect()
}

/// Optional secondary bounding region applied on top of the bore constraint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionShape {
    /// No extra restriction.
    #[default]
    None,
    /// Axis-aligned box; `length`/`width`/`height` are full extents along x/y/z.
    Cuboid {
        center: Point3,
        length: f64,
        width: f64,
        height: f64,
    },
    /// x-parallel cylinder.
    Cylinder {
        center: Point3,
        radius: f64,
        length: f64,
    },
    Sphere { center: Point3, radius: f64 },
}

impl RegionShape {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn contains(&self, p: &Point3) -> bool {
        match *self {
            Self::None => true,
            Self::Cuboid {
                center,
                length,
                width,
                height,
            } => in_cuboid(p, &center, length, width, height),
            Self::Cylinder {
                center,
                radius,
                length,
            } => in_cylinder(p, &center, radius, length),
            Self::Sphere { center, radius } => in_sphere(p, &center, radius),
        }
    }

    /// Filter `points` through the matching `points_in_*` primitive.
    pub fn apply(&self, points: &[Point3]) -> PointSet {
        match *self {
            Self::None => points.to_vec(),
            Self::Cuboid {
                center,
                length,
                width,
                height,
            } => points_in_cuboid(points, &center, length, width, height),
            Self::Cylinder {
                center,
                radius,
                length,
            } => points_in_cylinder(points, &center, radius, length),
            Self::Sphere { center, radius } => points_in_sphere(points, &center, radius),
        }
    }
}
