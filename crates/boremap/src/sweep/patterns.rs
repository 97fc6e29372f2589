//! Candidate generation for each sweep pattern.
//!
//! Candidates are unconstrained; [`super::generate_plan`] applies the bore,
//! region and envelope filters afterwards.

use serde::{Deserialize, Serialize};

use crate::geometry::{generate_lattice, Envelope, GeometryError, Point3};

use super::BoreGeometry;

/// Inward nudge applied to the ring radius so the generated points never
/// land a rounding error outside the clearance cylinder.
pub(crate) const RING_INSET_MM: f64 = 1e-6;

fn default_ring_points() -> usize {
    72
}

fn default_angles() -> Vec<f64> {
    vec![90.0, 45.0, 0.0, -45.0]
}

fn default_samples() -> usize {
    30
}

fn default_quadrants() -> Vec<u8> {
    vec![1, 2, 3, 4]
}

fn default_lateral_fraction() -> f64 {
    0.5
}

fn default_step() -> f64 {
    10.0
}

fn default_true() -> bool {
    true
}

/// Which subset of the bore interior a measurement run visits.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SweepPattern {
    /// Full lattice at the configured spacing.
    #[default]
    Dense,
    /// Circle at the clearance radius in one cross-section.
    Ring {
        /// Angular samples over a full turn.
        #[serde(default = "default_ring_points")]
        points: usize,
        /// Cross-section position relative to the touch plane (mm).
        #[serde(default)]
        axial_offset: f64,
    },
    /// Diameters through the axis at fixed angles in one cross-section.
    AngledLine {
        /// Line angles in degrees, measured from +y towards +z.
        #[serde(default = "default_angles")]
        angles_deg: Vec<f64>,
        /// Samples per line over `[-radius, radius]`.
        #[serde(default = "default_samples")]
        samples: usize,
        #[serde(default)]
        axial_offset: f64,
    },
    /// Axial lines, one per quadrant, offset from the axis.
    QuadrantLine {
        /// Quadrants to visit (1..=4).
        #[serde(default = "default_quadrants")]
        quadrants: Vec<u8>,
        /// Lateral offset on y and z as a fraction of the fitted radius.
        #[serde(default = "default_lateral_fraction")]
        lateral_fraction: f64,
        /// Axial spacing (mm).
        #[serde(default = "default_step")]
        step: f64,
        /// Also sample the axis itself (labelled quadrant 0).
        #[serde(default = "default_true")]
        include_axis: bool,
    },
}

impl SweepPattern {
    pub fn ring() -> Self {
        Self::Ring {
            points: default_ring_points(),
            axial_offset: 0.0,
        }
    }

    pub fn angled_lines() -> Self {
        Self::AngledLine {
            angles_deg: default_angles(),
            samples: default_samples(),
            axial_offset: 0.0,
        }
    }

    pub fn quadrant_lines() -> Self {
        Self::QuadrantLine {
            quadrants: default_quadrants(),
            lateral_fraction: default_lateral_fraction(),
            step: default_step(),
            include_axis: true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Dense => "dense",
            Self::Ring { .. } => "ring",
            Self::AngledLine { .. } => "angled_line",
            Self::QuadrantLine { .. } => "quadrant_line",
        }
    }
}

/// Unfiltered points of one segment plus their optional scalar coordinate.
pub(crate) struct Candidates {
    pub label: String,
    pub points: Vec<Point3>,
    pub coords: Option<Vec<f64>>,
}

pub(crate) fn dense(envelope: &Envelope, spacing: f64) -> Result<Vec<Candidates>, GeometryError> {
    Ok(vec![Candidates {
        label: "valid_points".to_string(),
        points: generate_lattice(envelope, spacing)?,
        coords: None,
    }])
}

pub(crate) fn ring(bore: &BoreGeometry, usable_radius: f64, n: usize, axial_offset: f64) -> Vec<Candidates> {
    let r = usable_radius - RING_INSET_MM;
    let x = bore.x_ref + axial_offset;
    let mut points = Vec::with_capacity(n);
    let mut thetas = Vec::with_capacity(n);
    for k in 0..n {
        let theta = std::f64::consts::TAU * k as f64 / n as f64;
        points.push(Point3::new(
            x,
            bore.fit.center_y - r * theta.cos(),
            bore.fit.center_z + r * theta.sin(),
        ));
        thetas.push(theta);
    }
    vec![Candidates {
        label: "ring".to_string(),
        points,
        coords: Some(thetas),
    }]
}

/// `n` evenly spaced values over `[lo, hi]`, both ends included.
fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

pub(crate) fn angled_lines(
    bore: &BoreGeometry,
    angles_deg: &[f64],
    samples: usize,
    axial_offset: f64,
) -> Vec<Candidates> {
    let r = bore.fit.radius;
    let x = bore.x_ref + axial_offset;
    let radii = linspace(-r, r, samples);
    angles_deg
        .iter()
        .map(|&deg| {
            let (sin, cos) = deg.to_radians().sin_cos();
            let points = radii
                .iter()
                .map(|s| {
                    Point3::new(
                        x,
                        bore.fit.center_y + s * cos,
                        bore.fit.center_z + s * sin,
                    )
                })
                .collect();
            Candidates {
                label: format!("angle_{}", deg),
                points,
                coords: Some(radii.clone()),
            }
        })
        .collect()
}

/// Lateral (y, z) sign pattern of each quadrant.
fn quadrant_signs(q: u8) -> Option<(f64, f64)> {
    match q {
        0 => Some((0.0, 0.0)),
        1 => Some((-1.0, 1.0)),
        2 => Some((1.0, 1.0)),
        3 => Some((1.0, -1.0)),
        4 => Some((-1.0, -1.0)),
        _ => None,
    }
}

pub(crate) fn quadrant_lines(
    bore: &BoreGeometry,
    quadrants: &[u8],
    lateral_fraction: f64,
    step: f64,
    include_axis: bool,
) -> Result<Vec<Candidates>, GeometryError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(GeometryError::InvalidSpacing { spacing: step });
    }
    let xs = crate::geometry::axis_samples(bore.x_ref, bore.x_ref + bore.length, step);
    let offset = lateral_fraction * bore.fit.radius;

    let mut order: Vec<u8> = Vec::with_capacity(quadrants.len() + 1);
    if include_axis {
        order.push(0);
    }
    order.extend(quadrants.iter().copied().filter(|&q| q != 0));

    let mut out = Vec::with_capacity(order.len());
    for q in order {
        let Some((sy, sz)) = quadrant_signs(q) else {
            tracing::warn!("ignoring unknown quadrant {}", q);
            continue;
        };
        let y = bore.fit.center_y + sy * offset;
        let z = bore.fit.center_z + sz * offset;
        out.push(Candidates {
            label: format!("quadrant_{}", q),
            points: xs.iter().map(|&x| Point3::new(x, y, z)).collect(),
            coords: None,
        });
    }
    Ok(out)
}
