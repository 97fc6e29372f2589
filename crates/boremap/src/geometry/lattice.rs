//! Unconstrained candidate lattice over the gantry envelope.

use super::types::{Envelope, GeometryError, Point3, PointSet};

/// Arithmetic sequence `min + i * spacing` for every `i` with value `< max`.
///
/// Sample count is `ceil((max - min) / spacing)`, so `max` itself is never
/// produced. Values are computed from the index rather than accumulated.
pub fn axis_samples(min: f64, max: f64, spacing: f64) -> Vec<f64> {
    let span = max - min;
    if span.is_nan() || span <= 0.0 || spacing.is_nan() || spacing <= 0.0 {
        return Vec::new();
    }
    let n = (span / spacing).ceil() as usize;
    (0..n)
        .map(|i| min + i as f64 * spacing)
        .filter(|&v| v < max)
        .collect()
}

/// Full Cartesian product of the per-axis samples of `envelope`, x-major.
pub fn generate_lattice(envelope: &Envelope, spacing: f64) -> Result<PointSet, GeometryError> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(GeometryError::InvalidSpacing { spacing });
    }
    envelope.validate()?;

    let xs = axis_samples(envelope.x[0], envelope.x[1], spacing);
    let ys = axis_samples(envelope.y[0], envelope.y[1], spacing);
    let zs = axis_samples(envelope.z[0], envelope.z[1], spacing);

    let mut points = Vec::with_capacity(xs.len() * ys.len() * zs.len());
    for &x in &xs {
        for &y in &ys {
            for &z in &zs {
                points.push(Point3::new(x, y, z));
            }
        }
    }

    tracing::debug!(
        "lattice {}x{}x{} = {} candidates at {} mm spacing",
        xs.len(),
        ys.len(),
        zs.len(),
        points.len(),
        spacing
    );
    Ok(points)
}
