//! Synthetic touch points for dry runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{FitError, TouchSimulationConfig};
use crate::geometry::{Envelope, Point3, PointSet};

/// Draw `count` probe-center positions against the bore wall.
///
/// Point `i` lies in quadrant `i % 4` at a uniformly random angle within that
/// quadrant, at radius `nominal − probe − U(0, variance)` around
/// `config.bore_center`. Candidates outside `envelope` are redrawn up to
/// `config.max_attempts_per_point` times.
pub fn simulate_touch_points(
    config: &TouchSimulationConfig,
    envelope: &Envelope,
    count: usize,
    seed: u64,
) -> Result<PointSet, FitError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base_radius = config.nominal_radius - config.probe_radius;
    let variance = config.radius_variance.max(0.0);
    let c = config.bore_center;

    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let quadrant = (i % 4) as f64;
        let mut placed = None;
        for _ in 0..config.max_attempts_per_point.max(1) {
            let theta = (quadrant + rng.gen::<f64>()) * std::f64::consts::FRAC_PI_2;
            let r = base_radius - variance * rng.gen::<f64>();
            let p = Point3::new(c.x, c.y + r * theta.cos(), c.z + r * theta.sin());
            if envelope.contains(&p) {
                placed = Some(p);
                break;
            }
        }
        match placed {
            Some(p) => points.push(p),
            None => {
                return Err(FitError::SimulationExhausted {
                    requested: count,
                    generated: points.len(),
                })
            }
        }
    }

    tracing::debug!("simulated {} touch points (seed {})", points.len(), seed);
    Ok(points)
}
