use tiny_solver::factors::na as ts_na;

use super::types::{CylinderFit, CylinderFitConfig, FitError, FitStats};
use crate::geometry::Point3;
use crate::solver::{minimize, scalar, PARAMS};

/// Parameter count of the cross-section model `(cy, cz, r)`.
pub const MIN_TOUCH_POINTS: usize = 3;

/// Geometric residual `‖(y, z) − (cy, cz)‖ − r` of one touch point.
#[derive(Debug, Clone)]
struct WallFactor {
    y: f64,
    z: f64,
}

impl<T: ts_na::RealField> tiny_solver::factors::Factor<T> for WallFactor {
    fn residual_func(&self, params: &[ts_na::DVector<T>]) -> ts_na::DVector<T> {
        let c = &params[0];
        let dy = scalar::<T>(self.y) - c[0].clone();
        let dz = scalar::<T>(self.z) - c[1].clone();
        let dist = (dy.clone() * dy + dz.clone() * dz).sqrt();
        ts_na::DVector::<T>::from_vec(vec![dist - c[2].clone()])
    }
}

/// Fit the bore cross-section to touch points. See [`fit_cylinder_with_stats`].
pub fn fit_cylinder(points: &[Point3], config: &CylinderFitConfig) -> Result<CylinderFit, FitError> {
    fit_cylinder_with_stats(points, config).map(|(fit, _)| fit)
}

/// Fit `(center_y, center_z, radius)` of an x-parallel cylinder by nonlinear
/// least squares on the radial residual.
///
/// Non-finite points are dropped before counting. The solver starts at the
/// mean y/z of the input and `config.initial_radius`, which must be a
/// positive finite radius.
pub fn fit_cylinder_with_stats(
    points: &[Point3],
    config: &CylinderFitConfig,
) -> Result<(CylinderFit, FitStats), FitError> {
    let usable: Vec<Point3> = points.iter().copied().filter(|p| p.is_finite()).collect();
    if usable.len() < MIN_TOUCH_POINTS {
        return Err(FitError::InsufficientPoints {
            needed: MIN_TOUCH_POINTS,
            got: usable.len(),
        });
    }
    if usable.len() < points.len() {
        tracing::warn!(
            "dropped {} non-finite touch points",
            points.len() - usable.len()
        );
    }

    let n = usable.len() as f64;
    let mean_y = usable.iter().map(|p| p.y).sum::<f64>() / n;
    let mean_z = usable.iter().map(|p| p.z).sum::<f64>() / n;
    let not_converged = |radius: f64| FitError::FitDidNotConverge {
        max_iteration: config.solver.max_iteration,
        radius,
    };
    if !config.initial_radius.is_finite() || config.initial_radius <= 0.0 {
        return Err(not_converged(config.initial_radius));
    }

    let mut problem = tiny_solver::Problem::new();
    for p in &usable {
        problem.add_residual_block(1, &[PARAMS], Box::new(WallFactor { y: p.y, z: p.z }), None);
    }
    let [cy, cz, r] = minimize(
        &problem,
        [mean_y, mean_z, config.initial_radius],
        &config.solver,
    )
    .ok_or_else(|| not_converged(f64::NAN))?;
    if r <= 0.0 {
        return Err(not_converged(r));
    }

    let fit = CylinderFit::new(cy, cz, r);
    let (sum_sq, max_abs) = usable.iter().fold((0.0f64, 0.0f64), |(s, m), p| {
        let e = fit.residual(p);
        (s + e * e, m.max(e.abs()))
    });
    let stats = FitStats {
        n_points: usable.len(),
        cost: 0.5 * sum_sq,
        rms_residual_mm: (sum_sq / n).sqrt(),
        max_abs_residual_mm: max_abs,
    };

    tracing::debug!(
        "cylinder fit: center=({:.3}, {:.3}) r={:.3} rms={:.4} n={}",
        cy,
        cz,
        r,
        stats.rms_residual_mm,
        stats.n_points
    );
    Ok((fit, stats))
}
