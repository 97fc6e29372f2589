//! Bore cylinder calibration from touch points.
//!
//! The bore axis is assumed parallel to machine x, so the model has three
//! parameters: the axis position `(center_y, center_z)` and the radius.

mod fit;
mod touch;
mod types;

pub use fit::{fit_cylinder, fit_cylinder_with_stats, MIN_TOUCH_POINTS};
pub use touch::simulate_touch_points;
pub use types::{CylinderFit, CylinderFitConfig, FitError, FitStats, TouchSimulationConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Envelope, GeometryError, Point3};
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn circle_points(cy: f64, cz: f64, r: f64, angles: &[f64], x: f64) -> Vec<Point3> {
        angles
            .iter()
            .map(|a| Point3::new(x, cy + r * a.cos(), cz + r * a.sin()))
            .collect()
    }

    #[test]
    fn recovers_exact_circle() {
        let angles: Vec<f64> = (0..8).map(|k| 0.1 + k as f64 * 0.77).collect();
        let pts = circle_points(10.0, -5.0, 100.0, &angles, 3.0);
        let (fit, stats) =
            fit_cylinder_with_stats(&pts, &CylinderFitConfig::default()).expect("fit");
        assert_abs_diff_eq!(fit.center_y, 10.0, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.center_z, -5.0, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.radius, 100.0, epsilon = 1e-3);
        assert!(stats.rms_residual_mm < 1e-4);
        assert_eq!(stats.n_points, 8);
    }

    #[test]
    fn recovers_circle_from_half_arc() {
        let angles: Vec<f64> = (0..10).map(|k| k as f64 * std::f64::consts::PI / 9.0).collect();
        let pts = circle_points(125.0, -25.0, 140.0, &angles, 5.0);
        let fit = fit_cylinder(&pts, &CylinderFitConfig::default()).expect("fit");
        assert_abs_diff_eq!(fit.center_y, 125.0, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.center_z, -25.0, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.radius, 140.0, epsilon = 1e-3);
    }

    #[test]
    fn noisy_points_stay_close() {
        let mut rng = StdRng::seed_from_u64(42);
        let pts: Vec<Point3> = (0..36)
            .map(|k| {
                let a = k as f64 * std::f64::consts::TAU / 36.0;
                let r = 100.0 + rng.gen_range(-0.3..0.3);
                Point3::new(0.0, 10.0 + r * a.cos(), -5.0 + r * a.sin())
            })
            .collect();
        let (fit, stats) =
            fit_cylinder_with_stats(&pts, &CylinderFitConfig::default()).expect("fit");
        assert_abs_diff_eq!(fit.center_y, 10.0, epsilon = 0.3);
        assert_abs_diff_eq!(fit.center_z, -5.0, epsilon = 0.3);
        assert_abs_diff_eq!(fit.radius, 100.0, epsilon = 0.3);
        assert!(stats.rms_residual_mm < 0.3);
        assert!(stats.max_abs_residual_mm >= stats.rms_residual_mm);
    }

    #[test]
    fn too_few_finite_points() {
        let pts = vec![
            Point3::new(0.0, 100.0, 0.0),
            Point3::new(0.0, 0.0, 100.0),
            Point3::new(0.0, f64::NAN, 0.0),
        ];
        let err = fit_cylinder(&pts, &CylinderFitConfig::default()).unwrap_err();
        assert_eq!(err, FitError::InsufficientPoints { needed: 3, got: 2 });
        assert!(fit_cylinder(&[], &CylinderFitConfig::default()).is_err());
    }

    #[test]
    fn non_finite_points_are_skipped() {
        let angles: Vec<f64> = (0..6).map(|k| k as f64 * 1.0).collect();
        let mut pts = circle_points(0.0, 0.0, 50.0, &angles, 0.0);
        pts.push(Point3::new(0.0, f64::INFINITY, 1.0));
        let (fit, stats) =
            fit_cylinder_with_stats(&pts, &CylinderFitConfig::default()).expect("fit");
        assert_eq!(stats.n_points, 6);
        assert_abs_diff_eq!(fit.radius, 50.0, epsilon = 1e-3);
    }

    #[test]
    fn invalid_initial_radius_reports_non_convergence() {
        let angles: Vec<f64> = (0..8).map(|k| 0.1 + k as f64 * 0.77).collect();
        let pts = circle_points(10.0, -5.0, 100.0, &angles, 0.0);
        for initial_radius in [f64::NAN, 0.0, -100.0] {
            let config = CylinderFitConfig {
                initial_radius,
                ..Default::default()
            };
            match fit_cylinder(&pts, &config) {
                Err(FitError::FitDidNotConverge { max_iteration, .. }) => {
                    assert_eq!(max_iteration, 100)
                }
                other => panic!("expected FitDidNotConverge, got {other:?}"),
            }
        }
    }

    #[test]
    fn fit_stats_cost_matches_residuals() {
        let angles: Vec<f64> = (0..12).map(|k| k as f64 * 0.5).collect();
        let pts = circle_points(125.0, -25.0, 140.0, &angles, 0.0);
        let config = CylinderFitConfig {
            solver: crate::solver::SolverOptions { max_iteration: 50 },
            ..Default::default()
        };
        let (fit, stats) = fit_cylinder_with_stats(&pts, &config).expect("fit");
        assert_abs_diff_eq!(fit.radius, 140.0, epsilon = 1e-4);
        let expected: f64 = pts.iter().map(|p| 0.5 * fit.residual(p).powi(2)).sum();
        assert_abs_diff_eq!(stats.cost, expected, epsilon = 1e-12);
        assert!(stats.rms_residual_mm < 1e-4);
    }

    #[test]
    fn usable_radius_checks_clearance() {
        let fit = CylinderFit::new(125.0, -25.0, 145.0);
        assert_abs_diff_eq!(fit.usable_radius(20.0).unwrap(), 125.0);
        assert!(matches!(
            fit.usable_radius(145.0),
            Err(GeometryError::InvalidClearance { .. })
        ));
        assert!(fit.usable_radius(-1.0).is_err());
        assert_abs_diff_eq!(fit.residual(&Point3::new(0.0, 125.0, 130.0)), 10.0);
    }

    #[test]
    fn simulated_touch_points_fit_the_nominal_bore() {
        let config = TouchSimulationConfig::default();
        let env = Envelope::default();
        let pts = simulate_touch_points(&config, &env, 12, 7).expect("simulate");
        assert_eq!(pts.len(), 12);
        let center = config.bore_center;
        for p in &pts {
            assert!(env.contains(p));
            assert_eq!(p.x, center.x);
            let r = p.radial_distance_yz(&center);
            assert!((137.0..=140.0).contains(&r), "radius {r}");
        }

        let again = simulate_touch_points(&config, &env, 12, 7).unwrap();
        assert_eq!(pts, again);

        let fit = fit_cylinder(&pts, &CylinderFitConfig::default()).expect("fit");
        assert_abs_diff_eq!(fit.center_y, center.y, epsilon = 2.0);
        assert_abs_diff_eq!(fit.center_z, center.z, epsilon = 2.0);
    }

    #[test]
    fn simulation_gives_up_outside_envelope() {
        let config = TouchSimulationConfig {
            max_attempts_per_point: 20,
            ..Default::default()
        };
        let env = Envelope::new([500.0, 600.0], [0.0, 10.0], [0.0, 10.0]).unwrap();
        let err = simulate_touch_points(&config, &env, 4, 1).unwrap_err();
        assert_eq!(
            err,
            FitError::SimulationExhausted {
                requested: 4,
                generated: 0
            }
        );
    }
}
