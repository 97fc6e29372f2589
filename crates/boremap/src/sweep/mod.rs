//! Valid-point generation inside a calibrated bore.
//!
//! A plan is built in four steps:
//! 1. pattern candidates ([`SweepPattern`]),
//! 2. bore filter: x-parallel cylinder of radius `fit.radius − clearance`
//!    spanning `[x_ref, x_ref + length]`,
//! 3. optional secondary [`RegionShape`],
//! 4. inclusive envelope intersection.
//!
//! Every point of the returned [`SweepPlan`] satisfies all active constraints.

mod patterns;

use serde::{Deserialize, Serialize};

use crate::cylinder::CylinderFit;
use crate::geometry::{Envelope, GeometryError, Point3, PointSet, RegionShape};

pub use patterns::SweepPattern;

/// Calibrated bore placement in machine coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoreGeometry {
    pub fit: CylinderFit,
    /// Machine x of the touch plane (bore entrance).
    pub x_ref: f64,
    /// Axial bore length (mm).
    pub length: f64,
}

impl BoreGeometry {
    /// Midpoint of the bore on its axis.
    pub fn interior_center(&self) -> Point3 {
        self.fit.axis_point(self.x_ref + self.length / 2.0)
    }

    /// Inclusive bore test: within `usable_radius` of the axis and
    /// `x_ref <= x <= x_ref + length`.
    ///
    /// The axial faces are compared against `x` directly; candidates placed
    /// at exactly `x_ref` must not be lost to rounding through the midpoint.
    pub fn contains(&self, p: &Point3, usable_radius: f64) -> bool {
        p.radial_distance_yz(&self.fit.axis_point(p.x)) <= usable_radius
            && self.x_ref <= p.x
            && p.x <= self.x_ref + self.length
    }
}

/// Point-generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Lattice spacing for the dense pattern (mm).
    pub spacing: f64,
    /// Safety margin subtracted from the fitted radius (mm).
    pub clearance: f64,
    pub pattern: SweepPattern,
    /// Secondary bounding region in machine coordinates.
    pub region: RegionShape,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            spacing: 10.0,
            clearance: 20.0,
            pattern: SweepPattern::Dense,
            region: RegionShape::None,
        }
    }
}

/// One independently persisted part of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSegment {
    /// File stem, e.g. `valid_points`, `angle_45`, `quadrant_2`.
    pub label: String,
    /// Machine-space points in visiting order.
    pub points: PointSet,
    /// Per-point scalar: angle (rad) for rings, signed radius (mm) for angled lines.
    pub coords: Option<Vec<f64>>,
}

impl SweepSegment {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SweepPlan {
    pub segments: Vec<SweepSegment>,
}

impl SweepPlan {
    /// Total number of points across segments.
    pub fn len(&self) -> usize {
        self.segments.iter().map(SweepSegment::len).sum()
    }

    /// True when no segment holds a point (a valid, degenerate outcome).
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(SweepSegment::is_empty)
    }

    /// All points, segment by segment.
    pub fn all_points(&self) -> PointSet {
        self.segments
            .iter()
            .flat_map(|s| s.points.iter().copied())
            .collect()
    }

    pub fn segment(&self, label: &str) -> Option<&SweepSegment> {
        self.segments.iter().find(|s| s.label == label)
    }
}

/// Build the measurement plan for `bore` under `config`.
pub fn generate_plan(
    bore: &BoreGeometry,
    envelope: &Envelope,
    config: &SweepConfig,
) -> Result<SweepPlan, GeometryError> {
    envelope.validate()?;
    let usable = bore.fit.usable_radius(config.clearance)?;

    let candidates = match &config.pattern {
        SweepPattern::Dense => patterns::dense(envelope, config.spacing)?,
        SweepPattern::Ring {
            points,
            axial_offset,
        } => patterns::ring(bore, usable, *points, *axial_offset),
        SweepPattern::AngledLine {
            angles_deg,
            samples,
            axial_offset,
        } => patterns::angled_lines(bore, angles_deg, *samples, *axial_offset),
        SweepPattern::QuadrantLine {
            quadrants,
            lateral_fraction,
            step,
            include_axis,
        } => patterns::quadrant_lines(bore, quadrants, *lateral_fraction, *step, *include_axis)?,
    };

    let keep = |p: &Point3| {
        bore.contains(p, usable)
            && config.region.contains(p)
            && envelope.contains(p)
    };

    let mut segments = Vec::with_capacity(candidates.len());
    let mut n_candidates = 0usize;
    for c in candidates {
        n_candidates += c.points.len();
        let mask: Vec<bool> = c.points.iter().map(&keep).collect();
        let points: PointSet = c
            .points
            .iter()
            .zip(&mask)
            .filter_map(|(p, &m)| m.then_some(*p))
            .collect();
        let coords = c.coords.map(|vals| {
            vals.into_iter()
                .zip(&mask)
                .filter_map(|(v, &m)| m.then_some(v))
                .collect()
        });
        tracing::debug!("segment {}: {} points", c.label, points.len());
        segments.push(SweepSegment {
            label: c.label,
            points,
            coords,
        });
    }

    let plan = SweepPlan { segments };
    if plan.is_empty() {
        tracing::warn!(
            "{} plan is empty: no candidate satisfies all constraints",
            config.pattern.name()
        );
    } else {
        tracing::info!(
            "{} plan: {} of {} candidates in {} segment(s)",
            config.pattern.name(),
            plan.len(),
            n_candidates,
            plan.segments.len()
        );
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{generate_lattice, points_in_cylinder};
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn lab_bore() -> BoreGeometry {
        BoreGeometry {
            fit: CylinderFit::new(125.0, -25.0, 145.0),
            x_ref: 5.0,
            length: 440.0,
        }
    }

    fn assert_constraints(plan: &SweepPlan, bore: &BoreGeometry, env: &Envelope, cfg: &SweepConfig) {
        let usable = bore.fit.radius - cfg.clearance;
        for p in plan.all_points() {
            assert!(env.contains(&p), "{p:?} outside envelope");
            assert!(bore.contains(&p, usable), "{p:?} outside bore");
            assert!(cfg.region.contains(&p), "{p:?} outside region");
        }
    }

    #[test]
    fn dense_plan_honours_all_constraints() {
        let bore = lab_bore();
        let env = Envelope::default();
        let cfg = SweepConfig::default();
        let plan = generate_plan(&bore, &env, &cfg).expect("plan");
        assert_eq!(plan.segments.len(), 1);
        assert_eq!(plan.segments[0].label, "valid_points");
        assert!(!plan.is_empty());
        assert_constraints(&plan, &bore, &env, &cfg);

        // (5, 125, 100) passes every inclusive filter, but the half-open
        // lattice at 10 mm stops at z = 90, so it is never a candidate.
        let on_faces = Point3::new(5.0, 125.0, 100.0);
        assert!(env.contains(&on_faces) && bore.contains(&on_faces, 125.0));
        assert!(plan.all_points().iter().all(|p| p.z <= 90.0));
        assert!(!plan.all_points().contains(&on_faces));

        // Same result as composing the batch filters by hand.
        let lattice = generate_lattice(&env, cfg.spacing).unwrap();
        let manual = env.filter(&points_in_cylinder(
            &lattice,
            &bore.interior_center(),
            125.0,
            440.0,
        ));
        assert_eq!(plan.all_points(), manual);
    }

    #[test]
    fn interior_center_is_bore_midpoint() {
        assert_eq!(lab_bore().interior_center(), Point3::new(225.0, 125.0, -25.0));
    }

    #[test]
    fn bore_contains_both_axial_faces() {
        let bore = BoreGeometry {
            fit: CylinderFit::new(125.0, -25.0, 145.0),
            x_ref: 40.318,
            length: 441.2,
        };
        let entrance = Point3::new(bore.x_ref, 125.0, -25.0);
        let exit = Point3::new(bore.x_ref + bore.length, 125.0, -25.0);
        assert!(bore.contains(&entrance, 125.0));
        assert!(bore.contains(&exit, 125.0));
        assert!(bore.contains(&Point3::new(bore.x_ref, 250.0, -25.0), 125.0));
        assert!(!bore.contains(&Point3::new(bore.x_ref - 1e-9, 125.0, -25.0), 125.0));
        assert!(!bore.contains(&Point3::new(100.0, 250.1, -25.0), 125.0));
    }

    #[test]
    fn fractional_bore_keeps_entrance_face_segments() {
        let env = Envelope::default();
        let mut bore = BoreGeometry {
            fit: CylinderFit::new(125.0, -25.0, 145.0),
            x_ref: 40.318,
            length: 441.2,
        };
        let ring = SweepConfig {
            pattern: SweepPattern::ring(),
            ..Default::default()
        };
        let angled = SweepConfig {
            pattern: SweepPattern::angled_lines(),
            ..Default::default()
        };

        let plan = generate_plan(&bore, &env, &ring).unwrap();
        assert_eq!(plan.len(), 72);
        assert!(plan.all_points().iter().all(|p| p.x == bore.x_ref));
        assert_constraints(&plan, &bore, &env, &ring);

        let plan = generate_plan(&bore, &env, &angled).unwrap();
        assert!(!plan.is_empty());
        assert!(plan.segments.iter().all(|s| !s.is_empty()));
        assert_constraints(&plan, &bore, &env, &angled);

        // Measured touch planes are arbitrary decimals.
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            bore.x_ref = (rng.gen::<f64>() * 100_000.0).round() / 1000.0;
            bore.length = 300.0 + (rng.gen::<f64>() * 10_000.0).round() / 100.0;
            let plan = generate_plan(&bore, &env, &ring).unwrap();
            assert_eq!(plan.len(), 72, "x_ref {} length {}", bore.x_ref, bore.length);
        }
    }

    #[test]
    fn far_region_gives_empty_plan() {
        let cfg = SweepConfig {
            region: RegionShape::Sphere {
                center: Point3::new(1000.0, 1000.0, 1000.0),
                radius: 1.0,
            },
            ..Default::default()
        };
        let plan = generate_plan(&lab_bore(), &Envelope::default(), &cfg).expect("no error");
        assert!(plan.is_empty());
        assert_eq!(plan.len(), 0);
    }

    #[test]
    fn region_restricts_dense_plan() {
        let bore = lab_bore();
        let env = Envelope::default();
        let cfg = SweepConfig {
            region: RegionShape::Cuboid {
                center: Point3::new(200.0, 125.0, -25.0),
                length: 100.0,
                width: 60.0,
                height: 60.0,
            },
            ..Default::default()
        };
        let plan = generate_plan(&bore, &env, &cfg).unwrap();
        // x 150..=250, y 100..=150, z -50..=0 on the 10 mm lattice.
        assert_eq!(plan.len(), 11 * 6 * 6);
        assert_constraints(&plan, &bore, &env, &cfg);
    }

    #[test]
    fn clearance_must_leave_room() {
        let cfg = SweepConfig {
            clearance: 150.0,
            ..Default::default()
        };
        let err = generate_plan(&lab_bore(), &Envelope::default(), &cfg).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidClearance { .. }));
    }

    #[test]
    fn ring_sits_on_clearance_circle() {
        let bore = BoreGeometry {
            fit: CylinderFit::new(125.0, -25.0, 100.0),
            x_ref: 5.0,
            length: 440.0,
        };
        let env = Envelope::default();
        let cfg = SweepConfig {
            pattern: SweepPattern::ring(),
            ..Default::default()
        };
        let plan = generate_plan(&bore, &env, &cfg).unwrap();
        let seg = plan.segment("ring").expect("ring segment");
        assert_eq!(seg.len(), 72);
        let thetas = seg.coords.as_ref().unwrap();
        assert_eq!(thetas.len(), 72);
        assert_abs_diff_eq!(thetas[1], std::f64::consts::PI / 36.0, epsilon = 1e-12);
        for p in &seg.points {
            assert_eq!(p.x, 5.0);
            assert_abs_diff_eq!(p.radial_distance_yz(&bore.interior_center()), 80.0, epsilon = 1e-5);
        }
        // θ = 0 starts on the −y side.
        assert_abs_diff_eq!(seg.points[0].y, 45.0, epsilon = 1e-5);
    }

    #[test]
    fn ring_touching_envelope_faces_is_kept() {
        // Usable circle of radius 125 around (125, -25) grazes y=0, y=250,
        // z=-150 and z=100.
        let bore = lab_bore();
        let env = Envelope::default();
        let cfg = SweepConfig {
            pattern: SweepPattern::ring(),
            ..Default::default()
        };
        let plan = generate_plan(&bore, &env, &cfg).unwrap();
        assert_eq!(plan.len(), 72);
        assert_constraints(&plan, &bore, &env, &cfg);
    }

    #[test]
    fn ring_is_clipped_by_envelope() {
        let bore = lab_bore();
        let env = Envelope::new([0.0, 375.0], [0.0, 200.0], [-150.0, 100.0]).unwrap();
        let cfg = SweepConfig {
            pattern: SweepPattern::ring(),
            ..Default::default()
        };
        let plan = generate_plan(&bore, &env, &cfg).unwrap();
        let seg = &plan.segments[0];
        assert!(!seg.is_empty() && seg.len() < 72);
        assert_eq!(seg.coords.as_ref().unwrap().len(), seg.len());
        assert_constraints(&plan, &bore, &env, &cfg);
    }

    #[test]
    fn angled_lines_are_labelled_and_clipped() {
        let bore = lab_bore();
        let env = Envelope::default();
        let cfg = SweepConfig {
            pattern: SweepPattern::angled_lines(),
            ..Default::default()
        };
        let plan = generate_plan(&bore, &env, &cfg).unwrap();
        let labels: Vec<&str> = plan.segments.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["angle_90", "angle_45", "angle_0", "angle_-45"]);
        assert_constraints(&plan, &bore, &env, &cfg);

        let horizontal = plan.segment("angle_0").unwrap();
        let radii = horizontal.coords.as_ref().unwrap();
        assert_eq!(radii.len(), horizontal.len());
        assert!(horizontal.len() < 30);
        for (p, s) in horizontal.points.iter().zip(radii) {
            assert!(s.abs() <= 125.0);
            assert_abs_diff_eq!(p.y, 125.0 + s, epsilon = 1e-9);
            assert_abs_diff_eq!(p.z, -25.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn quadrant_lines_follow_the_axis() {
        let bore = lab_bore();
        let env = Envelope::default();
        let cfg = SweepConfig {
            pattern: SweepPattern::quadrant_lines(),
            ..Default::default()
        };
        let plan = generate_plan(&bore, &env, &cfg).unwrap();
        let labels: Vec<&str> = plan.segments.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            ["quadrant_0", "quadrant_1", "quadrant_2", "quadrant_3", "quadrant_4"]
        );
        assert_constraints(&plan, &bore, &env, &cfg);

        let q1 = plan.segment("quadrant_1").unwrap();
        // x from 5 to 375 in 10 mm steps, clipped by the envelope.
        assert_eq!(q1.len(), 38);
        assert_eq!(q1.points[0], Point3::new(5.0, 52.5, 47.5));
        assert!(q1.points.windows(2).all(|w| w[1].x > w[0].x));

        let q0 = plan.segment("quadrant_0").unwrap();
        assert!(q0.points.iter().all(|p| p.y == 125.0 && p.z == -25.0));
    }

    #[test]
    fn quadrant_lines_reject_bad_step() {
        let cfg = SweepConfig {
            pattern: SweepPattern::QuadrantLine {
                quadrants: vec![1],
                lateral_fraction: 0.5,
                step: 0.0,
                include_axis: false,
            },
            ..Default::default()
        };
        assert!(matches!(
            generate_plan(&lab_bore(), &Envelope::default(), &cfg),
            Err(GeometryError::InvalidSpacing { .. })
        ));
    }

    #[test]
    fn pattern_json_fills_defaults() {
        let p: SweepPattern = serde_json::from_str(r#"{"kind":"ring"}"#).unwrap();
        assert_eq!(p, SweepPattern::ring());
        let p: SweepPattern =
            serde_json::from_str(r#"{"kind":"angled_line","samples":11}"#).unwrap();
        match p {
            SweepPattern::AngledLine {
                samples, angles_deg, ..
            } => {
                assert_eq!(samples, 11);
                assert_eq!(angles_deg, vec![90.0, 45.0, 0.0, -45.0]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
