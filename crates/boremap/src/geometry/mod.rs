//! Geometry primitives for bore-interior point planning.
//!
//! Implements:
//! - `Point3` / `PointSet` / `Envelope` value types.
//! - Linear and Euclidean distance helpers.
//! - Inclusive point-in-cuboid, point-in-cylinder (axis ∥ x) and point-in-sphere filters.
//! - Half-open lattice generation over the gantry envelope.

mod filter;
mod lattice;
mod types;

pub use filter::{
    euclidean_distance, in_cuboid, in_cylinder, in_sphere, linear_distance, points_in_cuboid,
    points_in_cylinder, points_in_sphere, RegionShape,
};
pub use lattice::{axis_samples, generate_lattice};
pub(crate) use types::clamp_axis;
pub use types::{Envelope, GeometryError, Point3, PointSet};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lab_envelope() -> Envelope {
        Envelope::new([0.0, 375.0], [0.0, 250.0], [-150.0, 100.0]).expect("valid envelope")
    }

    #[test]
    fn lattice_counts_follow_half_open_ranges() {
        let env = lab_envelope();
        assert_eq!(axis_samples(env.x[0], env.x[1], 50.0).len(), 8);
        assert_eq!(axis_samples(env.y[0], env.y[1], 50.0).len(), 5);
        assert_eq!(axis_samples(env.z[0], env.z[1], 50.0).len(), 5);

        let pts = generate_lattice(&env, 50.0).expect("lattice");
        assert_eq!(pts.len(), 8 * 5 * 5);
        assert_eq!(pts[0], Point3::new(0.0, 0.0, -150.0));
        assert_eq!(*pts.last().unwrap(), Point3::new(350.0, 200.0, 50.0));
        assert!(pts.iter().all(|p| p.x < 375.0 && p.y < 250.0 && p.z < 100.0));
    }

    #[test]
    fn lattice_rejects_non_positive_spacing() {
        let env = lab_envelope();
        for spacing in [0.0, -5.0, f64::NAN] {
            match generate_lattice(&env, spacing) {
                Err(GeometryError::InvalidSpacing { .. }) => {}
                other => panic!("expected InvalidSpacing for {spacing}, got {other:?}"),
            }
        }
    }

    #[test]
    fn lattice_uses_index_not_accumulation() {
        let xs = axis_samples(0.0, 1.0, 0.1);
        assert_eq!(xs.len(), 10);
        assert_relative_eq!(xs[7], 0.7, epsilon = 1e-15);
    }

    #[test]
    fn envelope_validation() {
        assert!(Envelope::new([1.0, 0.0], [0.0, 1.0], [0.0, 1.0]).is_err());
        assert!(Envelope::new([0.0, 0.0], [0.0, 1.0], [0.0, f64::INFINITY]).is_err());
        let env = lab_envelope();
        assert!(env.contains(&Point3::new(375.0, 250.0, 100.0)));
        assert!(!env.contains(&Point3::new(375.1, 0.0, 0.0)));
        assert_eq!(
            env.clamp(&Point3::new(-4.0, 300.0, 20.0)),
            Point3::new(0.0, 250.0, 20.0)
        );
    }

    #[test]
    fn euclidean_distance_pairs_and_mismatch() {
        let a = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 2.0)];
        let b = vec![Point3::new(3.0, 4.0, 0.0), Point3::new(1.0, 2.0, 2.0)];
        let d = euclidean_distance(&a, &b).expect("same length");
        assert_relative_eq!(d[0], 5.0);
        assert_relative_eq!(d[1], 0.0);

        let err = euclidean_distance(&a, &b[..1]).unwrap_err();
        assert_eq!(err, GeometryError::DimensionMismatch { left: 2, right: 1 });
    }

    #[test]
    fn cylinder_boundary_is_inclusive() {
        let center = Point3::new(0.0, 10.0, -5.0);
        let radius = 100.0;
        let on = Point3::new(0.0, 10.0 + radius, -5.0);
        let off = Point3::new(0.0, 10.0 + radius + 1e-9, -5.0);
        let kept = points_in_cylinder(&[on, off], &center, radius, 10.0);
        assert_eq!(kept, vec![on]);

        // Axial boundary is inclusive as well.
        let end = Point3::new(5.0, 10.0, -5.0);
        let past = Point3::new(5.0 + 1e-9, 10.0, -5.0);
        assert_eq!(
            points_in_cylinder(&[end, past], &center, radius, 10.0),
            vec![end]
        );
    }

    #[test]
    fn cuboid_uses_half_extents() {
        let c = Point3::new(10.0, 20.0, 30.0);
        let pts = [
            Point3::new(15.0, 20.0, 30.0),
            Point3::new(15.1, 20.0, 30.0),
            Point3::new(10.0, 24.0, 27.0),
            Point3::new(10.0, 24.0, 26.9),
        ];
        let kept = points_in_cuboid(&pts, &c, 10.0, 8.0, 6.0);
        assert_eq!(kept, vec![pts[0], pts[2]]);
    }

    #[test]
    fn sphere_filter_uses_full_center() {
        let center = Point3::new(100.0, 50.0, -20.0);
        let pts = [
            Point3::new(100.0, 50.0, -20.0),
            Point3::new(103.0, 54.0, -20.0),
            Point3::new(103.0, 54.0, -19.0),
            Point3::new(0.0, 0.0, 0.0),
        ];
        let kept = points_in_sphere(&pts, &center, 5.0);
        assert_eq!(kept, vec![pts[0], pts[1]]);
    }

    #[test]
    fn filter_conjunction_is_order_independent() {
        let env = Envelope::new([0.0, 100.0], [0.0, 100.0], [0.0, 100.0]).unwrap();
        let lattice = generate_lattice(&env, 10.0).unwrap();
        assert_eq!(lattice.len(), 1000);

        let box_center = Point3::new(40.0, 50.0, 50.0);
        let cyl_center = Point3::new(50.0, 50.0, 50.0);

        let a = points_in_cylinder(
            &points_in_cuboid(&lattice, &box_center, 60.0, 70.0, 50.0),
            &cyl_center,
            30.0,
            80.0,
        );
        let b = points_in_cuboid(
            &points_in_cylinder(&lattice, &cyl_center, 30.0, 80.0),
            &box_center,
            60.0,
            70.0,
            50.0,
        );
        assert_eq!(a.len(), b.len());
        assert!(!a.is_empty());
        for p in &a {
            assert!(in_cuboid(p, &box_center, 60.0, 70.0, 50.0));
            assert!(in_cylinder(p, &cyl_center, 30.0, 80.0));
        }
    }

    #[test]
    fn filters_are_idempotent() {
        let env = Envelope::new([0.0, 100.0], [0.0, 100.0], [0.0, 100.0]).unwrap();
        let lattice = generate_lattice(&env, 10.0).unwrap();
        let c = Point3::new(50.0, 50.0, 50.0);

        let once = points_in_sphere(&lattice, &c, 35.0);
        assert_eq!(points_in_sphere(&once, &c, 35.0), once);

        let once = points_in_cylinder(&lattice, &c, 25.0, 40.0);
        assert_eq!(points_in_cylinder(&once, &c, 25.0, 40.0), once);

        let once = points_in_cuboid(&lattice, &c, 30.0, 20.0, 50.0);
        assert_eq!(points_in_cuboid(&once, &c, 30.0, 20.0, 50.0), once);
    }

    #[test]
    fn region_shape_dispatch_matches_primitives() {
        let env = Envelope::new([0.0, 100.0], [0.0, 100.0], [0.0, 100.0]).unwrap();
        let lattice = generate_lattice(&env, 10.0).unwrap();
        let c = Point3::new(50.0, 50.0, 50.0);

        assert_eq!(RegionShape::None.apply(&lattice), lattice);
        assert_eq!(
            RegionShape::Sphere {
                center: c,
                radius: 30.0
            }
            .apply(&lattice),
            points_in_sphere(&lattice, &c, 30.0)
        );
        let shape = RegionShape::Cuboid {
            center: c,
            length: 20.0,
            width: 40.0,
            height: 60.0,
        };
        let kept = shape.apply(&lattice);
        assert!(kept.iter().all(|p| shape.contains(p)));
        assert_eq!(kept, points_in_cuboid(&lattice, &c, 20.0, 40.0, 60.0));
    }

    #[test]
    fn region_shape_json_is_tagged() {
        let shape: RegionShape = serde_json::from_str(
            r#"{"kind":"sphere","center":{"x":1.0,"y":2.0,"z":3.0},"radius":4.0}"#,
        )
        .expect("parse region");
        assert_eq!(
            shape,
            RegionShape::Sphere {
                center: Point3::new(1.0, 2.0, 3.0),
                radius: 4.0
            }
        );
        let none: RegionShape = serde_json::from_str(r#"{"kind":"none"}"#).unwrap();
        assert!(none.is_none());
    }
}
