//! Property-based tests for shape query invariants using the `proptest` crate.

use std::f64::consts::{FRAC_PI_2, PI};

use proptest::prelude::*;

use shape_kernel::geometry::point::Point3d;
use shape_kernel::geometry::pose::Pose;
use shape_kernel::geometry::vector::Vec3;
use shape_kernel::shapes::{
    Box3d, Cylinder3d, Ellipsoid3d, Ramp3d, Shape, Sphere3d, Torus3d,
};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Arbitrary query point around the shapes under test.
fn arb_point() -> impl Strategy<Value = Point3d> {
    (-10.0f64..10.0, -10.0f64..10.0, -10.0f64..10.0).prop_map(|(x, y, z)| Point3d::new(x, y, z))
}

/// Arbitrary rotation angle in radians.
fn arb_angle() -> impl Strategy<Value = f64> {
    -PI..PI
}

/// Arbitrary rigid pose: yaw/pitch/roll rotation plus a moderate translation.
fn arb_pose() -> impl Strategy<Value = Pose> {
    (
        arb_angle(),
        arb_angle(),
        arb_angle(),
        (-5.0f64..5.0, -5.0f64..5.0, -5.0f64..5.0),
    )
        .prop_map(|(yaw, pitch, roll, (tx, ty, tz))| {
            let mut pose = Pose::from_yaw_pitch_roll(yaw, pitch, roll);
            pose.set_translation(Vec3::new(tx, ty, tz));
            pose
        })
}

/// Arbitrary positive dimension (avoids degenerate zero-size shapes).
fn arb_dim() -> impl Strategy<Value = f64> {
    0.1f64..5.0
}

fn arb_torus() -> impl Strategy<Value = Torus3d> {
    (arb_pose(), 0.5f64..5.0, 0.05f64..0.9).prop_map(|(pose, radius, tube_fraction)| {
        Torus3d::new(pose, radius, radius * tube_fraction).unwrap()
    })
}

/// Any kind of shape with an arbitrary pose and valid dimensions.
fn arb_shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        (arb_point(), arb_dim()).prop_map(|(center, radius)| {
            Shape::from(Sphere3d::new(center, radius).unwrap())
        }),
        (arb_pose(), arb_dim(), arb_dim()).prop_map(|(pose, radius, height)| {
            Shape::from(Cylinder3d::new(pose, radius, height).unwrap())
        }),
        arb_torus().prop_map(Shape::from),
        (arb_pose(), arb_dim(), arb_dim(), arb_dim()).prop_map(|(pose, l, w, h)| {
            Shape::from(Ramp3d::new(pose, l, w, h).unwrap())
        }),
        (arb_pose(), arb_dim(), arb_dim(), arb_dim()).prop_map(|(pose, l, w, h)| {
            Shape::from(Box3d::new(pose, l, w, h).unwrap())
        }),
        (arb_pose(), arb_dim(), arb_dim(), arb_dim()).prop_map(|(pose, rx, ry, rz)| {
            Shape::from(Ellipsoid3d::new(pose, rx, ry, rz).unwrap())
        }),
    ]
}

/// Builds the same kind of shape twice, the second with one dimension
/// shifted by `offset`. Dimensions stay pairwise distinct so box and
/// ellipsoid axes cannot be relabeled onto each other.
fn shifted_pair(kind: usize, pose: Pose, base: f64, offset: f64) -> (Shape, Shape) {
    let build = |delta: f64| -> Shape {
        match kind {
            0 => Sphere3d::new(pose.position(), base + delta).unwrap().into(),
            1 => Cylinder3d::new(pose, base, base + 1.0 + delta).unwrap().into(),
            2 => Torus3d::new(pose, base + 2.0, base * 0.2 + delta).unwrap().into(),
            3 => Ramp3d::new(pose, base, base + 1.0 + delta, base + 2.0).unwrap().into(),
            4 => Box3d::new(pose, base + delta, base + 1.0, base + 2.0).unwrap().into(),
            _ => Ellipsoid3d::new(pose, base, base + 1.0, base + 2.0 + delta).unwrap().into(),
        }
    };
    (build(0.0), build(offset))
}

const TOL: f64 = 1e-6;

// ---------------------------------------------------------------------------
// 1. Pose round trip: world -> local -> world returns the starting point
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn pose_transform_roundtrip(pose in arb_pose(), p in arb_point()) {
        let back = pose.transform_to_world(&pose.transform_to_local(&p));
        prop_assert!(back.distance_to(&p) < TOL,
            "round trip moved {} to {}", p, back);
    }
}

// ---------------------------------------------------------------------------
// 2. Poses are rigid: distances between points are preserved
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn pose_preserves_distance(pose in arb_pose(), a in arb_point(), b in arb_point()) {
        let before = a.distance_to(&b);
        let after = pose.transform_to_world(&a).distance_to(&pose.transform_to_world(&b));
        prop_assert!((before - after).abs() < TOL,
            "distance changed from {} to {}", before, after);
    }
}

// ---------------------------------------------------------------------------
// 3. Idempotent projection: project(project(p)) == project(p)
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn projection_is_idempotent(shape in arb_shape(), p in arb_point()) {
        let once = shape.orthogonal_projection_copy(&p);
        let twice = shape.orthogonal_projection_copy(&once);
        prop_assert!(once.distance_to(&twice) < TOL,
            "{}: projecting {} twice moved {} to {}", shape.shape_type_name(), p, once, twice);
    }
}

// ---------------------------------------------------------------------------
// 4. Projected outside points land on the surface
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn projection_lands_on_surface(shape in arb_shape(), p in arb_point()) {
        let mut q = p;
        if shape.orthogonal_projection(&mut q) {
            let d = shape.distance(&q);
            prop_assert!(d.abs() < TOL,
                "{}: projection of {} is {} away from the surface", shape.shape_type_name(), p, d);
        } else {
            prop_assert_eq!(q, p);
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Query consistency: unit normal, |p - closest| == |distance|
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn query_is_self_consistent(shape in arb_shape(), p in arb_point()) {
        let query = shape.query(&p);
        prop_assert!((query.normal.length() - 1.0).abs() < TOL,
            "{}: normal {} is not unit length", shape.shape_type_name(), query.normal);
        let gap = p.distance_to(&query.closest_point);
        prop_assert!((gap - query.distance.abs()).abs() < TOL,
            "{}: |p - closest| = {} but distance = {}",
            shape.shape_type_name(), gap, query.distance);
        prop_assert!((shape.distance(&p) - query.distance).abs() < TOL);
    }
}

// ---------------------------------------------------------------------------
// 6. Containment and signed distance agree away from the boundary
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn containment_matches_distance_sign(shape in arb_shape(), p in arb_point()) {
        let d = shape.distance(&p);
        prop_assume!(d.abs() > 1e-9);
        prop_assert_eq!(shape.check_if_inside(&p), shape.is_inside_or_on_surface(&p),
            "{}: distance {} at {}", shape.shape_type_name(), d, p);
        prop_assert_eq!(shape.check_if_inside(&p), d < 0.0);
    }
}

// ---------------------------------------------------------------------------
// 7. A positive epsilon only ever grows the contained region
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn epsilon_inflates_containment(
        shape in arb_shape(),
        p in arb_point(),
        epsilon in 0.0f64..1.0,
    ) {
        if shape.is_inside_or_on_surface(&p) {
            prop_assert!(shape.is_inside_epsilon(&p, epsilon));
        }
        if !shape.is_inside_epsilon(&p, epsilon) {
            prop_assert!(!shape.is_inside_or_on_surface(&p));
        }
    }
}

// ---------------------------------------------------------------------------
// 8. Torus symmetry: spinning about its own axis keeps the geometry
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn torus_spin_invariance(torus in arb_torus(), angle in arb_angle()) {
        let mut spun = torus.clone();
        spun.append_transform(&Pose::from_axis_angle(Vec3::Z, angle));
        prop_assert!(torus.geometrically_equals(&spun, 1e-9),
            "spin by {} broke equality", angle);
        prop_assert!(spun.geometrically_equals(&torus, 1e-9));
    }
}

// ---------------------------------------------------------------------------
// 9. Equality tolerance: 0.99 eps accepted, 1.01 eps rejected, both ways
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn equality_tolerance_is_symmetric(
        kind in 0usize..6,
        pose in arb_pose(),
        base in 0.5f64..3.0,
        epsilon in 1e-6f64..1e-3,
        sign in prop_oneof![Just(1.0f64), Just(-1.0f64)],
    ) {
        let (a, near) = shifted_pair(kind, pose, base, sign * 0.99 * epsilon);
        prop_assert!(a.geometrically_equals(&near, epsilon),
            "{}: 0.99 eps rejected", a.shape_type_name());
        prop_assert!(near.geometrically_equals(&a, epsilon));
        prop_assert!(a.epsilon_equals(&near, epsilon));

        let (a, far) = shifted_pair(kind, pose, base, sign * 1.01 * epsilon);
        prop_assert!(!a.geometrically_equals(&far, epsilon),
            "{}: 1.01 eps accepted", a.shape_type_name());
        prop_assert!(!far.geometrically_equals(&a, epsilon));
        prop_assert!(!a.epsilon_equals(&far, epsilon));
    }
}

// ---------------------------------------------------------------------------
// 10. Angular tolerances past the symmetry period accept any orientation
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn wide_epsilon_degrades_to_equal(
        pose in arb_pose(),
        (yaw, pitch, roll) in (arb_angle(), arb_angle(), arb_angle()),
    ) {
        let turn = Pose::from_yaw_pitch_roll(yaw, pitch, roll);

        let ramp = Ramp3d::new(pose, 2.0, 1.0, 0.5).unwrap();
        let mut turned_ramp = ramp.clone();
        turned_ramp.append_transform(&turn);
        prop_assert!(ramp.geometrically_equals(&turned_ramp, PI));

        let cylinder = Cylinder3d::new(pose, 0.5, 2.0).unwrap();
        let mut turned_cylinder = cylinder.clone();
        turned_cylinder.append_transform(&turn);
        prop_assert!(cylinder.geometrically_equals(&turned_cylinder, FRAC_PI_2));
    }
}

// ---------------------------------------------------------------------------
// 11. Moving a shape moves its answers: queries are pose-relative
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn distance_follows_pose(shape in arb_shape(), motion in arb_pose(), p in arb_point()) {
        let mut moved = shape.clone();
        match &mut moved {
            Shape::Sphere(s) => s.apply_transform(&motion),
            Shape::Cylinder(s) => s.apply_transform(&motion),
            Shape::Torus(s) => s.apply_transform(&motion),
            Shape::Ramp(s) => s.apply_transform(&motion),
            Shape::Box(s) => s.apply_transform(&motion),
            Shape::Ellipsoid(s) => s.apply_transform(&motion),
        }
        let before = shape.distance(&p);
        let after = moved.distance(&motion.transform_to_world(&p));
        prop_assert!((before - after).abs() < TOL,
            "{}: distance {} became {} after moving", shape.shape_type_name(), before, after);
    }
}
