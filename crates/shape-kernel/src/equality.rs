//! Tolerance-aware comparisons shared by the shape kernels.
//!
//! Geometric equality compares what a shape occupies, not how it is
//! parameterized. Each kernel composes these helpers according to the
//! rotations it is blind to.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::geometry::pose::Pose;
use crate::geometry::vector::Vec3;

/// `|a - b| <= epsilon`. NaN compares unequal.
pub fn scalars_equal(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// Pose origins within Euclidean distance `epsilon`.
pub fn translations_equal(a: &Pose, b: &Pose, epsilon: f64) -> bool {
    a.position().distance_to(&b.position()) <= epsilon
}

/// Directions agree up to sign within angle `epsilon`.
///
/// An axis known only up to sign wraps at `PI / 2`, so any larger tolerance
/// accepts every pair.
pub fn axes_parallel(a: &Vec3, b: &Vec3, epsilon: f64) -> bool {
    if epsilon >= FRAC_PI_2 {
        return true;
    }
    a.is_parallel_to(b, epsilon)
}

/// Relative rotation angle of the two poses within `epsilon`.
/// Every pair is equal once `epsilon` reaches `PI`.
pub fn orientations_equal(a: &Pose, b: &Pose, epsilon: f64) -> bool {
    if epsilon >= PI {
        return true;
    }
    a.rotation_angle_to(b) <= epsilon
}

const AXIS_PERMUTATIONS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// Matches two frames carrying one extent per local axis.
///
/// Succeeds when some relabeling of `b`'s axes pairs every extent of `a` with
/// an equal extent of `b` along a parallel (or antiparallel) axis. When
/// `free_when_repeated` is set, an axis of `a` whose extent repeats on
/// another axis of `a` is free to spin and its direction is not checked.
pub fn axis_extents_equal(
    pose_a: &Pose,
    extents_a: [f64; 3],
    pose_b: &Pose,
    extents_b: [f64; 3],
    epsilon: f64,
    free_when_repeated: bool,
) -> bool {
    let free: [bool; 3] = std::array::from_fn(|i| {
        free_when_repeated
            && (0..3).any(|j| j != i && scalars_equal(extents_a[i], extents_a[j], epsilon))
    });

    AXIS_PERMUTATIONS.iter().any(|sigma| {
        (0..3).all(|i| {
            scalars_equal(extents_a[i], extents_b[sigma[i]], epsilon)
                && (free[i] || axes_parallel(&pose_a.column(i), &pose_b.column(sigma[i]), epsilon))
        })
    })
}
