use std::fmt;

use approx::AbsDiffEq;
use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::point::Point3d;
use super::vector::Vec3;
use crate::error::ShapeError;

/// A rigid transform placing a shape frame in world coordinates.
///
/// `world = rotation * local + translation`. The rotation stays orthonormal
/// through every operation except [`Pose::set_to_nan`], which poisons it as an
/// explicit "not yet valid" marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PoseParts", into = "PoseParts")]
pub struct Pose {
    rotation: Rotation3<f64>,
    translation: Vec3,
}

/// Wire form of a [`Pose`]. The rotation is checked on the way in.
#[derive(Serialize, Deserialize)]
struct PoseParts {
    rotation: Rotation3<f64>,
    translation: Vec3,
}

impl TryFrom<PoseParts> for Pose {
    type Error = ShapeError;

    fn try_from(parts: PoseParts) -> Result<Self, ShapeError> {
        let is_nan_sentinel = parts.rotation.matrix().iter().all(|v| v.is_nan());
        if !is_nan_sentinel {
            check_orthonormal(&parts.rotation)?;
        }
        Ok(Self::new(parts.rotation, parts.translation))
    }
}

impl From<Pose> for PoseParts {
    fn from(pose: Pose) -> Self {
        Self {
            rotation: pose.rotation,
            translation: pose.translation,
        }
    }
}

/// Rejects matrices that are not a proper rotation. NaN entries never pass.
fn check_orthonormal(rotation: &Rotation3<f64>) -> Result<(), ShapeError> {
    let tolerance = crate::default_tolerance().orthonormality;
    let m = rotation.matrix();
    let orthonormality_error = (m.transpose() * m - Matrix3::identity()).amax();
    let determinant = m.determinant();
    if orthonormality_error <= tolerance && (determinant - 1.0).abs() <= tolerance {
        Ok(())
    } else {
        debug!(orthonormality_error, determinant, "rejected pose rotation");
        Err(ShapeError::InvalidRotation {
            orthonormality_error,
            determinant,
        })
    }
}

impl Pose {
    pub fn identity() -> Self {
        Self {
            rotation: Rotation3::identity(),
            translation: Vec3::ZERO,
        }
    }

    pub fn new(rotation: Rotation3<f64>, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(Rotation3::identity(), translation)
    }

    pub fn from_rotation(rotation: Rotation3<f64>) -> Self {
        Self::new(rotation, Vec3::ZERO)
    }

    /// Rotation of `angle` radians about `axis`. A zero axis gives the identity.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let rotation = Unit::try_new(Vector3::from(axis), 1e-15)
            .map(|axis| Rotation3::from_axis_angle(&axis, angle))
            .unwrap_or_else(Rotation3::identity);
        Self::from_rotation(rotation)
    }

    /// Rotation `Rz(yaw) * Ry(pitch) * Rx(roll)`.
    pub fn from_yaw_pitch_roll(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self::from_rotation(Rotation3::from_euler_angles(roll, pitch, yaw))
    }

    pub fn rotation(&self) -> &Rotation3<f64> {
        &self.rotation
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn position(&self) -> Point3d {
        Point3d::from(self.translation)
    }

    pub fn set_rotation(&mut self, rotation: Rotation3<f64>) {
        self.rotation = rotation;
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    /// Rotation matrix entry, 0-indexed.
    pub fn m(&self, row: usize, col: usize) -> f64 {
        self.rotation.matrix()[(row, col)]
    }

    /// Column `col` of the rotation matrix: the shape frame axis in world coordinates.
    pub fn column(&self, col: usize) -> Vec3 {
        Vec3::new(self.m(0, col), self.m(1, col), self.m(2, col))
    }

    pub fn axis_x(&self) -> Vec3 {
        self.column(0)
    }

    pub fn axis_y(&self) -> Vec3 {
        self.column(1)
    }

    pub fn axis_z(&self) -> Vec3 {
        self.column(2)
    }

    /// Shape frame to world frame (applies translation).
    pub fn transform_to_world(&self, local: &Point3d) -> Point3d {
        Point3d::from(self.transform_vector_to_world(&local.to_vec3()) + self.translation)
    }

    /// World frame to shape frame (applies translation).
    pub fn transform_to_local(&self, world: &Point3d) -> Point3d {
        Point3d::from(self.transform_vector_to_local(&(*world - self.position())))
    }

    /// Rotation only.
    pub fn transform_vector_to_world(&self, local: &Vec3) -> Vec3 {
        Vec3::from(self.rotation * Vector3::from(*local))
    }

    /// Inverse rotation only.
    pub fn transform_vector_to_local(&self, world: &Vec3) -> Vec3 {
        Vec3::from(self.rotation.transpose() * Vector3::from(*world))
    }

    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.transpose();
        let translation = -Vec3::from(rotation * Vector3::from(self.translation));
        Self::new(rotation, translation)
    }

    /// Compose two poses: `self * other`.
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose::new(
            self.rotation * other.rotation,
            self.transform_to_world(&other.position()).to_vec3(),
        )
    }

    /// `self = self * other`: `other` is expressed in this pose's frame.
    pub fn append_transform(&mut self, other: &Pose) {
        *self = self.compose(other);
    }

    /// `self = other * self`: `other` is expressed in the world frame.
    pub fn prepend_transform(&mut self, other: &Pose) {
        *self = other.compose(self);
    }

    /// Moves the origin by `offset` expressed in this pose's frame.
    pub fn append_translation(&mut self, offset: Vec3) {
        self.translation += self.transform_vector_to_world(&offset);
    }

    /// Angle of the relative rotation `self^T * other`, in `[0, PI]`.
    ///
    /// Computed from the skew-symmetric part (`2 sin`) and the trace (`1 + 2 cos`)
    /// with `atan2`, so angles near zero keep their precision.
    pub fn rotation_angle_to(&self, other: &Pose) -> f64 {
        let relative = self.rotation.transpose() * other.rotation;
        let m = relative.matrix();
        let skew = Vec3::new(
            m[(2, 1)] - m[(1, 2)],
            m[(0, 2)] - m[(2, 0)],
            m[(1, 0)] - m[(0, 1)],
        );
        let two_cos = m.trace() - 1.0;
        skew.length().atan2(two_cos)
    }

    /// Identity rotation and zero translation.
    pub fn set_to_zero(&mut self) {
        *self = Self::identity();
    }

    pub fn set_to_nan(&mut self) {
        self.rotation = Rotation3::from_matrix_unchecked(Matrix3::repeat(f64::NAN));
        self.translation = Vec3::NAN;
    }

    pub fn contains_nan(&self) -> bool {
        self.rotation.matrix().iter().any(|v| v.is_nan()) || self.translation.contains_nan()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Component-wise comparison of every rotation entry and translation component.
impl AbsDiffEq for Pose {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.rotation
            .matrix()
            .iter()
            .zip(other.rotation.matrix().iter())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
            && self.translation.abs_diff_eq(&other.translation, epsilon)
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.translation.to_array();
        for row in 0..3 {
            if row > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{:.3}, {:.3}, {:.3} | {:.3}",
                self.m(row, 0),
                self.m(row, 1),
                self.m(row, 2),
                t[row]
            )?;
        }
        Ok(())
    }
}
