use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::equality::{axis_extents_equal, scalars_equal, translations_equal};
use crate::error::ShapeError;
use crate::geometry::point::Point3d;
use crate::geometry::pose::Pose;
use crate::geometry::vector::Vec3;

use super::{Shape3d, ShapeKernel, SurfaceQuery};

/// An axis-aligned ellipsoid centered on the origin with semi-axes
/// `radius_x`, `radius_y` and `radius_z`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EllipsoidDimensions", into = "EllipsoidDimensions")]
pub struct Ellipsoid {
    radii: Vec3,
}

#[derive(Serialize, Deserialize)]
struct EllipsoidDimensions {
    radius_x: f64,
    radius_y: f64,
    radius_z: f64,
}

impl TryFrom<EllipsoidDimensions> for Ellipsoid {
    type Error = ShapeError;

    fn try_from(dims: EllipsoidDimensions) -> Result<Self, ShapeError> {
        Ellipsoid::new(dims.radius_x, dims.radius_y, dims.radius_z)
    }
}

impl From<Ellipsoid> for EllipsoidDimensions {
    fn from(ellipsoid: Ellipsoid) -> Self {
        Self {
            radius_x: ellipsoid.radii.x,
            radius_y: ellipsoid.radii.y,
            radius_z: ellipsoid.radii.z,
        }
    }
}

impl Ellipsoid {
    /// Semi-axes are divided by during evaluation and must stay away from zero.
    pub const MIN_RADIUS: f64 = 1e-4;

    #[instrument]
    pub fn new(radius_x: f64, radius_y: f64, radius_z: f64) -> Result<Self, ShapeError> {
        Self::validate(radius_x, radius_y, radius_z)?;
        debug!(radius_x, radius_y, radius_z, "created ellipsoid");
        Ok(Self {
            radii: Vec3::new(radius_x, radius_y, radius_z),
        })
    }

    fn validate(radius_x: f64, radius_y: f64, radius_z: f64) -> Result<(), ShapeError> {
        ShapeError::check_minimum(Self::NAME, "radius x", radius_x, Self::MIN_RADIUS)?;
        ShapeError::check_minimum(Self::NAME, "radius y", radius_y, Self::MIN_RADIUS)?;
        ShapeError::check_minimum(Self::NAME, "radius z", radius_z, Self::MIN_RADIUS)
    }

    pub fn radius_x(&self) -> f64 {
        self.radii.x
    }

    pub fn radius_y(&self) -> f64 {
        self.radii.y
    }

    pub fn radius_z(&self) -> f64 {
        self.radii.z
    }

    pub fn radii(&self) -> Vec3 {
        self.radii
    }

    #[instrument(skip(self))]
    pub fn set_radii(
        &mut self,
        radius_x: f64,
        radius_y: f64,
        radius_z: f64,
    ) -> Result<(), ShapeError> {
        Self::validate(radius_x, radius_y, radius_z)?;
        self.radii = Vec3::new(radius_x, radius_y, radius_z);
        debug!(radius_x, radius_y, radius_z, "resized ellipsoid");
        Ok(())
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self {
            radii: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl fmt::Display for Ellipsoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ellipsoid: radii = {}", self.radii)
    }
}

impl ShapeKernel for Ellipsoid {
    const NAME: &'static str = "Ellipsoid";

    fn is_inside_epsilon_local(&self, point: &Point3d, epsilon: f64) -> bool {
        let a = self.radii.x + epsilon;
        let b = self.radii.y + epsilon;
        let c = self.radii.z + epsilon;
        if !(a > 0.0 && b > 0.0 && c > 0.0) {
            return false;
        }
        let (a2, b2, c2) = (a * a, b * b, c * c);
        point.x * point.x * b2 * c2 + point.y * point.y * a2 * c2 + point.z * point.z * a2 * b2
            <= a2 * b2 * c2
    }

    fn evaluate_local(&self, point: &Point3d) -> SurfaceQuery {
        let r = self.radii;
        let scaled = Vec3::new(point.x / r.x, point.y / r.y, point.z / r.z);
        let k = scaled.length();

        if crate::default_tolerance().is_zero_length(k) {
            // Nearest surface from the center: the end of the shortest semi-axis.
            let radii = r.to_array();
            let mut axis = 0;
            for i in 1..3 {
                if radii[i] < radii[axis] {
                    axis = i;
                }
            }
            let mut normal = [0.0; 3];
            normal[axis] = 1.0;
            let normal = Vec3::from_array(normal);
            return SurfaceQuery::new(-radii[axis], Point3d::from(normal * radii[axis]), normal);
        }

        let closest = Point3d::from(point.to_vec3() / k);
        let gradient = Vec3::new(
            closest.x / (r.x * r.x),
            closest.y / (r.y * r.y),
            closest.z / (r.z * r.z),
        );
        let normal = gradient.normalized().unwrap_or(Vec3::Z);
        let distance = point.distance_from_origin() * (1.0 - 1.0 / k);
        SurfaceQuery::new(distance, closest, normal)
    }

    fn dimensions_equal(&self, other: &Self, epsilon: f64) -> bool {
        scalars_equal(self.radii.x, other.radii.x, epsilon)
            && scalars_equal(self.radii.y, other.radii.y, epsilon)
            && scalars_equal(self.radii.z, other.radii.z, epsilon)
    }

    /// Semi-axes may be relabeled, and any axis sharing its radius with
    /// another is free to spin.
    fn geometrically_equals(
        &self,
        pose: &Pose,
        other: &Self,
        other_pose: &Pose,
        epsilon: f64,
    ) -> bool {
        translations_equal(pose, other_pose, epsilon)
            && axis_extents_equal(
                pose,
                self.radii.to_array(),
                other_pose,
                other.radii.to_array(),
                epsilon,
                true,
            )
    }

    fn zeroed() -> Self {
        Self { radii: Vec3::ZERO }
    }

    fn nan() -> Self {
        Self { radii: Vec3::NAN }
    }

    fn contains_nan(&self) -> bool {
        self.radii.contains_nan()
    }
}

impl Shape3d<Ellipsoid> {
    pub fn new(
        pose: Pose,
        radius_x: f64,
        radius_y: f64,
        radius_z: f64,
    ) -> Result<Self, ShapeError> {
        Ok(Self::from_parts(
            pose,
            Ellipsoid::new(radius_x, radius_y, radius_z)?,
        ))
    }

    pub fn radii(&self) -> Vec3 {
        self.kernel.radii()
    }

    pub fn set_radii(
        &mut self,
        radius_x: f64,
        radius_y: f64,
        radius_z: f64,
    ) -> Result<(), ShapeError> {
        self.kernel.set_radii(radius_x, radius_y, radius_z)
    }
}
