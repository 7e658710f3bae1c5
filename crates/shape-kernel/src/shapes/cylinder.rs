use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::equality::{axes_parallel, scalars_equal, translations_equal};
use crate::error::ShapeError;
use crate::geometry::point::Point3d;
use crate::geometry::pose::Pose;
use crate::geometry::vector::Vec3;

use super::{Shape3d, ShapeKernel, SurfaceQuery};

/// A solid cylinder around the local Z axis, centered on the origin and
/// spanning `z` in `[-height / 2, height / 2]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CylinderDimensions", into = "CylinderDimensions")]
pub struct Cylinder {
    radius: f64,
    height: f64,
}

#[derive(Serialize, Deserialize)]
struct CylinderDimensions {
    radius: f64,
    height: f64,
}

impl TryFrom<CylinderDimensions> for Cylinder {
    type Error = ShapeError;

    fn try_from(dims: CylinderDimensions) -> Result<Self, ShapeError> {
        Cylinder::new(dims.radius, dims.height)
    }
}

impl From<Cylinder> for CylinderDimensions {
    fn from(cylinder: Cylinder) -> Self {
        Self {
            radius: cylinder.radius,
            height: cylinder.height,
        }
    }
}

impl Cylinder {
    pub const MIN_RADIUS: f64 = 0.0;
    pub const MIN_HEIGHT: f64 = 0.0;

    #[instrument]
    pub fn new(radius: f64, height: f64) -> Result<Self, ShapeError> {
        Self::validate(radius, height)?;
        debug!(radius, height, "created cylinder");
        Ok(Self { radius, height })
    }

    fn validate(radius: f64, height: f64) -> Result<(), ShapeError> {
        ShapeError::check_minimum(Self::NAME, "radius", radius, Self::MIN_RADIUS)?;
        ShapeError::check_minimum(Self::NAME, "height", height, Self::MIN_HEIGHT)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn half_height(&self) -> f64 {
        0.5 * self.height
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<(), ShapeError> {
        self.set_size(radius, self.height)
    }

    pub fn set_height(&mut self, height: f64) -> Result<(), ShapeError> {
        self.set_size(self.radius, height)
    }

    #[instrument(skip(self))]
    pub fn set_size(&mut self, radius: f64, height: f64) -> Result<(), ShapeError> {
        Self::validate(radius, height)?;
        self.radius = radius;
        self.height = height;
        debug!(radius, height, "resized cylinder");
        Ok(())
    }
}

impl Default for Cylinder {
    fn default() -> Self {
        Self {
            radius: 0.5,
            height: 1.0,
        }
    }
}

impl fmt::Display for Cylinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cylinder: radius = {}, height = {}",
            self.radius, self.height
        )
    }
}

impl ShapeKernel for Cylinder {
    const NAME: &'static str = "Cylinder";

    fn is_inside_epsilon_local(&self, point: &Point3d, epsilon: f64) -> bool {
        if point.z.abs() > self.half_height() + epsilon {
            return false;
        }
        point.x.hypot(point.y) <= self.radius + epsilon
    }

    fn evaluate_local(&self, point: &Point3d) -> SurfaceQuery {
        let half_height = self.half_height();
        let rho_squared = point.x * point.x + point.y * point.y;
        let rho = rho_squared.sqrt();

        // On the axis every radial direction is equally close; pick +X.
        let (dir_x, dir_y) = if crate::default_tolerance().is_on_axis(rho_squared) {
            (1.0, 0.0)
        } else {
            (point.x / rho, point.y / rho)
        };
        let cap_sign = if point.z >= 0.0 { 1.0 } else { -1.0 };

        let side = |distance: f64| {
            SurfaceQuery::new(
                distance,
                Point3d::new(dir_x * self.radius, dir_y * self.radius, point.z),
                Vec3::new(dir_x, dir_y, 0.0),
            )
        };
        let cap = |distance: f64| {
            SurfaceQuery::new(
                distance,
                Point3d::new(point.x, point.y, cap_sign * half_height),
                Vec3::new(0.0, 0.0, cap_sign),
            )
        };

        let radial_gap = self.radius - rho;
        let axial_gap = half_height - point.z.abs();
        match (radial_gap >= 0.0, axial_gap >= 0.0) {
            (true, true) => {
                // Ties go to the lateral surface.
                if axial_gap < radial_gap {
                    cap(-axial_gap)
                } else {
                    side(-radial_gap)
                }
            }
            (false, true) => side(-radial_gap),
            (true, false) => cap(-axial_gap),
            (false, false) => {
                let rim = Point3d::new(
                    dir_x * self.radius,
                    dir_y * self.radius,
                    cap_sign * half_height,
                );
                let offset = *point - rim;
                let distance = offset.length();
                let normal = offset
                    .normalized()
                    .unwrap_or_else(|| Vec3::new(dir_x, dir_y, 0.0));
                SurfaceQuery::new(distance, rim, normal)
            }
        }
    }

    fn dimensions_equal(&self, other: &Self, epsilon: f64) -> bool {
        scalars_equal(self.radius, other.radius, epsilon)
            && scalars_equal(self.height, other.height, epsilon)
    }

    /// Spinning about the axis and flipping it end over end leave the solid unchanged.
    fn geometrically_equals(
        &self,
        pose: &Pose,
        other: &Self,
        other_pose: &Pose,
        epsilon: f64,
    ) -> bool {
        self.dimensions_equal(other, epsilon)
            && translations_equal(pose, other_pose, epsilon)
            && axes_parallel(&pose.axis_z(), &other_pose.axis_z(), epsilon)
    }

    fn zeroed() -> Self {
        Self {
            radius: 0.0,
            height: 0.0,
        }
    }

    fn nan() -> Self {
        Self {
            radius: f64::NAN,
            height: f64::NAN,
        }
    }

    fn contains_nan(&self) -> bool {
        self.radius.is_nan() || self.height.is_nan()
    }
}

impl Shape3d<Cylinder> {
    pub fn new(pose: Pose, radius: f64, height: f64) -> Result<Self, ShapeError> {
        Ok(Self::from_parts(pose, Cylinder::new(radius, height)?))
    }

    pub fn radius(&self) -> f64 {
        self.kernel.radius()
    }

    pub fn height(&self) -> f64 {
        self.kernel.height()
    }

    pub fn half_height(&self) -> f64 {
        self.kernel.half_height()
    }

    /// Revolution axis in world coordinates.
    pub fn axis(&self) -> Vec3 {
        self.pose.axis_z()
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<(), ShapeError> {
        self.kernel.set_radius(radius)
    }

    pub fn set_height(&mut self, height: f64) -> Result<(), ShapeError> {
        self.kernel.set_height(height)
    }

    pub fn set_size(&mut self, radius: f64, height: f64) -> Result<(), ShapeError> {
        self.kernel.set_size(radius, height)
    }
}
