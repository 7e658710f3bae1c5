use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::equality::{axes_parallel, scalars_equal, translations_equal};
use crate::error::ShapeError;
use crate::geometry::point::Point3d;
use crate::geometry::pose::Pose;
use crate::geometry::vector::Vec3;

use super::{Shape3d, ShapeKernel, SurfaceQuery};

/// A ring torus around the local Z axis.
///
/// `radius` is the distance from the origin to the tube center circle and
/// `tube_radius` the radius of the tube. The hole never closes:
/// `radius - tube_radius >= MIN_INNER_RADIUS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TorusDimensions", into = "TorusDimensions")]
pub struct Torus {
    radius: f64,
    tube_radius: f64,
}

#[derive(Serialize, Deserialize)]
struct TorusDimensions {
    radius: f64,
    tube_radius: f64,
}

impl TryFrom<TorusDimensions> for Torus {
    type Error = ShapeError;

    fn try_from(dims: TorusDimensions) -> Result<Self, ShapeError> {
        Torus::new(dims.radius, dims.tube_radius)
    }
}

impl From<Torus> for TorusDimensions {
    fn from(torus: Torus) -> Self {
        Self {
            radius: torus.radius,
            tube_radius: torus.tube_radius,
        }
    }
}

impl Torus {
    pub const MIN_TUBE_RADIUS: f64 = 1e-4;
    pub const MIN_INNER_RADIUS: f64 = 1e-4;

    #[instrument]
    pub fn new(radius: f64, tube_radius: f64) -> Result<Self, ShapeError> {
        Self::validate(radius, tube_radius)?;
        debug!(radius, tube_radius, "created torus");
        Ok(Self {
            radius,
            tube_radius,
        })
    }

    fn validate(radius: f64, tube_radius: f64) -> Result<(), ShapeError> {
        ShapeError::check_minimum(
            Self::NAME,
            "inner radius",
            radius - tube_radius,
            Self::MIN_INNER_RADIUS,
        )?;
        ShapeError::check_minimum(
            Self::NAME,
            "tube radius",
            tube_radius,
            Self::MIN_TUBE_RADIUS,
        )
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn tube_radius(&self) -> f64 {
        self.tube_radius
    }

    #[instrument(skip(self))]
    pub fn set_radii(&mut self, radius: f64, tube_radius: f64) -> Result<(), ShapeError> {
        Self::validate(radius, tube_radius)?;
        self.radius = radius;
        self.tube_radius = tube_radius;
        debug!(radius, tube_radius, "resized torus");
        Ok(())
    }

    /// Point of the tube center circle nearest to `(x, y)`, or `None` on the axis.
    fn tube_center(&self, x: f64, y: f64) -> Option<Point3d> {
        let xy_squared = x * x + y * y;
        if crate::default_tolerance().is_on_axis(xy_squared) {
            return None;
        }
        let scale = self.radius / xy_squared.sqrt();
        Some(Point3d::new(x * scale, y * scale, 0.0))
    }
}

impl Default for Torus {
    fn default() -> Self {
        Self {
            radius: 1.0,
            tube_radius: 0.1,
        }
    }
}

impl fmt::Display for Torus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Torus: radius = {}, tube radius = {}",
            self.radius, self.tube_radius
        )
    }
}

impl ShapeKernel for Torus {
    const NAME: &'static str = "Torus";

    fn is_inside_epsilon_local(&self, point: &Point3d, epsilon: f64) -> bool {
        // Inside the inflated tube iff the meridian disc at height z covers rho.
        let tube = self.tube_radius + epsilon;
        if tube < 0.0 || point.z.abs() > tube {
            return false;
        }
        let rho = point.x.hypot(point.y);
        let half_chord = (tube * tube - point.z * point.z).sqrt();
        // Once the inflated tube swallows the hole the inner bound goes negative.
        rho <= self.radius + half_chord && rho >= self.radius - half_chord
    }

    fn evaluate_local(&self, point: &Point3d) -> SurfaceQuery {
        let Some(center) = self.tube_center(point.x, point.y) else {
            // On the axis the nearest tube center is any point of the circle.
            // Use the one on +X and work in the X-Z half plane.
            let axis_distance = self.radius.hypot(point.z);
            let normal = Vec3::new(-self.radius, 0.0, point.z) / axis_distance;
            let center = Point3d::new(self.radius, 0.0, 0.0);
            return SurfaceQuery::new(
                axis_distance - self.tube_radius,
                center + normal * self.tube_radius,
                normal,
            );
        };

        let offset = *point - center;
        let distance = offset.length();
        if crate::default_tolerance().is_zero_length(distance) {
            let outward = center.to_vec3() / self.radius;
            return SurfaceQuery::new(
                -self.tube_radius,
                center + outward * self.tube_radius,
                outward,
            );
        }

        let normal = offset / distance;
        SurfaceQuery::new(
            distance - self.tube_radius,
            center + normal * self.tube_radius,
            normal,
        )
    }

    fn dimensions_equal(&self, other: &Self, epsilon: f64) -> bool {
        scalars_equal(self.radius, other.radius, epsilon)
            && scalars_equal(self.tube_radius, other.tube_radius, epsilon)
    }

    /// Blind to any spin about the revolution axis and to flipping it.
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
            tube_radius: 0.0,
        }
    }

    fn nan() -> Self {
        Self {
            radius: f64::NAN,
            tube_radius: f64::NAN,
        }
    }

    fn contains_nan(&self) -> bool {
        self.radius.is_nan() || self.tube_radius.is_nan()
    }
}

impl Shape3d<Torus> {
    pub fn new(pose: Pose, radius: f64, tube_radius: f64) -> Result<Self, ShapeError> {
        Ok(Self::from_parts(pose, Torus::new(radius, tube_radius)?))
    }

    pub fn radius(&self) -> f64 {
        self.kernel.radius()
    }

    pub fn tube_radius(&self) -> f64 {
        self.kernel.tube_radius()
    }

    /// Revolution axis in world coordinates.
    pub fn axis(&self) -> Vec3 {
        self.pose.axis_z()
    }

    pub fn set_radii(&mut self, radius: f64, tube_radius: f64) -> Result<(), ShapeError> {
        self.kernel.set_radii(radius, tube_radius)
    }
}
