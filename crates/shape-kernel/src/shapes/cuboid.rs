use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::equality::{axis_extents_equal, scalars_equal, translations_equal};
use crate::error::ShapeError;
use crate::geometry::point::Point3d;
use crate::geometry::pose::Pose;
use crate::geometry::vector::Vec3;

use super::{Shape3d, ShapeKernel, SurfaceQuery};

/// A rectangular box centered on the origin with full edge lengths
/// `length`, `width` and `height` along local X, Y and Z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CuboidDimensions", into = "CuboidDimensions")]
pub struct Cuboid {
    size: Vec3,
}

#[derive(Serialize, Deserialize)]
struct CuboidDimensions {
    length: f64,
    width: f64,
    height: f64,
}

impl TryFrom<CuboidDimensions> for Cuboid {
    type Error = ShapeError;

    fn try_from(dims: CuboidDimensions) -> Result<Self, ShapeError> {
        Cuboid::new(dims.length, dims.width, dims.height)
    }
}

impl From<Cuboid> for CuboidDimensions {
    fn from(cuboid: Cuboid) -> Self {
        Self {
            length: cuboid.size.x,
            width: cuboid.size.y,
            height: cuboid.size.z,
        }
    }
}

impl Cuboid {
    pub const MIN_DIMENSION: f64 = 0.0;

    #[instrument]
    pub fn new(length: f64, width: f64, height: f64) -> Result<Self, ShapeError> {
        Self::validate(length, width, height)?;
        debug!(length, width, height, "created box");
        Ok(Self {
            size: Vec3::new(length, width, height),
        })
    }

    fn validate(length: f64, width: f64, height: f64) -> Result<(), ShapeError> {
        ShapeError::check_minimum(Self::NAME, "length", length, Self::MIN_DIMENSION)?;
        ShapeError::check_minimum(Self::NAME, "width", width, Self::MIN_DIMENSION)?;
        ShapeError::check_minimum(Self::NAME, "height", height, Self::MIN_DIMENSION)
    }

    pub fn length(&self) -> f64 {
        self.size.x
    }

    pub fn width(&self) -> f64 {
        self.size.y
    }

    pub fn height(&self) -> f64 {
        self.size.z
    }

    pub fn size(&self) -> Vec3 {
        self.size
    }

    pub fn half_extents(&self) -> Vec3 {
        self.size * 0.5
    }

    #[instrument(skip(self))]
    pub fn set_size(&mut self, length: f64, width: f64, height: f64) -> Result<(), ShapeError> {
        Self::validate(length, width, height)?;
        self.size = Vec3::new(length, width, height);
        debug!(length, width, height, "resized box");
        Ok(())
    }
}

impl Default for Cuboid {
    fn default() -> Self {
        Self {
            size: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl fmt::Display for Cuboid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Box: size = {}", self.size)
    }
}

impl ShapeKernel for Cuboid {
    const NAME: &'static str = "Box";

    fn is_inside_epsilon_local(&self, point: &Point3d, epsilon: f64) -> bool {
        let half = self.half_extents().to_array();
        point
            .to_array()
            .iter()
            .zip(half)
            .all(|(p, h)| p.abs() <= h + epsilon)
    }

    fn evaluate_local(&self, point: &Point3d) -> SurfaceQuery {
        let half = self.half_extents().to_array();
        let coords = point.to_array();

        let inside = coords.iter().zip(half).all(|(p, h)| p.abs() <= h);
        if inside {
            // Nearest face by the smallest gap; ties keep the lower axis.
            let mut axis = 0;
            let mut gap = half[0] - coords[0].abs();
            for i in 1..3 {
                let candidate = half[i] - coords[i].abs();
                if candidate < gap {
                    axis = i;
                    gap = candidate;
                }
            }
            let sign = if coords[axis] < 0.0 { -1.0 } else { 1.0 };
            let mut closest = coords;
            closest[axis] = sign * half[axis];
            let mut normal = [0.0; 3];
            normal[axis] = sign;
            return SurfaceQuery::new(
                -gap,
                Point3d::from(Vec3::from_array(closest)),
                Vec3::from_array(normal),
            );
        }

        let clamped: [f64; 3] = std::array::from_fn(|i| coords[i].max(-half[i]).min(half[i]));
        let closest = Point3d::from(Vec3::from_array(clamped));
        let offset = *point - closest;
        let distance = offset.length();
        let normal = offset.normalized().unwrap_or_else(|| {
            // Only reachable within rounding of a face; fall back to the
            // dominant outside axis.
            let axis = (0..3)
                .max_by(|&a, &b| {
                    (coords[a].abs() - half[a]).total_cmp(&(coords[b].abs() - half[b]))
                })
                .unwrap_or(0);
            let mut normal = [0.0; 3];
            normal[axis] = if coords[axis] < 0.0 { -1.0 } else { 1.0 };
            Vec3::from_array(normal)
        });
        SurfaceQuery::new(distance, closest, normal)
    }

    fn dimensions_equal(&self, other: &Self, epsilon: f64) -> bool {
        scalars_equal(self.size.x, other.size.x, epsilon)
            && scalars_equal(self.size.y, other.size.y, epsilon)
            && scalars_equal(self.size.z, other.size.z, epsilon)
    }

    /// Edges may be relabeled: a box rotated a quarter turn with two sizes
    /// swapped fills the same region.
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
                self.size.to_array(),
                other_pose,
                other.size.to_array(),
                epsilon,
                false,
            )
    }

    fn zeroed() -> Self {
        Self { size: Vec3::ZERO }
    }

    fn nan() -> Self {
        Self { size: Vec3::NAN }
    }

    fn contains_nan(&self) -> bool {
        self.size.contains_nan()
    }
}

impl Shape3d<Cuboid> {
    pub fn new(pose: Pose, length: f64, width: f64, height: f64) -> Result<Self, ShapeError> {
        Ok(Self::from_parts(pose, Cuboid::new(length, width, height)?))
    }

    pub fn size(&self) -> Vec3 {
        self.kernel.size()
    }

    pub fn half_extents(&self) -> Vec3 {
        self.kernel.half_extents()
    }

    pub fn set_size(&mut self, length: f64, width: f64, height: f64) -> Result<(), ShapeError> {
        self.kernel.set_size(length, width, height)
    }
}
