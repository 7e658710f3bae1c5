use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::equality::{orientations_equal, scalars_equal, translations_equal};
use crate::error::ShapeError;
use crate::geometry::point::Point3d;
use crate::geometry::pose::Pose;
use crate::geometry::vector::Vec3;

use super::{Shape3d, ShapeKernel, SurfaceQuery};

/// A right triangular prism.
///
/// The X-Z cross-section is the triangle `(0, 0)`, `(length, 0)`,
/// `(length, height)`: the base lies on `z = 0`, the back face on
/// `x = length`, and the slope rises from the `x = 0` edge to the top of the
/// back face. The prism spans `y` in `[-width / 2, width / 2]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RampDimensions", into = "RampDimensions")]
pub struct Ramp {
    length: f64,
    width: f64,
    height: f64,
}

#[derive(Serialize, Deserialize)]
struct RampDimensions {
    length: f64,
    width: f64,
    height: f64,
}

impl TryFrom<RampDimensions> for Ramp {
    type Error = ShapeError;

    fn try_from(dims: RampDimensions) -> Result<Self, ShapeError> {
        Ramp::new(dims.length, dims.width, dims.height)
    }
}

impl From<Ramp> for RampDimensions {
    fn from(ramp: Ramp) -> Self {
        Self {
            length: ramp.length,
            width: ramp.width,
            height: ramp.height,
        }
    }
}

/// One of the flat faces, for the inside evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Slope,
    Base,
    Back,
    Side,
    /// The `x = 0` plane. Only binds when the slope lies flat.
    Front,
}

const FACES: [Face; 5] = [Face::Slope, Face::Base, Face::Back, Face::Side, Face::Front];

impl Ramp {
    pub const MIN_DIMENSION: f64 = 0.0;

    #[instrument]
    pub fn new(length: f64, width: f64, height: f64) -> Result<Self, ShapeError> {
        Self::validate(length, width, height)?;
        debug!(length, width, height, "created ramp");
        Ok(Self {
            length,
            width,
            height,
        })
    }

    fn validate(length: f64, width: f64, height: f64) -> Result<(), ShapeError> {
        ShapeError::check_minimum(Self::NAME, "length", length, Self::MIN_DIMENSION)?;
        ShapeError::check_minimum(Self::NAME, "width", width, Self::MIN_DIMENSION)?;
        ShapeError::check_minimum(Self::NAME, "height", height, Self::MIN_DIMENSION)
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Length of the sloped face, from the low edge to the high edge.
    pub fn ramp_length(&self) -> f64 {
        self.length.hypot(self.height)
    }

    /// Angle between the base and the sloped face.
    pub fn ramp_incline(&self) -> f64 {
        self.height.atan2(self.length)
    }

    /// Outward normal of the sloped face in the shape frame.
    pub fn ramp_surface_normal(&self) -> Vec3 {
        Vec3::new(-self.height, 0.0, self.length)
            .normalized()
            .unwrap_or(Vec3::Z)
    }

    pub fn set_length(&mut self, length: f64) -> Result<(), ShapeError> {
        self.set_size(length, self.width, self.height)
    }

    pub fn set_width(&mut self, width: f64) -> Result<(), ShapeError> {
        self.set_size(self.length, width, self.height)
    }

    pub fn set_height(&mut self, height: f64) -> Result<(), ShapeError> {
        self.set_size(self.length, self.width, height)
    }

    #[instrument(skip(self))]
    pub fn set_size(&mut self, length: f64, width: f64, height: f64) -> Result<(), ShapeError> {
        Self::validate(length, width, height)?;
        self.length = length;
        self.width = width;
        self.height = height;
        debug!(length, width, height, "resized ramp");
        Ok(())
    }

    /// Signed distance from the plane of the sloped face, positive above it.
    fn slope_distance(&self, x: f64, z: f64) -> f64 {
        let normal = self.ramp_surface_normal();
        normal.x * x + normal.z * z
    }

    fn face_distance(&self, face: Face, point: &Point3d) -> f64 {
        match face {
            Face::Slope => self.slope_distance(point.x, point.z),
            Face::Base => -point.z,
            Face::Back => point.x - self.length,
            Face::Side => point.y.abs() - 0.5 * self.width,
            Face::Front => -point.x,
        }
    }

    fn face_normal(&self, face: Face, point: &Point3d) -> Vec3 {
        match face {
            Face::Slope => self.ramp_surface_normal(),
            Face::Base => -Vec3::Z,
            Face::Back => Vec3::X,
            Face::Side if point.y < 0.0 => -Vec3::Y,
            Face::Side => Vec3::Y,
            Face::Front => -Vec3::X,
        }
    }

    /// Face whose plane the point is least deep behind, ties in declaration order.
    fn nearest_face(&self, point: &Point3d) -> (Face, f64) {
        let mut best = (Face::Slope, self.face_distance(Face::Slope, point));
        for face in FACES.into_iter().skip(1) {
            let distance = self.face_distance(face, point);
            if distance > best.1 {
                best = (face, distance);
            }
        }
        best
    }

    fn face_query(&self, point: &Point3d) -> SurfaceQuery {
        let (face, distance) = self.nearest_face(point);
        let normal = self.face_normal(face, point);
        SurfaceQuery::new(distance, *point - normal * distance, normal)
    }

    /// Closest point of the X-Z cross-section triangle to `(x, z)`.
    fn closest_in_section(&self, x: f64, z: f64) -> (f64, f64) {
        let inside = -z <= 0.0
            && -x <= 0.0
            && x - self.length <= 0.0
            && self.slope_distance(x, z) <= 0.0;
        if inside {
            return (x, z);
        }
        let corners = [
            (0.0, 0.0),
            (self.length, 0.0),
            (self.length, self.height),
        ];
        let mut best = corners[0];
        let mut best_distance = f64::INFINITY;
        for i in 0..3 {
            let candidate = closest_on_segment((x, z), corners[i], corners[(i + 1) % 3]);
            let dx = x - candidate.0;
            let dz = z - candidate.1;
            let distance = dx * dx + dz * dz;
            if distance < best_distance {
                best = candidate;
                best_distance = distance;
            }
        }
        best
    }
}

fn closest_on_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    let (dx, dz) = (b.0 - a.0, b.1 - a.1);
    let length_squared = dx * dx + dz * dz;
    if length_squared <= 0.0 {
        return a;
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dz) / length_squared).clamp(0.0, 1.0);
    (a.0 + t * dx, a.1 + t * dz)
}

impl Default for Ramp {
    fn default() -> Self {
        Self {
            length: 1.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

impl fmt::Display for Ramp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ramp: length = {}, width = {}, height = {}",
            self.length, self.width, self.height
        )
    }
}

impl ShapeKernel for Ramp {
    const NAME: &'static str = "Ramp";

    fn is_inside_epsilon_local(&self, point: &Point3d, epsilon: f64) -> bool {
        FACES
            .into_iter()
            .all(|face| self.face_distance(face, point) <= epsilon)
    }

    fn evaluate_local(&self, point: &Point3d) -> SurfaceQuery {
        let (_, deepest) = self.nearest_face(point);
        if deepest <= 0.0 {
            return self.face_query(point);
        }

        let half_width = 0.5 * self.width;
        let (x, z) = self.closest_in_section(point.x, point.z);
        let closest = Point3d::new(x, point.y.max(-half_width).min(half_width), z);
        let offset = *point - closest;
        let distance = offset.length();
        if crate::default_tolerance().is_zero_length(distance) {
            return self.face_query(point);
        }
        SurfaceQuery::new(distance, closest, offset / distance)
    }

    fn dimensions_equal(&self, other: &Self, epsilon: f64) -> bool {
        scalars_equal(self.length, other.length, epsilon)
            && scalars_equal(self.width, other.width, epsilon)
            && scalars_equal(self.height, other.height, epsilon)
    }

    /// A ramp has no rotational symmetry, so the orientations must agree.
    fn geometrically_equals(
        &self,
        pose: &Pose,
        other: &Self,
        other_pose: &Pose,
        epsilon: f64,
    ) -> bool {
        self.dimensions_equal(other, epsilon)
            && translations_equal(pose, other_pose, epsilon)
            && orientations_equal(pose, other_pose, epsilon)
    }

    fn zeroed() -> Self {
        Self {
            length: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }

    fn nan() -> Self {
        Self {
            length: f64::NAN,
            width: f64::NAN,
            height: f64::NAN,
        }
    }

    fn contains_nan(&self) -> bool {
        self.length.is_nan() || self.width.is_nan() || self.height.is_nan()
    }
}

impl Shape3d<Ramp> {
    pub fn new(pose: Pose, length: f64, width: f64, height: f64) -> Result<Self, ShapeError> {
        Ok(Self::from_parts(pose, Ramp::new(length, width, height)?))
    }

    pub fn length(&self) -> f64 {
        self.kernel.length()
    }

    pub fn width(&self) -> f64 {
        self.kernel.width()
    }

    pub fn height(&self) -> f64 {
        self.kernel.height()
    }

    pub fn ramp_length(&self) -> f64 {
        self.kernel.ramp_length()
    }

    pub fn ramp_incline(&self) -> f64 {
        self.kernel.ramp_incline()
    }

    /// Outward normal of the sloped face in world coordinates.
    pub fn ramp_surface_normal(&self) -> Vec3 {
        self.pose
            .transform_vector_to_world(&self.kernel.ramp_surface_normal())
    }

    pub fn set_length(&mut self, length: f64) -> Result<(), ShapeError> {
        self.kernel.set_length(length)
    }

    pub fn set_width(&mut self, width: f64) -> Result<(), ShapeError> {
        self.kernel.set_width(width)
    }

    pub fn set_height(&mut self, height: f64) -> Result<(), ShapeError> {
        self.kernel.set_height(height)
    }

    pub fn set_size(&mut self, length: f64, width: f64, height: f64) -> Result<(), ShapeError> {
        self.kernel.set_size(length, width, height)
    }
}
