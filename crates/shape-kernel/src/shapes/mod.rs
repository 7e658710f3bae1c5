//! Posed implicit solids.
//!
//! A shape is a [`Pose`] plus a [`ShapeKernel`]: the kernel answers
//! containment and nearest-surface queries in its own canonical frame, and
//! [`Shape3d`] moves query points into that frame and the answers back out.

pub mod cuboid;
pub mod cylinder;
pub mod ellipsoid;
pub mod ramp;
pub mod sphere;
pub mod torus;

use std::fmt;

use approx::AbsDiffEq;
use serde::{Deserialize, Serialize};

use crate::geometry::point::Point3d;
use crate::geometry::pose::Pose;
use crate::geometry::vector::Vec3;

pub use cuboid::Cuboid;
pub use cylinder::Cylinder;
pub use ellipsoid::Ellipsoid;
pub use ramp::Ramp;
pub use sphere::Sphere;
pub use torus::Torus;

pub type Sphere3d = Shape3d<Sphere>;
pub type Cylinder3d = Shape3d<Cylinder>;
pub type Torus3d = Shape3d<Torus>;
pub type Ramp3d = Shape3d<Ramp>;
pub type Box3d = Shape3d<Cuboid>;
pub type Ellipsoid3d = Shape3d<Ellipsoid>;

/// Nearest-surface answer for one query point.
///
/// `distance` is signed: negative is penetration depth, positive is the gap
/// to the surface. `normal` is unit length and points outward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceQuery {
    pub distance: f64,
    pub closest_point: Point3d,
    pub normal: Vec3,
}

impl SurfaceQuery {
    pub fn new(distance: f64, closest_point: Point3d, normal: Vec3) -> Self {
        Self {
            distance,
            closest_point,
            normal,
        }
    }

    /// Inside or on the surface.
    pub fn is_inside(&self) -> bool {
        self.distance <= 0.0
    }
}

/// Shape-frame geometry of one primitive kind.
pub trait ShapeKernel: Clone + fmt::Debug + fmt::Display {
    const NAME: &'static str;

    /// Whether `point` lies within the surface inflated by `epsilon`.
    fn is_inside_epsilon_local(&self, point: &Point3d, epsilon: f64) -> bool;

    /// Signed distance, closest surface point and outward normal.
    fn evaluate_local(&self, point: &Point3d) -> SurfaceQuery;

    /// Every dimension within `epsilon`, compared independently.
    fn dimensions_equal(&self, other: &Self, epsilon: f64) -> bool;

    /// Same occupied region, modulo the kernel's symmetries.
    fn geometrically_equals(
        &self,
        pose: &Pose,
        other: &Self,
        other_pose: &Pose,
        epsilon: f64,
    ) -> bool;

    /// All dimensions zero. Bypasses validation.
    fn zeroed() -> Self;

    /// All dimensions NaN. Bypasses validation.
    fn nan() -> Self;

    fn contains_nan(&self) -> bool;
}

/// A kernel placed in the world by a pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape3d<K> {
    pose: Pose,
    kernel: K,
}

impl<K: ShapeKernel> Shape3d<K> {
    pub fn from_parts(pose: Pose, kernel: K) -> Self {
        Self { pose, kernel }
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn position(&self) -> Point3d {
        self.pose.position()
    }

    pub fn shape_type_name(&self) -> &'static str {
        K::NAME
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Moves the shape by `transform` expressed in its own frame.
    pub fn append_transform(&mut self, transform: &Pose) {
        self.pose.append_transform(transform);
    }

    /// Moves the shape by `transform` expressed in the world frame.
    pub fn apply_transform(&mut self, transform: &Pose) {
        self.pose.prepend_transform(transform);
    }

    pub fn append_translation(&mut self, offset: Vec3) {
        self.pose.append_translation(offset);
    }

    /// Deep copy of `other` into `self`.
    pub fn set(&mut self, other: &Self) {
        self.clone_from(other);
    }

    pub fn transform_to_local(&self, point: &Point3d) -> Point3d {
        self.pose.transform_to_local(point)
    }

    pub fn transform_to_world(&self, point: &Point3d) -> Point3d {
        self.pose.transform_to_world(point)
    }

    /// Signed distance, closest point and outward normal in world coordinates.
    pub fn query(&self, point: &Point3d) -> SurfaceQuery {
        let local = self.kernel.evaluate_local(&self.transform_to_local(point));
        SurfaceQuery {
            distance: local.distance,
            closest_point: self.pose.transform_to_world(&local.closest_point),
            normal: self.pose.transform_vector_to_world(&local.normal),
        }
    }

    pub fn check_if_inside(&self, point: &Point3d) -> bool {
        self.distance(point) <= 0.0
    }

    /// Signed distance to the surface; negative inside.
    pub fn distance(&self, point: &Point3d) -> f64 {
        self.kernel
            .evaluate_local(&self.transform_to_local(point))
            .distance
    }

    pub fn is_inside_or_on_surface(&self, point: &Point3d) -> bool {
        self.is_inside_epsilon(point, 0.0)
    }

    pub fn is_inside_epsilon(&self, point: &Point3d, epsilon: f64) -> bool {
        self.kernel
            .is_inside_epsilon_local(&self.transform_to_local(point), epsilon)
    }

    /// Moves `point` onto the surface when it lies outside; points inside or
    /// on the surface are left untouched. Returns whether `point` moved.
    pub fn orthogonal_projection(&self, point: &mut Point3d) -> bool {
        let query = self.query(point);
        if query.distance > 0.0 {
            *point = query.closest_point;
            true
        } else {
            false
        }
    }

    pub fn orthogonal_projection_copy(&self, point: &Point3d) -> Point3d {
        let mut projected = *point;
        self.orthogonal_projection(&mut projected);
        projected
    }

    /// Pose entries and dimensions each within `epsilon`.
    pub fn epsilon_equals(&self, other: &Self, epsilon: f64) -> bool {
        self.pose.abs_diff_eq(&other.pose, epsilon)
            && self.kernel.dimensions_equal(&other.kernel, epsilon)
    }

    pub fn geometrically_equals(&self, other: &Self, epsilon: f64) -> bool {
        self.kernel
            .geometrically_equals(&self.pose, &other.kernel, &other.pose, epsilon)
    }

    pub fn set_to_zero(&mut self) {
        self.pose.set_to_zero();
        self.kernel = K::zeroed();
    }

    pub fn set_to_nan(&mut self) {
        self.pose.set_to_nan();
        self.kernel = K::nan();
    }

    pub fn contains_nan(&self) -> bool {
        self.pose.contains_nan() || self.kernel.contains_nan()
    }
}

impl<K: ShapeKernel + Default> Default for Shape3d<K> {
    fn default() -> Self {
        Self::from_parts(Pose::identity(), K::default())
    }
}

impl<K: ShapeKernel> fmt::Display for Shape3d<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, pose =\n{}", self.kernel, self.pose)
    }
}

/// The closed set of primitive kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Sphere(Sphere3d),
    Cylinder(Cylinder3d),
    Torus(Torus3d),
    Ramp(Ramp3d),
    Box(Box3d),
    Ellipsoid(Ellipsoid3d),
}

/// Runs `$body` with `$shape` bound to the inner `Shape3d` of any variant.
macro_rules! with_shape {
    ($value:expr, $shape:ident => $body:expr) => {
        match $value {
            Shape::Sphere($shape) => $body,
            Shape::Cylinder($shape) => $body,
            Shape::Torus($shape) => $body,
            Shape::Ramp($shape) => $body,
            Shape::Box($shape) => $body,
            Shape::Ellipsoid($shape) => $body,
        }
    };
}

impl Shape {
    pub fn shape_type_name(&self) -> &'static str {
        with_shape!(self, s => s.shape_type_name())
    }

    pub fn pose(&self) -> &Pose {
        with_shape!(self, s => s.pose())
    }

    pub fn query(&self, point: &Point3d) -> SurfaceQuery {
        with_shape!(self, s => s.query(point))
    }

    pub fn check_if_inside(&self, point: &Point3d) -> bool {
        with_shape!(self, s => s.check_if_inside(point))
    }

    pub fn distance(&self, point: &Point3d) -> f64 {
        with_shape!(self, s => s.distance(point))
    }

    pub fn is_inside_or_on_surface(&self, point: &Point3d) -> bool {
        with_shape!(self, s => s.is_inside_or_on_surface(point))
    }

    pub fn is_inside_epsilon(&self, point: &Point3d, epsilon: f64) -> bool {
        with_shape!(self, s => s.is_inside_epsilon(point, epsilon))
    }

    pub fn orthogonal_projection(&self, point: &mut Point3d) -> bool {
        with_shape!(self, s => s.orthogonal_projection(point))
    }

    pub fn orthogonal_projection_copy(&self, point: &Point3d) -> Point3d {
        with_shape!(self, s => s.orthogonal_projection_copy(point))
    }

    /// Component-wise comparison. Shapes of different kinds are never equal.
    pub fn epsilon_equals(&self, other: &Shape, epsilon: f64) -> bool {
        match (self, other) {
            (Shape::Sphere(a), Shape::Sphere(b)) => a.epsilon_equals(b, epsilon),
            (Shape::Cylinder(a), Shape::Cylinder(b)) => a.epsilon_equals(b, epsilon),
            (Shape::Torus(a), Shape::Torus(b)) => a.epsilon_equals(b, epsilon),
            (Shape::Ramp(a), Shape::Ramp(b)) => a.epsilon_equals(b, epsilon),
            (Shape::Box(a), Shape::Box(b)) => a.epsilon_equals(b, epsilon),
            (Shape::Ellipsoid(a), Shape::Ellipsoid(b)) => a.epsilon_equals(b, epsilon),
            _ => false,
        }
    }

    /// Symmetry-aware comparison. Shapes of different kinds are never equal.
    pub fn geometrically_equals(&self, other: &Shape, epsilon: f64) -> bool {
        match (self, other) {
            (Shape::Sphere(a), Shape::Sphere(b)) => a.geometrically_equals(b, epsilon),
            (Shape::Cylinder(a), Shape::Cylinder(b)) => a.geometrically_equals(b, epsilon),
            (Shape::Torus(a), Shape::Torus(b)) => a.geometrically_equals(b, epsilon),
            (Shape::Ramp(a), Shape::Ramp(b)) => a.geometrically_equals(b, epsilon),
            (Shape::Box(a), Shape::Box(b)) => a.geometrically_equals(b, epsilon),
            (Shape::Ellipsoid(a), Shape::Ellipsoid(b)) => a.geometrically_equals(b, epsilon),
            _ => false,
        }
    }

    pub fn set_to_zero(&mut self) {
        with_shape!(self, s => s.set_to_zero())
    }

    pub fn set_to_nan(&mut self) {
        with_shape!(self, s => s.set_to_nan())
    }

    pub fn contains_nan(&self) -> bool {
        with_shape!(self, s => s.contains_nan())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_shape!(self, s => fmt::Display::fmt(s, f))
    }
}

impl From<Sphere3d> for Shape {
    fn from(shape: Sphere3d) -> Self {
        Shape::Sphere(shape)
    }
}

impl From<Cylinder3d> for Shape {
    fn from(shape: Cylinder3d) -> Self {
        Shape::Cylinder(shape)
    }
}

impl From<Torus3d> for Shape {
    fn from(shape: Torus3d) -> Self {
        Shape::Torus(shape)
    }
}

impl From<Ramp3d> for Shape {
    fn from(shape: Ramp3d) -> Self {
        Shape::Ramp(shape)
    }
}

impl From<Box3d> for Shape {
    fn from(shape: Box3d) -> Self {
        Shape::Box(shape)
    }
}

impl From<Ellipsoid3d> for Shape {
    fn from(shape: Ellipsoid3d) -> Self {
        Shape::Ellipsoid(shape)
    }
}
