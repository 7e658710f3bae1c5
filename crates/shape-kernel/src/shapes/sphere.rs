use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::equality::{scalars_equal, translations_equal};
use crate::error::ShapeError;
use crate::geometry::point::Point3d;
use crate::geometry::pose::Pose;
use crate::geometry::vector::Vec3;

use super::{Shape3d, ShapeKernel, SurfaceQuery};

/// A solid ball centered on the shape frame origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SphereDimensions", into = "SphereDimensions")]
pub struct Sphere {
    radius: f64,
}

#[derive(Serialize, Deserialize)]
struct SphereDimensions {
    radius: f64,
}

impl TryFrom<SphereDimensions> for Sphere {
    type Error = ShapeError;

    fn try_from(dims: SphereDimensions) -> Result<Self, ShapeError> {
        Sphere::new(dims.radius)
    }
}

impl From<Sphere> for SphereDimensions {
    fn from(sphere: Sphere) -> Self {
        Self {
            radius: sphere.radius,
        }
    }
}

impl Sphere {
    pub const MIN_RADIUS: f64 = 0.0;

    #[instrument]
    pub fn new(radius: f64) -> Result<Self, ShapeError> {
        Self::validate(radius)?;
        debug!(radius, "created sphere");
        Ok(Self { radius })
    }

    fn validate(radius: f64) -> Result<(), ShapeError> {
        ShapeError::check_minimum(Self::NAME, "radius", radius, Self::MIN_RADIUS)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[instrument(skip(self))]
    pub fn set_radius(&mut self, radius: f64) -> Result<(), ShapeError> {
        Self::validate(radius)?;
        self.radius = radius;
        debug!(radius, "resized sphere");
        Ok(())
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self { radius: 1.0 }
    }
}

impl fmt::Display for Sphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sphere: radius = {}", self.radius)
    }
}

impl ShapeKernel for Sphere {
    const NAME: &'static str = "Sphere";

    fn is_inside_epsilon_local(&self, point: &Point3d, epsilon: f64) -> bool {
        let limit = self.radius + epsilon;
        point.to_vec3().length_squared() <= limit * limit && limit >= 0.0
    }

    fn evaluate_local(&self, point: &Point3d) -> SurfaceQuery {
        let offset = point.to_vec3();
        let dist = offset.length();
        if crate::default_tolerance().is_zero_length(dist) {
            return SurfaceQuery::new(
                -self.radius,
                Point3d::new(0.0, 0.0, self.radius),
                Vec3::Z,
            );
        }
        let normal = offset / dist;
        SurfaceQuery::new(
            dist - self.radius,
            Point3d::from(normal * self.radius),
            normal,
        )
    }

    fn dimensions_equal(&self, other: &Self, epsilon: f64) -> bool {
        scalars_equal(self.radius, other.radius, epsilon)
    }

    fn geometrically_equals(
        &self,
        pose: &Pose,
        other: &Self,
        other_pose: &Pose,
        epsilon: f64,
    ) -> bool {
        self.dimensions_equal(other, epsilon) && translations_equal(pose, other_pose, epsilon)
    }

    fn zeroed() -> Self {
        Self { radius: 0.0 }
    }

    fn nan() -> Self {
        Self { radius: f64::NAN }
    }

    fn contains_nan(&self) -> bool {
        self.radius.is_nan()
    }
}

impl Shape3d<Sphere> {
    /// Sphere of `radius` around `center`, with identity rotation.
    pub fn new(center: Point3d, radius: f64) -> Result<Self, ShapeError> {
        Ok(Self::from_parts(
            Pose::from_translation(center.to_vec3()),
            Sphere::new(radius)?,
        ))
    }

    pub fn radius(&self) -> f64 {
        self.kernel.radius()
    }

    pub fn center(&self) -> Point3d {
        self.position()
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<(), ShapeError> {
        self.kernel.set_radius(radius)
    }

    pub fn set_center(&mut self, center: Point3d) {
        self.pose.set_translation(center.to_vec3());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Sphere3d;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_is_unit_sphere() {
        let sphere = Sphere3d::default();
        assert!((sphere.radius() - 1.0).abs() < 1e-12);
        assert_eq!(sphere.center(), Point3d::ORIGIN);
    }

    #[test]
    fn test_containment_around_radius() {
        let sphere = Sphere3d::default();
        assert!(sphere.is_inside_or_on_surface(&Point3d::new(0.999, 0.0, 0.0)));
        assert!(sphere.is_inside_or_on_surface(&Point3d::new(0.0, 1.0, 0.0)));
        assert!(!sphere.is_inside_or_on_surface(&Point3d::new(0.0, 0.0, 1.001)));
        assert!(sphere.is_inside_epsilon(&Point3d::new(0.0, 0.0, 1.001), 0.002));
        assert!(!sphere.is_inside_epsilon(&Point3d::new(0.0, 0.0, 0.999), -0.002));
    }

    #[test]
    fn test_query_off_center() {
        let sphere = Sphere3d::new(Point3d::new(1.0, 1.0, 1.0), 2.0).unwrap();
        let query = sphere.query(&Point3d::new(1.0, 1.0, 5.0));
        assert!((query.distance - 2.0).abs() < 1e-12);
        assert_abs_diff_eq!(query.closest_point, Point3d::new(1.0, 1.0, 3.0), epsilon = 1e-12);
        assert_abs_diff_eq!(query.normal, Vec3::Z, epsilon = 1e-12);

        let inside = sphere.query(&Point3d::new(2.0, 1.0, 1.0));
        assert!((inside.distance + 1.0).abs() < 1e-12);
        assert!(inside.is_inside());
    }

    #[test]
    fn test_query_at_center_is_finite() {
        let sphere = Sphere3d::default();
        let query = sphere.query(&Point3d::ORIGIN);
        assert!((query.distance + 1.0).abs() < 1e-12);
        assert_abs_diff_eq!(query.closest_point, Point3d::new(0.0, 0.0, 1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(query.normal, Vec3::Z, epsilon = 1e-12);
    }

    #[test]
    fn test_projection_lands_on_surface() {
        let sphere = Sphere3d::new(Point3d::new(0.0, 0.0, 1.0), 0.5).unwrap();
        let projected = sphere.orthogonal_projection_copy(&Point3d::new(3.0, 4.0, 1.0));
        assert_abs_diff_eq!(projected, Point3d::new(0.3, 0.4, 1.0), epsilon = 1e-12);
        assert!(sphere.distance(&projected).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_is_ignored_by_geometric_equality() {
        let a = Sphere3d::new(Point3d::new(1.0, 2.0, 3.0), 1.5).unwrap();
        let mut b = a.clone();
        b.append_transform(&Pose::from_yaw_pitch_roll(0.3, 1.2, -0.4));
        assert!(a.geometrically_equals(&b, 1e-9));
        assert!(!a.epsilon_equals(&b, 1e-9));
    }

    #[test]
    fn test_setters_validate() {
        let mut sphere = Sphere3d::default();
        assert!(sphere.set_radius(0.0).is_ok());
        assert!(matches!(
            sphere.set_radius(-0.5),
            Err(ShapeError::InvalidDimensions { value, .. }) if value == -0.5
        ));
        assert!((sphere.radius() - 0.0).abs() < 1e-12);
        sphere.set_center(Point3d::new(4.0, 0.0, 0.0));
        assert_eq!(sphere.center(), Point3d::new(4.0, 0.0, 0.0));
        assert!(Sphere3d::new(Point3d::ORIGIN, f64::NAN).is_err());
    }

    #[test]
    fn test_display() {
        let sphere = Sphere3d::new(Point3d::ORIGIN, 2.0).unwrap();
        let text = sphere.to_string();
        assert!(text.starts_with("Sphere: radius = 2, pose =\n"));
    }

    #[test]
    fn test_json_rejects_negative_radius() {
        let sphere: Sphere = serde_json::from_str(r#"{"radius":0.25}"#).unwrap();
        assert!((sphere.radius() - 0.25).abs() < 1e-12);
        assert!(serde_json::from_str::<Sphere>(r#"{"radius":-1.0}"#).is_err());
    }
}
