pub mod equality;
pub mod error;
pub mod geometry;
pub mod shapes;

pub use error::ShapeError;
pub use geometry::{Point3d, Pose, Vec3};
pub use shapes::{
    Box3d, Cuboid, Cylinder, Cylinder3d, Ellipsoid, Ellipsoid3d, Ramp, Ramp3d, Shape, Shape3d,
    ShapeKernel, Sphere, Sphere3d, SurfaceQuery, Torus, Torus3d,
};

/// Numeric gates used by the local evaluators to detect degenerate queries.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Squared planar distance below which a point is treated as lying on a
    /// revolution axis.
    pub axis_degeneracy: f64,
    /// Lengths below which a direction is treated as undefined.
    pub zero_length: f64,
    /// Largest entry of `R^T R - I` and `|det R - 1|` accepted for a
    /// deserialized rotation.
    pub orthonormality: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            axis_degeneracy: 1e-12,
            zero_length: 1e-12,
            orthonormality: 1e-9,
        }
    }
}

impl Tolerance {
    pub fn is_on_axis(&self, planar_distance_squared: f64) -> bool {
        planar_distance_squared < self.axis_degeneracy
    }

    pub fn is_zero_length(&self, length: f64) -> bool {
        length.abs() < self.zero_length
    }
}

/// Tolerance used by every evaluator.
pub fn default_tolerance() -> Tolerance {
    Tolerance::default()
}
