pub mod point;
pub mod pose;
pub mod vector;

pub use point::Point3d;
pub use pose::Pose;
pub use vector::Vec3;
