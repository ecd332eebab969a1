pub mod point;
pub mod vector;
pub mod transform;
pub mod plane;
pub mod segment;
pub mod triangle;
pub mod circle;
pub mod sphere;
pub mod boxes;
pub mod tetrahedron;

pub use boxes::OrientedBox;
pub use circle::Circle3d;
pub use plane::Plane;
pub use point::Point3d;
pub use segment::{Segment, SegmentProximity};
pub use sphere::Sphere;
pub use tetrahedron::Tetrahedron;
pub use transform::{BoundingBox, Transform};
pub use triangle::Triangle;
pub use vector::Vec3;
