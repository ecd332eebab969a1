use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// An infinite plane through `origin` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3d,
    pub normal: Vec3,
}

impl Plane {
    /// Returns `None` if `normal` has zero length.
    pub fn new(origin: Point3d, normal: Vec3) -> Option<Self> {
        Some(Self {
            origin,
            normal: normal.normalized()?,
        })
    }

    /// Plane through three points, oriented by the right-hand rule.
    pub fn from_points(a: &Point3d, b: &Point3d, c: &Point3d) -> Option<Self> {
        let normal = (*b - *a).cross(&(*c - *a));
        Self::new(*a, normal)
    }

    /// Signed distance along the normal; positive on the side the normal
    /// points to.
    pub fn signed_distance(&self, p: &Point3d) -> f64 {
        (*p - self.origin).dot(&self.normal)
    }

    pub fn project_point(&self, p: &Point3d) -> Point3d {
        *p - self.normal * self.signed_distance(p)
    }
}
