use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;
use crate::error::{GeometryError, GeometryResult};

/// An affine transformation: `p' = linear * p + translation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub linear: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            linear: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn translation(v: Vec3) -> Self {
        Self {
            linear: Matrix3::identity(),
            translation: v.into(),
        }
    }

    /// Rotation by `angle` radians about `axis` through `center`
    /// (Rodrigues' formula).
    pub fn rotation_about(center: Point3d, axis: Vec3, angle: f64) -> GeometryResult<Self> {
        let axis = axis.normalized().ok_or_else(|| {
            GeometryError::InvalidArgument("rotation axis has zero length".into())
        })?;
        let axis: Vector3<f64> = axis.into();
        let k = skew(&axis);
        let linear = Matrix3::identity() + angle.sin() * k + (1.0 - angle.cos()) * (k * k);
        Ok(Self::about(center, linear))
    }

    /// Non-uniform scaling by `factors` about `center`.
    pub fn scaling_about(center: Point3d, factors: Vec3) -> GeometryResult<Self> {
        if [factors.x, factors.y, factors.z]
            .iter()
            .any(|f| f.abs() < 1e-15 || !f.is_finite())
        {
            return Err(GeometryError::InvalidArgument(format!(
                "scale factors must be finite and nonzero, got ({}, {}, {})",
                factors.x, factors.y, factors.z
            )));
        }
        let linear = Matrix3::from_diagonal(&Vector3::new(factors.x, factors.y, factors.z));
        Ok(Self::about(center, linear))
    }

    /// Conjugate a linear map so it fixes `center`.
    fn about(center: Point3d, linear: Matrix3<f64>) -> Self {
        let c: Vector3<f64> = center.to_vec3().into();
        Self {
            linear,
            translation: c - linear * c,
        }
    }

    pub fn transform_point(&self, p: &Point3d) -> Point3d {
        let v = self.linear * Vector3::new(p.x, p.y, p.z) + self.translation;
        Point3d::new(v.x, v.y, v.z)
    }

    /// Transform a direction (no translation).
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        (self.linear * Vector3::from(*v)).into()
    }

    pub fn determinant(&self) -> f64 {
        self.linear.determinant()
    }

    /// Compose two transforms: apply `self`, then `other`.
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            linear: other.linear * self.linear,
            translation: other.linear * self.translation + other.translation,
        }
    }

    /// Returns None if the linear part is singular.
    pub fn inverse(&self) -> Option<Self> {
        let inv = self.linear.try_inverse()?;
        Some(Transform {
            linear: inv,
            translation: -(inv * self.translation),
        })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Skew-symmetric matrix for cross product: skew(a) * b = a x b.
fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y,
        v.z, 0.0, -v.x,
        -v.y, v.x, 0.0,
    )
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3d,
    pub max: Point3d,
}

impl BoundingBox {
    pub fn new(min: Point3d, max: Point3d) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3d::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3d::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: &[Point3d]) -> Self {
        let mut bb = Self::empty();
        for p in points {
            bb.expand_to_include(p);
        }
        bb
    }

    pub fn expand_to_include(&mut self, p: &Point3d) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains_point(&self, p: &Point3d) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn center(&self) -> Point3d {
        self.min.midpoint(&self.max)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn diagonal(&self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        self.size().length()
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min: self.min - Vec3::new(margin, margin, margin),
            max: self.max + Vec3::new(margin, margin, margin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity_transform() {
        let p = Point3d::new(1.0, 2.0, 3.0);
        assert_relative_eq!(Transform::identity().transform_point(&p), p);
    }

    #[test]
    fn test_translation() {
        let t = Transform::translation(Vec3::new(10.0, 20.0, 30.0));
        let result = t.transform_point(&Point3d::new(1.0, 2.0, 3.0));
        assert_relative_eq!(result, Point3d::new(11.0, 22.0, 33.0));
        // Directions ignore translation.
        assert_relative_eq!(t.transform_vector(&Vec3::X), Vec3::X);
    }

    #[test]
    fn test_rotation_about_z_through_origin() {
        let t = Transform::rotation_about(Point3d::ORIGIN, Vec3::Z, FRAC_PI_2).unwrap();
        let result = t.transform_point(&Point3d::new(1.0, 0.0, 0.0));
        assert_relative_eq!(result, Point3d::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_about_offset_center_fixes_center() {
        let center = Point3d::new(1.0, 1.0, 0.0);
        let t = Transform::rotation_about(center, Vec3::Z, FRAC_PI_2).unwrap();
        assert_relative_eq!(t.transform_point(&center), center, epsilon = 1e-12);
        let result = t.transform_point(&Point3d::new(2.0, 1.0, 0.0));
        assert_relative_eq!(result, Point3d::new(1.0, 2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_rejects_zero_axis() {
        assert!(Transform::rotation_about(Point3d::ORIGIN, Vec3::ZERO, 1.0).is_err());
    }

    #[test]
    fn test_scaling_about_center() {
        let t = Transform::scaling_about(Point3d::new(1.0, 0.0, 0.0), Vec3::new(2.0, 3.0, 4.0))
            .unwrap();
        let result = t.transform_point(&Point3d::new(2.0, 1.0, 1.0));
        assert_relative_eq!(result, Point3d::new(3.0, 3.0, 4.0), epsilon = 1e-12);
        assert!((t.determinant() - 24.0).abs() < 1e-12);
        assert!(Transform::scaling_about(Point3d::ORIGIN, Vec3::new(1.0, 0.0, 1.0)).is_err());
    }

    #[test]
    fn test_compose_and_inverse() {
        let t1 = Transform::translation(Vec3::new(1.0, 0.0, 0.0));
        let t2 = Transform::rotation_about(Point3d::ORIGIN, Vec3::Z, FRAC_PI_2).unwrap();
        let combined = t1.then(&t2);
        // Translate to (1,0,0), then rotate to (0,1,0).
        let result = combined.transform_point(&Point3d::ORIGIN);
        assert_relative_eq!(result, Point3d::new(0.0, 1.0, 0.0), epsilon = 1e-12);

        let inv = combined.inverse().unwrap();
        let p = Point3d::new(1.0, 2.0, 3.0);
        let round_trip = inv.transform_point(&combined.transform_point(&p));
        assert_relative_eq!(round_trip, p, epsilon = 1e-12);
    }

    #[test]
    fn test_bounding_box() {
        let bb = BoundingBox::from_points(&[
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 2.0, 3.0),
            Point3d::new(-1.0, 0.5, 1.0),
        ]);
        assert!((bb.min.x - (-1.0)).abs() < 1e-12);
        assert!((bb.max.y - 2.0).abs() < 1e-12);
        assert!((bb.diagonal() - (4.0f64 + 4.0 + 9.0).sqrt()).abs() < 1e-12);
        assert_eq!(BoundingBox::empty().diagonal(), 0.0);
    }

    #[test]
    fn test_bounding_box_intersects() {
        let a = BoundingBox::new(Point3d::new(0.0, 0.0, 0.0), Point3d::new(2.0, 2.0, 2.0));
        let b = BoundingBox::new(Point3d::new(1.0, 1.0, 1.0), Point3d::new(3.0, 3.0, 3.0));
        let c = BoundingBox::new(Point3d::new(5.0, 5.0, 5.0), Point3d::new(6.0, 6.0, 6.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.expanded(3.0).intersects(&c));
    }
}
