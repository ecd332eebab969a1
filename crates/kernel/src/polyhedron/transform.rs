use tracing::debug;

use super::{ConvexPolyhedron, face_normal};
use crate::error::{GeometryError, GeometryResult};
use crate::geometry::{Point3d, Transform, Vec3};

/// Linear parts with a smaller determinant are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-15;

impl ConvexPolyhedron {
    pub fn translated(&self, offset: Vec3) -> Self {
        let mut moved = self.clone();
        moved.translate_in_place(offset);
        moved
    }

    pub fn rotated(&self, center: Point3d, axis: Vec3, angle: f64) -> GeometryResult<Self> {
        self.transformed(&Transform::rotation_about(center, axis, angle)?)
    }

    pub fn scaled(&self, center: Point3d, factors: Vec3) -> GeometryResult<Self> {
        self.transformed(&Transform::scaling_about(center, factors)?)
    }

    pub fn scaled_uniform(&self, center: Point3d, factor: f64) -> GeometryResult<Self> {
        self.scaled(center, Vec3::new(factor, factor, factor))
    }

    pub fn transformed(&self, transform: &Transform) -> GeometryResult<Self> {
        let mut moved = self.clone();
        moved.transform_in_place(transform)?;
        Ok(moved)
    }

    /// Translation leaves the normals untouched.
    pub fn translate_in_place(&mut self, offset: Vec3) -> &mut Self {
        for v in &mut self.vertices {
            *v += offset;
        }
        self.invalidate_caches();
        debug!(?offset, "translated in place");
        self
    }

    pub fn rotate_in_place(
        &mut self,
        center: Point3d,
        axis: Vec3,
        angle: f64,
    ) -> GeometryResult<&mut Self> {
        self.transform_in_place(&Transform::rotation_about(center, axis, angle)?)
    }

    pub fn scale_in_place(&mut self, center: Point3d, factors: Vec3) -> GeometryResult<&mut Self> {
        self.transform_in_place(&Transform::scaling_about(center, factors)?)
    }

    /// Apply an affine transform and recompute every face normal.
    ///
    /// A reflection reverses each face's winding so the normals keep
    /// pointing outward. On error the polyhedron is left unchanged.
    pub fn transform_in_place(&mut self, transform: &Transform) -> GeometryResult<&mut Self> {
        let det = transform.determinant();
        if !det.is_finite() || det.abs() <= SINGULAR_EPSILON {
            return Err(GeometryError::InvalidArgument(format!(
                "transform is singular (determinant {det:e})"
            )));
        }

        let vertices: Vec<Point3d> = self
            .vertices
            .iter()
            .map(|p| transform.transform_point(p))
            .collect();
        let mut faces = self.faces.clone();
        for (f, face) in faces.iter_mut().enumerate() {
            if det < 0.0 {
                face.vertices.reverse();
            }
            face.normal = face_normal(&vertices, &face.vertices)
                .ok_or(GeometryError::DegenerateFace { face: f })?;
        }

        self.vertices = vertices;
        self.faces = faces;
        self.invalidate_caches();
        debug!(det, mirrored = det < 0.0, "transformed in place");
        Ok(self)
    }
}
