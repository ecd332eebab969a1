use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::transform::BoundingBox;
use super::vector::Vec3;
use crate::Tolerance;
use crate::error::{GeometryError, GeometryResult};

/// A box with an arbitrary orthonormal frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox {
    pub center: Point3d,
    /// Unit, mutually orthogonal, right-handed local axes.
    pub axes: [Vec3; 3],
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// Build a box from its frame. The axes are normalized and must be
    /// mutually orthogonal; they are reordered into a right-handed frame
    /// by flipping the third axis if needed.
    pub fn new(center: Point3d, axes: [Vec3; 3], half_extents: Vec3) -> GeometryResult<Self> {
        if [half_extents.x, half_extents.y, half_extents.z]
            .iter()
            .any(|h| !(*h > 0.0 && h.is_finite()))
        {
            return Err(GeometryError::InvalidArgument(
                "box half extents must be positive".into(),
            ));
        }

        let mut unit = [Vec3::ZERO; 3];
        for (i, axis) in axes.iter().enumerate() {
            unit[i] = axis.normalized().ok_or_else(|| {
                GeometryError::InvalidArgument(format!("box axis {i} has zero length"))
            })?;
        }
        for (i, j) in [(0, 1), (0, 2), (1, 2)] {
            if unit[i].dot(&unit[j]).abs() > 1e-9 {
                return Err(GeometryError::InvalidArgument(format!(
                    "box axes {i} and {j} are not orthogonal"
                )));
            }
        }
        if unit[0].triple(&unit[1], &unit[2]) < 0.0 {
            unit[2] = -unit[2];
        }

        Ok(Self {
            center,
            axes: unit,
            half_extents,
        })
    }

    /// Axis-aligned box with full edge lengths `size`.
    pub fn axis_aligned(center: Point3d, size: Vec3) -> GeometryResult<Self> {
        Self::new(center, [Vec3::X, Vec3::Y, Vec3::Z], size * 0.5)
    }

    pub fn from_bounding_box(bb: &BoundingBox) -> GeometryResult<Self> {
        Self::axis_aligned(bb.center(), bb.size())
    }

    fn extent(&self, i: usize) -> f64 {
        match i {
            0 => self.half_extents.x,
            1 => self.half_extents.y,
            _ => self.half_extents.z,
        }
    }

    /// Corner `i` takes the positive extent along axis `k` when bit `k`
    /// of `i` is set.
    pub fn corners(&self) -> [Point3d; 8] {
        std::array::from_fn(|i| {
            (0..3).fold(self.center, |p, k| {
                let sign = if i & (1 << k) != 0 { 1.0 } else { -1.0 };
                p + self.axes[k] * (sign * self.extent(k))
            })
        })
    }

    pub fn contains_point(&self, p: &Point3d, tol: &Tolerance) -> bool {
        let d = *p - self.center;
        (0..3).all(|k| !tol.greater(d.dot(&self.axes[k]).abs(), self.extent(k)))
    }

    pub fn volume(&self) -> f64 {
        8.0 * self.half_extents.x * self.half_extents.y * self.half_extents.z
    }
}
