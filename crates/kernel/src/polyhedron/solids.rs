use tracing::{info, instrument};

use super::{ConvexPolyhedron, Edge};
use crate::error::{GeometryError, GeometryResult};
use crate::geometry::{OrientedBox, Point3d, Tetrahedron, Vec3};

const PHI: f64 = 1.618_033_988_749_895;
const INV_PHI: f64 = 0.618_033_988_749_895;
const ONE_PLUS_SQRT2: f64 = 1.0 + std::f64::consts::SQRT_2;

/// Slack when gathering the vertices that support a face direction.
const SUPPORT_EPSILON: f64 = 1e-9;

fn check_radius(radius: f64) -> GeometryResult<f64> {
    if radius > 0.0 && radius.is_finite() {
        Ok(radius)
    } else {
        Err(GeometryError::InvalidArgument(format!(
            "circumradius must be positive, got {radius}"
        )))
    }
}

/// Every sign variant of `base`, optionally under its three cyclic
/// permutations. Duplicates from zero or repeated coordinates are dropped.
fn signed(base: [f64; 3], cyclic: bool) -> Vec<Vec3> {
    let rotations = if cyclic { 3 } else { 1 };
    let mut out: Vec<Vec3> = Vec::new();
    for r in 0..rotations {
        let c = [base[r], base[(r + 1) % 3], base[(r + 2) % 3]];
        for signs in 0..8u8 {
            let pick = |k: usize| if signs & (1 << k) != 0 { -c[k] } else { c[k] };
            let v = Vec3::new(pick(0), pick(1), pick(2));
            if !out.contains(&v) {
                out.push(v);
            }
        }
    }
    out
}

impl ConvexPolyhedron {
    /// The default tetrahedron (0,0,0), (0,1,1), (1,0,1), (1,1,0).
    pub fn tetrahedron() -> GeometryResult<Self> {
        Self::from_tetrahedron(&Tetrahedron::default())
    }

    #[instrument]
    pub fn from_tetrahedron(tetra: &Tetrahedron) -> GeometryResult<Self> {
        let [a, b, c, d] = tetra.vertices;
        let size = [b - a, c - a, d - a]
            .iter()
            .map(|v| v.length())
            .fold(0.0, f64::max);
        if tetra.volume() <= 1e-12 * size * size * size || size == 0.0 {
            return Err(GeometryError::InvalidArgument(
                "tetrahedron is degenerate".into(),
            ));
        }
        info!(volume = tetra.volume(), "creating tetrahedron");

        let edges = vec![
            Edge::new(0, 1),
            Edge::new(0, 2),
            Edge::new(0, 3),
            Edge::new(1, 2),
            Edge::new(1, 3),
            Edge::new(2, 3),
        ];
        // The corners come in any order, so let construction fix the winding.
        let faces = vec![vec![0, 1, 2], vec![0, 1, 3], vec![0, 2, 3], vec![1, 2, 3]];
        Self::new(tetra.vertices.to_vec(), edges, faces, true)
    }

    /// Axis-aligned cube with edge length `size`.
    pub fn cube(center: Point3d, size: f64) -> GeometryResult<Self> {
        Self::from_box(&OrientedBox::axis_aligned(center, Vec3::new(size, size, size))?)
    }

    #[instrument]
    pub fn from_box(b: &OrientedBox) -> GeometryResult<Self> {
        info!(center = ?b.center, half_extents = ?b.half_extents, "creating box");
        // Corner i has bit k set when it sits at +extent along axis k.
        let edges = vec![
            Edge::new(0, 1),
            Edge::new(2, 3),
            Edge::new(4, 5),
            Edge::new(6, 7),
            Edge::new(0, 2),
            Edge::new(1, 3),
            Edge::new(4, 6),
            Edge::new(5, 7),
            Edge::new(0, 4),
            Edge::new(1, 5),
            Edge::new(2, 6),
            Edge::new(3, 7),
        ];
        let faces = vec![
            vec![0, 4, 6, 2], // -axis 0
            vec![1, 3, 7, 5], // +axis 0
            vec![0, 1, 5, 4], // -axis 1
            vec![2, 6, 7, 3], // +axis 1
            vec![0, 2, 3, 1], // -axis 2
            vec![4, 5, 7, 6], // +axis 2
        ];
        Self::new(b.corners().to_vec(), edges, faces, false)
    }

    #[instrument]
    pub fn octahedron(center: Point3d, radius: f64) -> GeometryResult<Self> {
        let r = check_radius(radius)?;
        info!(?center, radius, "creating octahedron");
        let vertices = vec![
            center + Vec3::X * r,
            center - Vec3::X * r,
            center + Vec3::Y * r,
            center - Vec3::Y * r,
            center + Vec3::Z * r,
            center - Vec3::Z * r,
        ];
        let edges = vec![
            Edge::new(0, 2),
            Edge::new(0, 3),
            Edge::new(0, 4),
            Edge::new(0, 5),
            Edge::new(1, 2),
            Edge::new(1, 3),
            Edge::new(1, 4),
            Edge::new(1, 5),
            Edge::new(2, 4),
            Edge::new(2, 5),
            Edge::new(3, 4),
            Edge::new(3, 5),
        ];
        // One face per octant.
        let faces = vec![
            vec![0, 2, 4],
            vec![2, 1, 4],
            vec![3, 0, 4],
            vec![1, 3, 4],
            vec![2, 0, 5],
            vec![1, 2, 5],
            vec![0, 3, 5],
            vec![3, 1, 5],
        ];
        Self::new(vertices, edges, faces, false)
    }

    #[instrument]
    pub fn icosahedron(center: Point3d, radius: f64) -> GeometryResult<Self> {
        info!(?center, radius, "creating icosahedron");
        let vertices = signed([0.0, 1.0, PHI], true);
        let normals = [signed([1.0, 1.0, 1.0], false), signed([0.0, PHI, INV_PHI], true)].concat();
        Self::from_support_directions(center, radius, &vertices, &normals)
    }

    #[instrument]
    pub fn dodecahedron(center: Point3d, radius: f64) -> GeometryResult<Self> {
        info!(?center, radius, "creating dodecahedron");
        let vertices = [signed([1.0, 1.0, 1.0], false), signed([0.0, INV_PHI, PHI], true)].concat();
        let normals = signed([0.0, PHI, 1.0], true);
        Self::from_support_directions(center, radius, &vertices, &normals)
    }

    #[instrument]
    pub fn rhombic_dodecahedron(center: Point3d, radius: f64) -> GeometryResult<Self> {
        info!(?center, radius, "creating rhombic dodecahedron");
        let vertices = [signed([1.0, 1.0, 1.0], false), signed([2.0, 0.0, 0.0], true)].concat();
        let normals = signed([1.0, 1.0, 0.0], true);
        Self::from_support_directions(center, radius, &vertices, &normals)
    }

    #[instrument]
    pub fn cuboctahedron(center: Point3d, radius: f64) -> GeometryResult<Self> {
        info!(?center, radius, "creating cuboctahedron");
        let vertices = signed([1.0, 1.0, 0.0], true);
        let normals = [signed([1.0, 0.0, 0.0], true), signed([1.0, 1.0, 1.0], false)].concat();
        Self::from_support_directions(center, radius, &vertices, &normals)
    }

    #[instrument]
    pub fn rhombicuboctahedron(center: Point3d, radius: f64) -> GeometryResult<Self> {
        info!(?center, radius, "creating rhombicuboctahedron");
        let vertices = signed([1.0, 1.0, ONE_PLUS_SQRT2], true);
        let normals = [
            signed([1.0, 0.0, 0.0], true),
            signed([1.0, 1.0, 0.0], true),
            signed([1.0, 1.0, 1.0], false),
        ]
        .concat();
        Self::from_support_directions(center, radius, &vertices, &normals)
    }

    /// Build a solid from canonical vertex coordinates and one direction
    /// per face. Each face is the set of vertices supporting its direction,
    /// ordered counter-clockwise about it. The result is scaled to the
    /// circumradius and moved to `center`.
    fn from_support_directions(
        center: Point3d,
        radius: f64,
        canonical: &[Vec3],
        directions: &[Vec3],
    ) -> GeometryResult<Self> {
        let radius = check_radius(radius)?;
        let scale = radius / canonical.iter().map(|v| v.length()).fold(0.0, f64::max);

        let mut faces = Vec::with_capacity(directions.len());
        for dir in directions {
            let degenerate = || GeometryError::InvalidArgument("zero face direction".into());
            let n = dir.normalized().ok_or_else(degenerate)?;
            let u = n.any_perpendicular().ok_or_else(degenerate)?;
            let v = n.cross(&u);

            let support = canonical
                .iter()
                .map(|p| p.dot(&n))
                .fold(f64::NEG_INFINITY, f64::max);
            let mut face: Vec<usize> = (0..canonical.len())
                .filter(|&i| canonical[i].dot(&n) >= support - SUPPORT_EPSILON)
                .collect();

            let mid = face.iter().fold(Vec3::ZERO, |acc, &i| acc + canonical[i]) / face.len() as f64;
            let angle = |i: usize| {
                let d = canonical[i] - mid;
                d.dot(&v).atan2(d.dot(&u))
            };
            face.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
            faces.push(face);
        }

        let vertices = canonical.iter().map(|p| center + *p * scale).collect();
        Self::from_faces(vertices, faces, false)
    }
}
