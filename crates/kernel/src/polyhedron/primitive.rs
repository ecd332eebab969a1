use super::classify::PointClassification;
use super::ConvexPolyhedron;
use crate::Tolerance;
use crate::geometry::{Circle3d, OrientedBox, Point3d, Segment, Sphere, Triangle, Vec3};

impl ConvexPolyhedron {
    /// Faces that face `point` and contain its projection, as
    /// `(face index, projection, plane distance)`. On a convex polyhedron
    /// several faces qualify only when the projections meet at a shared
    /// edge or vertex, so they all report the same distance.
    pub fn facing_faces<'a>(
        &'a self,
        point: &'a Point3d,
        tol: &Tolerance,
    ) -> impl Iterator<Item = (usize, Point3d, f64)> + 'a {
        let tol = self.resolve(tol);
        self.faces.iter().enumerate().filter_map(move |(i, face)| {
            let d = face.signed_distance(self, point);
            if d < 0.0 {
                return None;
            }
            let projected = *point - face.normal * d;
            face.contains_projection(self, &projected, tol.epsilon)
                .then_some((i, projected, d))
        })
    }

    /// Closest point of the solid to `point`; points inside or on the
    /// boundary are returned unchanged.
    pub fn closest_point_to(&self, point: &Point3d, tol: &Tolerance) -> Point3d {
        if self.classify_point(point, tol) != PointClassification::Outside {
            return *point;
        }
        if let Some((_, projected, _)) = self.facing_faces(point, tol).next() {
            return projected;
        }
        let nearest = self
            .boundary_segments()
            .iter()
            .map(|s| s.closest_point(point).0)
            .min_by(|a, b| {
                a.distance_squared_to(point)
                    .total_cmp(&b.distance_squared_to(point))
            });
        debug_assert!(nearest.is_some(), "a closed polyhedron has boundary edges");
        nearest.unwrap_or(*point)
    }

    /// Zero for points inside or on the boundary.
    pub fn distance_to_point(&self, point: &Point3d, tol: &Tolerance) -> f64 {
        self.closest_point_to(point, tol).distance_to(point)
    }

    fn fan_minimum(&self, distance: impl Fn(&Triangle) -> f64) -> f64 {
        self.fan_triangles()
            .map(|t| distance(&t))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn distance_to_segment(&self, segment: &Segment, tol: &Tolerance) -> f64 {
        if self.contains_point(&segment.start, tol) || self.contains_point(&segment.end, tol) {
            return 0.0;
        }
        self.fan_minimum(|t| t.distance_to_segment(segment))
    }

    pub fn distance_to_triangle(&self, triangle: &Triangle, tol: &Tolerance) -> f64 {
        if triangle.vertices().iter().any(|v| self.contains_point(v, tol)) {
            return 0.0;
        }
        self.fan_minimum(|t| t.distance_to_triangle(triangle))
    }

    /// Distance to the circle as a curve. A ring around the solid that
    /// touches nothing stays at a positive distance.
    pub fn distance_to_circle(&self, circle: &Circle3d, tol: &Tolerance) -> f64 {
        if self.contains_point(&circle.point_at(0.0), tol) {
            return 0.0;
        }
        self.fan_minimum(|t| circle.distance_to_triangle(t))
    }

    /// Distance to the solid ball.
    pub fn distance_to_sphere(&self, sphere: &Sphere, tol: &Tolerance) -> f64 {
        (self.distance_to_point(&sphere.center, tol) - sphere.radius).max(0.0)
    }

    pub fn intersects_segment(&self, segment: &Segment, tol: &Tolerance) -> bool {
        !self.separated_from_primitive(
            &[segment.start, segment.end],
            &[],
            &[segment.direction()],
            tol,
        )
    }

    pub fn intersects_triangle(&self, triangle: &Triangle, tol: &Tolerance) -> bool {
        let normals: Vec<Vec3> = triangle.normal().into_iter().collect();
        let directions = triangle.edges().map(|e| e.direction());
        !self.separated_from_primitive(&triangle.vertices(), &normals, &directions, tol)
    }

    /// The box's axes serve as both its face normals and its edge
    /// directions.
    pub fn intersects_box(&self, b: &OrientedBox, tol: &Tolerance) -> bool {
        !self.separated_from_primitive(&b.corners(), &b.axes, &b.axes, tol)
    }

    pub fn is_inside_box(&self, b: &OrientedBox, tol: &Tolerance) -> bool {
        let tol = self.resolve(tol);
        self.vertices.iter().all(|v| b.contains_point(v, &tol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> ConvexPolyhedron {
        ConvexPolyhedron::cube(Point3d::ORIGIN, 1.0).unwrap()
    }

    #[test]
    fn test_point_distance_regions() {
        let cube = unit_cube();
        let tol = Tolerance::default();
        // Face region.
        assert!((cube.distance_to_point(&Point3d::new(2.0, 0.1, 0.2), &tol) - 1.5).abs() < 1e-12);
        // Edge region.
        let d = cube.distance_to_point(&Point3d::new(1.5, 1.5, 0.0), &tol);
        assert!((d - 2f64.sqrt()).abs() < 1e-12);
        // Vertex region.
        let d = cube.distance_to_point(&Point3d::new(1.5, 1.5, 1.5), &tol);
        assert!((d - 3f64.sqrt()).abs() < 1e-12);
        // Inside and on the boundary.
        assert_eq!(cube.distance_to_point(&Point3d::new(0.1, 0.0, 0.0), &tol), 0.0);
        assert_eq!(cube.distance_to_point(&Point3d::new(0.5, 0.2, 0.0), &tol), 0.0);
    }

    #[test]
    fn test_closest_point_to() {
        let cube = unit_cube();
        let tol = Tolerance::default();
        let q = cube.closest_point_to(&Point3d::new(1.5, 1.5, 0.2), &tol);
        assert!(q.distance_to(&Point3d::new(0.5, 0.5, 0.2)) < 1e-12);
        let inside = Point3d::new(0.1, 0.2, 0.3);
        assert_eq!(cube.closest_point_to(&inside, &tol), inside);
    }

    #[test]
    fn test_facing_faces_agree() {
        let oct = ConvexPolyhedron::octahedron(Point3d::ORIGIN, 1.0).unwrap();
        let tol = Tolerance::default();
        let p = Point3d::new(1.0, 1.0, 1.0);
        let hits: Vec<_> = oct.facing_faces(&p, &tol).collect();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].2 - 2.0 / 3f64.sqrt()).abs() < 1e-12);

        // Off the face regions: no face qualifies and the tip is nearest.
        let beyond_tip = Point3d::new(2.0, 0.0, 0.0);
        assert_eq!(oct.facing_faces(&beyond_tip, &tol).count(), 0);
        assert!((oct.distance_to_point(&beyond_tip, &tol) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_segment_queries() {
        let cube = unit_cube();
        let tol = Tolerance::default();
        let above = Segment::new(Point3d::new(-2.0, 0.0, 1.5), Point3d::new(2.0, 0.0, 1.5));
        assert!((cube.distance_to_segment(&above, &tol) - 1.0).abs() < 1e-12);
        assert!(!cube.intersects_segment(&above, &tol));

        // Passes through without an endpoint inside.
        let through = Segment::new(Point3d::new(-2.0, 0.1, 0.1), Point3d::new(2.0, 0.1, 0.1));
        assert!(cube.intersects_segment(&through, &tol));
        assert_eq!(cube.distance_to_segment(&through, &tol), 0.0);

        let from_inside = Segment::new(Point3d::ORIGIN, Point3d::new(5.0, 5.0, 5.0));
        assert_eq!(cube.distance_to_segment(&from_inside, &tol), 0.0);
    }

    #[test]
    fn test_triangle_queries() {
        let cube = unit_cube();
        let tol = Tolerance::default();
        let far = Triangle::new(
            Point3d::new(1.5, -1.0, -1.0),
            Point3d::new(1.5, 1.0, -1.0),
            Point3d::new(1.5, 0.0, 1.0),
        );
        assert!((cube.distance_to_triangle(&far, &tol) - 1.0).abs() < 1e-12);
        assert!(!cube.intersects_triangle(&far, &tol));

        // A large triangle slicing the cube with all corners outside.
        let slicing = Triangle::new(
            Point3d::new(-5.0, -5.0, 0.0),
            Point3d::new(5.0, -5.0, 0.0),
            Point3d::new(0.0, 5.0, 0.0),
        );
        assert!(cube.intersects_triangle(&slicing, &tol));
        assert_eq!(cube.distance_to_triangle(&slicing, &tol), 0.0);
    }

    #[test]
    fn test_circle_is_a_ring() {
        let cube = unit_cube();
        let tol = Tolerance::default();
        let around = Circle3d::new(Point3d::ORIGIN, Vec3::Z, 2.0).unwrap();
        let expected = 2.0 - 0.5 * 2f64.sqrt();
        assert!((cube.distance_to_circle(&around, &tol) - expected).abs() < 1e-9);

        let through = Circle3d::new(Point3d::ORIGIN, Vec3::Z, 0.4).unwrap();
        assert_eq!(cube.distance_to_circle(&through, &tol), 0.0);

        let beside = Circle3d::new(Point3d::new(3.0, 0.0, 0.0), Vec3::Z, 1.0).unwrap();
        assert!((cube.distance_to_circle(&beside, &tol) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_sphere_distance() {
        let cube = unit_cube();
        let tol = Tolerance::default();
        let near = Sphere::new(Point3d::new(3.0, 0.0, 0.0), 1.0);
        assert!((cube.distance_to_sphere(&near, &tol) - 1.5).abs() < 1e-12);
        let enclosing = Sphere::new(Point3d::ORIGIN, 10.0);
        assert_eq!(cube.distance_to_sphere(&enclosing, &tol), 0.0);
    }

    #[test]
    fn test_box_queries() {
        let cube = unit_cube();
        let tol = Tolerance::default();
        let big = OrientedBox::axis_aligned(Point3d::ORIGIN, Vec3::new(2.0, 2.0, 2.0)).unwrap();
        assert!(cube.is_inside_box(&big, &tol));
        assert!(cube.intersects_box(&big, &tol));

        let s = 0.5f64.sqrt();
        let turned = OrientedBox::new(
            Point3d::new(1.2, 1.2, 0.0),
            [Vec3::new(s, s, 0.0), Vec3::new(-s, s, 0.0), Vec3::Z],
            Vec3::new(0.5, 0.5, 0.5),
        )
        .unwrap();
        // Corner-on approach: the box's nearest face sits at x + y = 2.4 - sqrt(2) / 2.
        assert!(!cube.intersects_box(&turned, &tol));
        assert!(!cube.is_inside_box(&turned, &tol));

        let overlapping = OrientedBox::axis_aligned(Point3d::new(0.9, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)).unwrap();
        assert!(cube.intersects_box(&overlapping, &tol));
    }
}
