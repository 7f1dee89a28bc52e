use crate::Error;
use core::f64;
use nalgebra::geometry::Point2;
use nalgebra::Vector2;

/// An ordered list of points, implicitly closed unless stated otherwise.
/// Transforms never modify a polygon in place, they all return a new one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point2<f64>>,
}

impl From<Vec<Point2<f64>>> for Polygon {
    fn from(points: Vec<Point2<f64>>) -> Self {
        Polygon { points }
    }
}

impl Polygon {
    pub fn new(points: Vec<Point2<f64>>) -> Self {
        Polygon { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Four corners of an axis-aligned rectangle, counter-clockwise from (`x_offset`, `y_offset`)
    pub fn rectangle(x_offset: f64, y_offset: f64, x_length: f64, y_length: f64) -> Self {
        Polygon::new(vec![
            Point2::new(x_offset, y_offset),
            Point2::new(x_offset + x_length, y_offset),
            Point2::new(x_offset + x_length, y_offset + y_length),
            Point2::new(x_offset, y_offset + y_length),
        ])
    }

    /// Regular convex polygon inscribed in a circle of `diameter`, centered on the origin
    pub fn regular(diameter: f64, facets: usize) -> Self {
        let points = (0..facets)
            .map(|i| {
                let angle = i as f64 * f64::consts::TAU / facets as f64;
                Point2::new(diameter / 2.0 * angle.cos(), diameter / 2.0 * angle.sin())
            })
            .collect();
        Polygon::new(points)
    }

    /// Bounding box corners, as (min, max). None for an empty polygon.
    pub fn min_max(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        let first = *self.points.first()?;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (
                Point2::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point2::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }

    /// Split the first point off as a placement offset. The remaining points are made relative to it,
    /// and if `close_shape` is set the shape ends back at (0, 0).
    pub fn extract_offset(&self, close_shape: bool) -> (Vector2<f64>, Polygon) {
        let offset = match self.points.first() {
            Some(p) => p.coords,
            None => return (Vector2::zeros(), Polygon::default()),
        };
        let mut points: Vec<Point2<f64>> = self.points[1..].iter().map(|p| p - offset).collect();
        if close_shape {
            points.push(Point2::origin());
        }
        (offset, Polygon::new(points))
    }

    /// Mirror around the x axis
    pub fn flip_vertical(&self) -> Self {
        self.map(|p| Point2::new(p.x, -p.y))
    }

    /// Mirror around the y axis
    pub fn flip_horizontal(&self) -> Self {
        self.map(|p| Point2::new(-p.x, p.y))
    }

    pub fn offset(&self, delta_x: f64, delta_y: f64) -> Self {
        let delta = Vector2::new(delta_x, delta_y);
        self.map(|p| p + delta)
    }

    /// Scale by independent factors. `scale_y` of None scales y like x.
    pub fn scale(&self, scale_x: f64, scale_y: Option<f64>) -> Self {
        let scale_y = scale_y.unwrap_or(scale_x);
        self.map(|p| Point2::new(p.x * scale_x, p.y * scale_y))
    }

    /// Rotate counter-clockwise around the origin, `angle` in radians
    pub fn rotate(&self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        self.map(|p| Point2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos))
    }

    /// Move every edge outward by `distance` along its normal, and join consecutive edges at the
    /// intersection of their offset lines. Outward is to the right of the walking direction, so a negative
    /// distance shrinks a counter-clockwise polygon.
    pub fn expand(&self, distance: f64) -> Result<Self, Error> {
        let n = self.points.len();
        let mut points = Vec::with_capacity(n);
        for i in 0..n {
            let prev = self.points[(i + n - 1) % n];
            let here = self.points[i];
            let next = self.points[(i + 1) % n];

            let d1 = here - prev;
            let d2 = next - here;
            if d1.norm() == 0.0 {
                return Err(Error::DegenerateEdge(i));
            }
            if d2.norm() == 0.0 {
                return Err(Error::DegenerateEdge((i + 1) % n));
            }
            let n1 = Vector2::new(d1.y, -d1.x).normalize() * distance;
            let n2 = Vector2::new(d2.y, -d2.x).normalize() * distance;

            // Offset lines: (here + n1) + t*d1 and (here + n2) + s*d2
            let a = here + n1;
            let b = here + n2;
            let denom = cross(&d1, &d2);
            if denom.abs() < f64::EPSILON {
                // Collinear edges: both offsets land on the same point
                points.push(a);
            } else {
                let t = cross(&(b - a), &d2) / denom;
                points.push(a + d1 * t);
            }
        }
        Ok(Polygon::new(points))
    }

    /// Corners where the outline turns by less than `start_angle` (radians, negative is clockwise).
    /// With the default of 0 these are the clockwise turns of a counter-clockwise outline: the inside
    /// corners a round drill can't reach without an extra hole.
    pub fn hole_set(&self, start_angle: f64) -> Vec<Point2<f64>> {
        let n = self.points.len();
        (0..n)
            .filter_map(|i| {
                let prev = self.points[(i + n - 1) % n];
                let here = self.points[i];
                let next = self.points[(i + 1) % n];
                let angle_p = (here.y - prev.y).atan2(here.x - prev.x);
                let angle_n = (next.y - here.y).atan2(next.x - here.x);
                let mut turn = angle_n - angle_p;
                if turn > f64::consts::PI {
                    turn -= f64::consts::TAU;
                }
                if turn < -f64::consts::PI {
                    turn += f64::consts::TAU;
                }
                (turn < start_angle).then_some(here)
            })
            .collect()
    }

    /// Intersections of the segment `a`-`b` with the polygon's open chain of edges (the closing edge from
    /// last to first point is not included). Each hit comes with the index of the edge's first point.
    pub fn segment_intersections(
        &self,
        a: Point2<f64>,
        b: Point2<f64>,
    ) -> Vec<(Point2<f64>, usize)> {
        let dir = b - a;
        self.points
            .windows(2)
            .enumerate()
            .filter_map(|(index, edge)| {
                let edge_dir = edge[1] - edge[0];
                let denom = cross(&dir, &edge_dir);
                if denom.abs() < f64::EPSILON {
                    return None;
                }
                let offset = edge[0] - a;
                let t = cross(&offset, &edge_dir) / denom;
                let s = cross(&offset, &dir) / denom;
                if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&s) {
                    Some((a + dir * t, index))
                } else {
                    None
                }
            })
            .collect()
    }

    fn map(&self, f: impl Fn(&Point2<f64>) -> Point2<f64>) -> Self {
        Polygon::new(self.points.iter().map(f).collect())
    }
}

fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    fn points_equal(p1: Point2<f64>, p2: Point2<f64>) -> bool {
        (p1 - p2).norm() < EPSILON
    }

    fn square() -> Polygon {
        Polygon::rectangle(0.0, 0.0, 2.0, 2.0)
    }

    #[test]
    fn test_min_max() {
        let p = Polygon::new(vec![
            Point2::new(1.0, -2.0),
            Point2::new(-3.0, 4.0),
            Point2::new(2.0, 0.5),
        ]);
        let (lo, hi) = p.min_max().unwrap();
        assert!(points_equal(lo, Point2::new(-3.0, -2.0)));
        assert!(points_equal(hi, Point2::new(2.0, 4.0)));
        assert!(Polygon::default().min_max().is_none());
    }

    #[test]
    fn test_extract_offset() {
        let p = Polygon::rectangle(5.0, 7.0, 2.0, 1.0);
        let (offset, local) = p.extract_offset(true);
        assert_eq!(offset, Vector2::new(5.0, 7.0));
        assert_eq!(local.len(), 4);
        assert!(points_equal(local.points[0], Point2::new(2.0, 0.0)));
        assert!(points_equal(local.points[1], Point2::new(2.0, 1.0)));
        assert!(points_equal(local.points[3], Point2::origin()));

        let (_, open) = p.extract_offset(false);
        assert_eq!(open.len(), 3);
    }

    #[test]
    fn test_transforms_return_new_polygons() {
        let p = square();
        let flipped = p.flip_vertical();
        assert!(points_equal(flipped.points[2], Point2::new(2.0, -2.0)));
        assert!(points_equal(p.points[2], Point2::new(2.0, 2.0)));

        let mirrored = p.flip_horizontal();
        assert!(points_equal(mirrored.points[1], Point2::new(-2.0, 0.0)));

        let moved = p.offset(1.0, -1.0);
        assert!(points_equal(moved.points[0], Point2::new(1.0, -1.0)));

        let scaled = p.scale(2.0, None);
        assert!(points_equal(scaled.points[2], Point2::new(4.0, 4.0)));
        let stretched = p.scale(2.0, Some(0.5));
        assert!(points_equal(stretched.points[2], Point2::new(4.0, 1.0)));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let p = Polygon::new(vec![Point2::new(1.0, 0.0), Point2::new(0.0, 2.0)]);
        let r = p.rotate(f64::consts::FRAC_PI_2);
        assert!(points_equal(r.points[0], Point2::new(0.0, 1.0)));
        assert!(points_equal(r.points[1], Point2::new(-2.0, 0.0)));
    }

    #[test]
    fn test_regular_polygon_on_circle() {
        let p = Polygon::regular(10.0, 6);
        assert_eq!(p.len(), 6);
        for point in &p.points {
            assert!((point.coords.norm() - 5.0).abs() < EPSILON);
        }
        assert!(points_equal(p.points[0], Point2::new(5.0, 0.0)));
    }

    #[test]
    fn test_expand_square() {
        // Counter-clockwise square, right of travel is outside
        let grown = square().expand(1.0).unwrap();
        assert!(points_equal(grown.points[0], Point2::new(-1.0, -1.0)));
        assert!(points_equal(grown.points[1], Point2::new(3.0, -1.0)));
        assert!(points_equal(grown.points[2], Point2::new(3.0, 3.0)));
        assert!(points_equal(grown.points[3], Point2::new(-1.0, 3.0)));

        let shrunk = square().expand(-0.5).unwrap();
        assert!(points_equal(shrunk.points[0], Point2::new(0.5, 0.5)));
    }

    #[test]
    fn test_expand_rejects_zero_length_edge() {
        let p = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
        ]);
        assert_eq!(p.expand(1.0), Err(Error::DegenerateEdge(1)));
    }

    #[test]
    fn test_hole_set_finds_inside_corner() {
        // L shape, counter-clockwise; (1, 1) is the only clockwise turn
        let l = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ]);
        let holes = l.hole_set(0.0);
        assert_eq!(holes.len(), 1);
        assert!(points_equal(holes[0], Point2::new(1.0, 1.0)));
        assert!(square().hole_set(0.0).is_empty());
    }

    #[test]
    fn test_segment_intersections() {
        let chain = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
        ]);
        let hits = chain.segment_intersections(Point2::new(2.0, -1.0), Point2::new(6.0, 3.0));
        assert_eq!(hits.len(), 2);
        assert!(points_equal(hits[0].0, Point2::new(3.0, 0.0)));
        assert_eq!(hits[0].1, 0);
        assert!(points_equal(hits[1].0, Point2::new(4.0, 1.0)));
        assert_eq!(hits[1].1, 1);

        let miss = chain.segment_intersections(Point2::new(-1.0, 1.0), Point2::new(-1.0, 3.0));
        assert!(miss.is_empty());
    }
}
