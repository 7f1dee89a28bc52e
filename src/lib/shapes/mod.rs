//! Closed and open 2D paths, built as sequences of relative moves.
//!
//! A [`Path`] is plain data: nothing is written until [`Path::write`] is called, which lets the drilling
//! envelope replay the same path once per depth pass.

use core::f64;
use std::io::{Result, Write};

use nalgebra::geometry::Point2;
use nalgebra::Vector3;

use crate::{g0, g1, xyf, PosAndFeed};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// G0
    Rapid(PosAndFeed),
    /// G1
    Steady(PosAndFeed),
}

impl Motion {
    pub fn delta(&self) -> Vector3<f64> {
        let p = match self {
            Motion::Rapid(p) | Motion::Steady(p) => p,
        };
        Vector3::new(p.x, p.y, p.z)
    }

    pub fn write(&self, file: &mut dyn Write) -> Result<()> {
        match *self {
            Motion::Rapid(p) => g0(file, p),
            Motion::Steady(p) => g1(file, p),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    moves: Vec<Motion>,
}

impl Path {
    pub fn new() -> Self {
        Path { moves: Vec::new() }
    }

    pub fn moves(&self) -> &[Motion] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn rapid(&mut self, p: PosAndFeed) {
        self.moves.push(Motion::Rapid(p));
    }

    pub fn steady(&mut self, p: PosAndFeed) {
        self.moves.push(Motion::Steady(p));
    }

    pub fn append(&mut self, other: &Path) {
        self.moves.extend_from_slice(&other.moves);
    }

    /// Sum of every move, i.e. where the path ends relative to where it started
    pub fn displacement(&self) -> Vector3<f64> {
        self.moves.iter().map(Motion::delta).sum()
    }

    pub fn write(&self, file: &mut dyn Write) -> Result<()> {
        for m in &self.moves {
            m.write(file)?;
        }
        Ok(())
    }
}

pub fn line(delta_x: f64, delta_y: f64, speed: f64) -> Path {
    let mut path = Path::new();
    path.steady(xyf(delta_x, delta_y, speed));
    path
}

/// Right, up, left, down: ends where it started
pub fn rectangle(base: f64, height: f64, speed: f64) -> Path {
    let mut path = Path::new();
    path.steady(xyf(base, 0.0, speed));
    path.steady(xyf(0.0, height, speed));
    path.steady(xyf(-base, 0.0, speed));
    path.steady(xyf(0.0, -height, speed));
    path
}

/// Full circle approximated by `facets` chords, starting on the circle at `start_angle` (radians)
pub fn circle(diameter: f64, facets: usize, start_angle: f64, speed: f64) -> Path {
    arc(
        diameter / 2.0,
        facets,
        start_angle,
        start_angle + f64::consts::TAU,
        speed,
    )
}

/// Arc from `start_angle` to `end_angle` (radians, either direction) split into `facets` equal chords.
/// The path starts at the point of the circle at `start_angle`; the circle's center is implied.
pub fn arc(radius: f64, facets: usize, start_angle: f64, end_angle: f64, speed: f64) -> Path {
    let step = (end_angle - start_angle) / facets as f64;
    let on_circle = |angle: f64| Point2::new(radius * angle.cos(), radius * angle.sin());

    let mut path = Path::new();
    let mut old = on_circle(start_angle);
    for i in 1..=facets {
        let new = on_circle(start_angle + i as f64 * step);
        path.steady(xyf(new.x - old.x, new.y - old.y, speed));
        old = new;
    }
    path
}

/// Edges between consecutive points, the first one from (0, 0). If `close_shape` is set a last edge
/// returns to (0, 0).
pub fn polygon(points: &[Point2<f64>], close_shape: bool, speed: f64) -> Path {
    let mut path = Path::new();
    let mut old = Point2::origin();
    for p in points {
        path.steady(xyf(p.x - old.x, p.y - old.y, speed));
        old = *p;
    }
    if close_shape {
        path.steady(xyf(-old.x, -old.y, speed));
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn rectangle_is_closed() {
        for &(base, height) in &[(10.0, 5.0), (0.3, 17.25), (-4.0, 2.0)] {
            let d = rectangle(base, height, 300.0).displacement();
            assert_eq!(d, Vector3::zeros());
        }
    }

    #[test]
    fn rectangle_writes_four_edges() {
        let mut out = Vec::new();
        rectangle(10.0, 5.0, 300.0).write(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "G1 X10. F300.\nG1 Y5. F300.\nG1 X-10. F300.\nG1 Y-5. F300.\n"
        );
    }

    #[test]
    fn arc_chords_end_on_circle() {
        let radius = 3.0;
        let n = 8;
        let path = arc(radius, n, 0.0, f64::consts::PI, 300.0);
        assert_eq!(path.len(), n);

        // Walk the chords from the start point and check every vertex
        let mut p = Point2::new(radius, 0.0);
        for (i, m) in path.moves().iter().enumerate() {
            let d = m.delta();
            p += nalgebra::Vector2::new(d.x, d.y);
            let angle = (i + 1) as f64 * f64::consts::PI / n as f64;
            assert!((p.coords.norm() - radius).abs() < EPSILON);
            assert!((p.x - radius * angle.cos()).abs() < EPSILON);
            assert!((p.y - radius * angle.sin()).abs() < EPSILON);
        }
        assert!((p.x + radius).abs() < EPSILON);
    }

    #[test]
    fn circle_returns_to_start() {
        let path = circle(8.0, 64, 0.3, 300.0);
        assert_eq!(path.len(), 64);
        assert!(path.displacement().norm() < EPSILON);
    }

    #[test]
    fn arc_can_run_clockwise() {
        let path = arc(1.5, 4, f64::consts::PI, f64::consts::FRAC_PI_2, 300.0);
        let d = path.displacement();
        assert!((d.x - 1.5).abs() < EPSILON);
        assert!((d.y - 1.5).abs() < EPSILON);
    }

    #[test]
    fn polygon_edges_are_relative() {
        let points = [Point2::new(2.0, 0.0), Point2::new(2.0, 3.0)];
        let path = polygon(&points, true, 100.0);
        assert_eq!(path.len(), 3);
        assert_eq!(path.moves()[1].delta(), Vector3::new(0.0, 3.0, 0.0));
        assert_eq!(path.displacement(), Vector3::zeros());

        let open = polygon(&points, false, 100.0);
        assert_eq!(open.displacement(), Vector3::new(2.0, 3.0, 0.0));
    }
}
