use crate::shape::{point_in_ring, PathSink, Shape};
use crate::{GeometryError, Line, Point, Rect, Vector};

/// Closed polygon over an ordered vertex list. Containment uses the even-odd
/// rule, so self-intersecting polygons alternate filled and unfilled regions.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Result<Self, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::TooFewVertices(points.len()));
        }
        Ok(Self { points })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false // construction guarantees at least 3 vertices
    }

    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Point> {
        self.points.get_mut(index)
    }

    /// The edges as segments, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = Line> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| Line::new(self.points[i], self.points[(i + 1) % n]))
    }

    pub fn rotate(&mut self, angle: f64, pivot: Point) {
        for p in &mut self.points {
            p.rotate(angle, pivot);
        }
    }

    pub fn scale(&mut self, factor: Vector, pivot: Point) {
        for p in &mut self.points {
            p.scale(factor, pivot);
        }
    }

    /// Whether any edge of `self` crosses any edge of `other`, or either
    /// polygon wholly contains the other's first vertex.
    pub fn intersects(&self, other: &Polygon) -> bool {
        for a in self.edges() {
            for b in other.edges() {
                if a.intersects(&b) {
                    return true;
                }
            }
        }
        self.contains(other.points[0]) || other.contains(self.points[0])
    }
}

impl Shape for Polygon {
    fn contains(&self, point: Point) -> bool {
        point_in_ring(&self.points, point)
    }

    fn translate(&mut self, delta: Vector) {
        for p in &mut self.points {
            p.translate(delta);
        }
    }

    fn origin(&self) -> Point {
        self.points[0]
    }

    fn bounds(&self) -> Rect {
        let mut min = self.points[0];
        let mut max = self.points[0];
        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Rect::new(min, max)
    }

    fn trace(&self, sink: &mut dyn PathSink) {
        sink.move_to(self.points[0]);
        for p in &self.points[1..] {
            sink.line_to(*p);
        }
        sink.close();
    }
}
