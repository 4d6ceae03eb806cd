use crate::shape::{PathSink, Shape};
use crate::{Point, Rect, Vector};

/// A line segment. As a [`Shape`] it is degenerate: containment means the
/// point lies on the segment itself (within a small tolerance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub from: Point,
    pub to: Point,
}

/// Collinearity tolerance for [`Line::contains`]: the triangle area test is
/// rounded at the sixth decimal, so near-hits from float noise still count.
const AREA_EPSILON: f64 = 1e-6;

impl Line {
    #[inline]
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.from.distance_to(self.to)
    }

    /// Intersection point of the two segments, if they cross.
    /// Parallel (including collinear) segments yield `None`.
    pub fn intersection(&self, other: &Line) -> Option<Point> {
        let (a1, a2) = (self.from, self.to);
        let (b1, b2) = (other.from, other.to);
        let d = (a1.x - a2.x) * (b1.y - b2.y) - (a1.y - a2.y) * (b1.x - b2.x);
        if d == 0.0 {
            return None;
        }
        let t = ((a1.x - b1.x) * (b1.y - b2.y) - (a1.y - b1.y) * (b1.x - b2.x)) / d;
        let u = ((a1.x - b1.x) * (a1.y - a2.y) - (a1.y - b1.y) * (a1.x - a2.x)) / d;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some(Point::new(
                a1.x + t * (a2.x - a1.x),
                a1.y + t * (a2.y - a1.y),
            ))
        } else {
            None
        }
    }

    pub fn intersects(&self, other: &Line) -> bool {
        self.intersection(other).is_some()
    }

    /// Distance from `p` to the segment, or to the infinite carrier line
    /// when `infinite` is set.
    pub fn distance_to(&self, p: Point, infinite: bool) -> f64 {
        let d = self.from.diff(self.to);
        let len2 = d.x * d.x + d.y * d.y;
        if len2 == 0.0 {
            return self.from.distance_to(p);
        }
        let t = ((p.x - self.from.x) * d.x + (p.y - self.from.y) * d.y) / len2;
        let t = if infinite { t } else { t.clamp(0.0, 1.0) };
        p.distance_to(Point::new(self.from.x + t * d.x, self.from.y + t * d.y))
    }
}

impl Shape for Line {
    fn contains(&self, point: Point) -> bool {
        let b = self.bounds().grown(AREA_EPSILON);
        if !b.contains(point) {
            return false;
        }
        // Twice the triangle area; zero means collinear.
        let area = (self.to.x - self.from.x) * (point.y - self.from.y)
            - (self.to.y - self.from.y) * (point.x - self.from.x);
        area.abs() < AREA_EPSILON
    }

    fn translate(&mut self, delta: Vector) {
        self.from.translate(delta);
        self.to.translate(delta);
    }

    fn origin(&self) -> Point {
        self.from
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.from, self.to).normalized()
    }

    fn trace(&self, sink: &mut dyn PathSink) {
        sink.move_to(self.from);
        sink.line_to(self.to);
    }
}
