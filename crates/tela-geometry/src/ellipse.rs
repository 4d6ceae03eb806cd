use std::cell::RefCell;

use crate::shape::{cubic_at, point_in_ring, PathSink, Shape};
use crate::{Point, Rect, Vector};

/// Bezier approximation constant for a quarter circle,
/// `4/3 * (sqrt(2) - 1)`.
const KAPPA: f64 = 0.5522848;

/// Samples per bezier segment when flattening for containment.
const FLATTEN_STEPS: usize = 16;

/// Ellipse inscribed in a rectangle, optionally rotated about the rectangle
/// center. The outline is approximated by four cubic beziers whose twelve
/// control points are cached and rebuilt lazily after any mutation.
#[derive(Debug, Clone)]
pub struct Ellipse {
    rect: Rect,
    angle: f64,
    cache: RefCell<Option<[Point; 12]>>,
}

impl PartialEq for Ellipse {
    fn eq(&self, other: &Self) -> bool {
        self.rect == other.rect && self.angle == other.angle
    }
}

impl Ellipse {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            angle: 0.0,
            cache: RefCell::new(None),
        }
    }

    pub fn from_points(from: Point, to: Point) -> Self {
        Self::new(Rect::new(from, to))
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
        self.invalidate();
    }

    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Rotate by `delta` radians about the rectangle center. The stored
    /// angle stays normalized into `[0, 2π)`.
    pub fn rotate(&mut self, delta: f64) {
        self.angle = crate::angle::normalize(self.angle + delta);
        self.invalidate();
    }

    fn invalidate(&self) {
        *self.cache.borrow_mut() = None;
    }

    /// The twelve bezier control points, rebuilt on demand. Layout is four
    /// `(c1, c2, end)` triples; the subpath starts at the last end point.
    pub fn control_points(&self) -> [Point; 12] {
        if let Some(cached) = *self.cache.borrow() {
            return cached;
        }
        let points = self.compute_control_points();
        *self.cache.borrow_mut() = Some(points);
        points
    }

    fn compute_control_points(&self) -> [Point; 12] {
        let n = self.rect.normalized();
        let (x, y) = (n.from.x, n.from.y);
        let (xe, ye) = (n.to.x, n.to.y);
        let c = n.center();
        let (xm, ym) = (c.x, c.y);
        let ox = n.width() / 2.0 * KAPPA;
        let oy = n.height() / 2.0 * KAPPA;

        let mut points = [
            Point::new(x, ym - oy),
            Point::new(xm - ox, y),
            Point::new(xm, y),
            Point::new(xm + ox, y),
            Point::new(xe, ym - oy),
            Point::new(xe, ym),
            Point::new(xe, ym + oy),
            Point::new(xm + ox, ye),
            Point::new(xm, ye),
            Point::new(xm - ox, ye),
            Point::new(x, ym + oy),
            Point::new(x, ym),
        ];
        if self.angle != 0.0 {
            for p in &mut points {
                p.rotate(self.angle, c);
            }
        }
        points
    }

    fn flattened(&self) -> Vec<Point> {
        let c = self.control_points();
        let mut ring = Vec::with_capacity(4 * FLATTEN_STEPS);
        let mut from = c[11];
        for seg in c.chunks_exact(3) {
            for i in 1..=FLATTEN_STEPS {
                let t = i as f64 / FLATTEN_STEPS as f64;
                ring.push(cubic_at(from, seg[0], seg[1], seg[2], t));
            }
            from = seg[2];
        }
        ring
    }
}

impl Shape for Ellipse {
    fn contains(&self, point: Point) -> bool {
        point_in_ring(&self.flattened(), point)
    }

    fn translate(&mut self, delta: Vector) {
        self.rect.from.translate(delta);
        self.rect.to.translate(delta);
        self.invalidate();
    }

    fn origin(&self) -> Point {
        self.rect.from
    }

    fn bounds(&self) -> Rect {
        if self.angle == 0.0 {
            return self.rect.normalized();
        }
        let ring = self.flattened();
        let mut min = ring[0];
        let mut max = ring[0];
        for p in &ring {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Rect::new(min, max)
    }

    fn trace(&self, sink: &mut dyn PathSink) {
        let c = self.control_points();
        sink.move_to(c[11]);
        for seg in c.chunks_exact(3) {
            sink.curve_to(seg[0], seg[1], seg[2]);
        }
        sink.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ellipse() -> Ellipse {
        Ellipse::from_points(Point::ZERO, Point::new(20.0, 10.0))
    }

    #[test]
    fn test_contains_axis_aligned() {
        let e = ellipse();
        assert!(e.contains(Point::new(10.0, 5.0)));
        assert!(e.contains(Point::new(18.0, 5.0)));
        // Inside the bounding box but outside the ellipse corner.
        assert!(!e.contains(Point::new(1.0, 1.0)));
        assert!(!e.contains(Point::new(21.0, 5.0)));
    }

    #[test]
    fn test_rotation_moves_extremes() {
        let mut e = ellipse();
        // Near the right tip of the major axis.
        let tip = Point::new(19.0, 5.0);
        assert!(e.contains(tip));
        e.rotate(std::f64::consts::PI / 2.0);
        assert!(!e.contains(tip));
        // Major axis is now vertical; the ellipse extends past the old box.
        assert!(e.contains(Point::new(10.0, -3.0)));
    }

    #[test]
    fn test_angle_stays_normalized() {
        let mut e = ellipse();
        e.rotate(-1.0);
        assert!(e.angle() >= 0.0 && e.angle() < crate::angle::TAU);
    }

    #[test]
    fn test_cache_invalidation_on_mutation() {
        let mut e = ellipse();
        let before = e.control_points();
        e.translate(Vector::new(5.0, 0.0));
        let after = e.control_points();
        assert!((after[2].x - before[2].x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_control_point_count_and_start() {
        let e = ellipse();
        let c = e.control_points();
        // Subpath starts at the left extreme.
        assert!(c[11].approx_eq(Point::new(0.0, 5.0), 1e-9));
        assert!(c[5].approx_eq(Point::new(20.0, 5.0), 1e-9));
    }
}
