use crate::shape::{PathSink, Shape};
use crate::{GeometryError, Point, Rect, Vector};

/// Rectangle with circular corners of a single radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    rect: Rect,
    radius: f64,
}

impl RoundedRect {
    /// The radius is clamped to half the shorter side so opposite corners
    /// never overlap; a negative radius is an error.
    pub fn new(rect: Rect, radius: f64) -> Result<Self, GeometryError> {
        if radius < 0.0 {
            return Err(GeometryError::NegativeCornerRadius(radius));
        }
        let n = rect.normalized();
        let max = (n.width().min(n.height()) / 2.0).max(0.0);
        Ok(Self {
            rect: n,
            radius: radius.min(max),
        })
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Corner circle centers: top-left, top-right, bottom-right, bottom-left.
    fn corner_centers(&self) -> [Point; 4] {
        let r = self.radius;
        let n = self.rect;
        [
            Point::new(n.from.x + r, n.from.y + r),
            Point::new(n.to.x - r, n.from.y + r),
            Point::new(n.to.x - r, n.to.y - r),
            Point::new(n.from.x + r, n.to.y - r),
        ]
    }
}

/// Emit a quadratic corner as a cubic bezier (exact degree elevation).
fn quad_corner(sink: &mut dyn PathSink, from: Point, ctrl: Point, to: Point) {
    let c1 = from + (ctrl - from) * (2.0 / 3.0);
    let c2 = to + (ctrl - to) * (2.0 / 3.0);
    sink.curve_to(c1, c2, to);
}

impl Shape for RoundedRect {
    fn contains(&self, point: Point) -> bool {
        if !self.rect.contains(point) {
            return false;
        }
        let r = self.radius;
        if r == 0.0 {
            return true;
        }
        // Inside the box: only the outward quadrant of each corner square
        // can exclude the point.
        let mid = self.rect.center();
        for center in self.corner_centers() {
            let outward_x = if center.x < mid.x {
                point.x < center.x
            } else {
                point.x > center.x
            };
            let outward_y = if center.y < mid.y {
                point.y < center.y
            } else {
                point.y > center.y
            };
            if outward_x && outward_y && center.distance_to(point) > r {
                return false;
            }
        }
        true
    }

    fn translate(&mut self, delta: Vector) {
        self.rect.from.translate(delta);
        self.rect.to.translate(delta);
    }

    fn origin(&self) -> Point {
        self.rect.from
    }

    fn bounds(&self) -> Rect {
        self.rect
    }

    fn trace(&self, sink: &mut dyn PathSink) {
        let r = self.radius;
        let n = self.rect;
        let (x0, y0, x1, y1) = (n.from.x, n.from.y, n.to.x, n.to.y);
        sink.move_to(Point::new(x0 + r, y0));
        sink.line_to(Point::new(x1 - r, y0));
        quad_corner(
            sink,
            Point::new(x1 - r, y0),
            Point::new(x1, y0),
            Point::new(x1, y0 + r),
        );
        sink.line_to(Point::new(x1, y1 - r));
        quad_corner(
            sink,
            Point::new(x1, y1 - r),
            Point::new(x1, y1),
            Point::new(x1 - r, y1),
        );
        sink.line_to(Point::new(x0 + r, y1));
        quad_corner(
            sink,
            Point::new(x0 + r, y1),
            Point::new(x0, y1),
            Point::new(x0, y1 - r),
        );
        sink.line_to(Point::new(x0, y0 + r));
        quad_corner(
            sink,
            Point::new(x0, y0 + r),
            Point::new(x0, y0),
            Point::new(x0 + r, y0),
        );
        sink.close();
    }
}
