use crate::shape::{PathSink, Shape};
use crate::{Point, Polygon, Vector};

/// Width/height pair, always in canvas units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle stored as two corners.
///
/// The corners are not forced into min/max order; containment and
/// intersection normalize on the fly, and [`Rect::normalized`] produces the
/// canonical form when corner order matters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub from: Point,
    pub to: Point,
}

impl Rect {
    #[inline]
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    #[inline]
    pub fn with_size(from: Point, size: Size) -> Self {
        Self::new(from, Point::new(from.x + size.width, from.y + size.height))
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.to.x - self.from.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.to.y - self.from.y
    }

    /// Resize by moving `to`, keeping `from` anchored.
    pub fn set_width(&mut self, width: f64) {
        self.to.x = self.from.x + width;
    }

    pub fn set_height(&mut self, height: f64) {
        self.to.y = self.from.y + height;
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn set_size(&mut self, size: Size) {
        self.set_width(size.width);
        self.set_height(size.height);
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            (self.from.x + self.to.x) / 2.0,
            (self.from.y + self.to.y) / 2.0,
        )
    }

    #[inline]
    pub fn top_right(&self) -> Point {
        Point::new(self.to.x, self.from.y)
    }

    #[inline]
    pub fn bottom_left(&self) -> Point {
        Point::new(self.from.x, self.to.y)
    }

    /// Corner-order canonical form: `from` holds the minima.
    pub fn normalized(&self) -> Rect {
        Rect::new(
            Point::new(self.from.x.min(self.to.x), self.from.y.min(self.to.y)),
            Point::new(self.from.x.max(self.to.x), self.from.y.max(self.to.y)),
        )
    }

    /// Containment with the edges inset by `padding` on every side.
    pub fn contains_with_padding(&self, p: Point, padding: f64) -> bool {
        let n = self.normalized();
        p.x >= n.from.x + padding
            && p.x <= n.to.x - padding
            && p.y >= n.from.y + padding
            && p.y <= n.to.y - padding
    }

    /// Overlap test, inclusive of touching edges.
    pub fn intersects(&self, other: &Rect) -> bool {
        let a = self.normalized();
        let b = other.normalized();
        a.from.x <= b.to.x && a.to.x >= b.from.x && a.from.y <= b.to.y && a.to.y >= b.from.y
    }

    /// Move `from` to `target`, preserving the size.
    pub fn move_to(&mut self, target: Point) {
        let delta = self.from.diff(target);
        self.translate(delta);
    }

    /// Re-express `p`, given relative to `source`, in this rectangle's
    /// coordinate frame (proportional in both axes).
    pub fn map_point(&self, p: Point, source: &Rect) -> Point {
        Point::new(
            self.from.x + (p.x - source.from.x) / source.width() * self.width(),
            self.from.y + (p.y - source.from.y) / source.height() * self.height(),
        )
    }

    pub fn snap_to_pixel(&mut self) {
        self.from.snap_to_pixel();
        self.to.snap_to_pixel();
    }

    /// The four corners as a polygon, clockwise from `from`.
    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(vec![
            self.from,
            self.top_right(),
            self.to,
            self.bottom_left(),
        ])
        .expect("rectangle always has 4 vertices")
    }

    /// Grow (or shrink, with negative padding) by `padding` on every side.
    pub fn grown(&self, padding: f64) -> Rect {
        let n = self.normalized();
        Rect::new(
            Point::new(n.from.x - padding, n.from.y - padding),
            Point::new(n.to.x + padding, n.to.y + padding),
        )
    }
}

impl Shape for Rect {
    fn contains(&self, point: Point) -> bool {
        self.contains_with_padding(point, 0.0)
    }

    fn translate(&mut self, delta: Vector) {
        self.from.translate(delta);
        self.to.translate(delta);
    }

    fn origin(&self) -> Point {
        self.from
    }

    fn bounds(&self) -> Rect {
        self.normalized()
    }

    fn trace(&self, sink: &mut dyn PathSink) {
        sink.move_to(self.from);
        sink.line_to(self.top_right());
        sink.line_to(self.to);
        sink.line_to(self.bottom_left());
        sink.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_round_trip() {
        let mut r = Rect::with_size(Point::new(10.0, 20.0), Size::new(30.0, 40.0));
        assert_eq!(r.to, Point::new(40.0, 60.0));
        r.set_width(5.0);
        r.set_height(6.0);
        assert_eq!(r.size(), Size::new(5.0, 6.0));
        assert_eq!(r.from, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_contains_inclusive_edges() {
        let r = Rect::new(Point::ZERO, Point::new(10.0, 10.0));
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(5.0, 5.0)));
        assert!(!r.contains(Point::new(10.1, 5.0)));
    }

    #[test]
    fn test_contains_with_padding() {
        let r = Rect::new(Point::ZERO, Point::new(10.0, 10.0));
        assert!(!r.contains_with_padding(Point::new(1.0, 1.0), 2.0));
        assert!(r.contains_with_padding(Point::new(5.0, 5.0), 2.0));
    }

    #[test]
    fn test_unordered_corners() {
        // Corners given in "wrong" order still hit-test correctly.
        let r = Rect::new(Point::new(10.0, 10.0), Point::ZERO);
        assert!(r.contains(Point::new(5.0, 5.0)));
        assert_eq!(r.normalized().from, Point::ZERO);
    }

    #[test]
    fn test_intersects() {
        let a = Rect::new(Point::ZERO, Point::new(10.0, 10.0));
        let b = Rect::new(Point::new(10.0, 10.0), Point::new(20.0, 20.0));
        let c = Rect::new(Point::new(11.0, 11.0), Point::new(20.0, 20.0));
        assert!(a.intersects(&b)); // touching edges count
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_move_to_preserves_size() {
        let mut r = Rect::with_size(Point::new(1.0, 1.0), Size::new(4.0, 2.0));
        r.move_to(Point::new(10.0, 10.0));
        assert_eq!(r.from, Point::new(10.0, 10.0));
        assert_eq!(r.size(), Size::new(4.0, 2.0));
    }

    #[test]
    fn test_map_point() {
        let src = Rect::new(Point::ZERO, Point::new(10.0, 10.0));
        let dst = Rect::new(Point::new(100.0, 100.0), Point::new(200.0, 150.0));
        let mapped = dst.map_point(Point::new(5.0, 5.0), &src);
        assert_eq!(mapped, Point::new(150.0, 125.0));
    }

    #[test]
    fn test_trace_commands() {
        struct Count(Vec<&'static str>);
        impl PathSink for Count {
            fn begin(&mut self) {
                self.0.push("begin");
            }
            fn move_to(&mut self, _: Point) {
                self.0.push("move");
            }
            fn line_to(&mut self, _: Point) {
                self.0.push("line");
            }
            fn curve_to(&mut self, _: Point, _: Point, _: Point) {
                self.0.push("curve");
            }
            fn arc(&mut self, _: Point, _: f64, _: f64, _: f64, _: bool) {
                self.0.push("arc");
            }
            fn close(&mut self) {
                self.0.push("close");
            }
        }
        let mut sink = Count(Vec::new());
        Rect::new(Point::ZERO, Point::new(1.0, 1.0)).trace(&mut sink);
        assert_eq!(sink.0, vec!["move", "line", "line", "line", "close"]);
    }
}
