use crate::{Point, Rect, Vector};

/// Receiver for path commands. Shapes describe their outline by replaying
/// commands into a sink; rendering surfaces implement this to build native
/// paths, and the geometry crate itself implements it to flatten outlines
/// for containment tests.
pub trait PathSink {
    /// Start a fresh subpath. Implementations may reset accumulated state.
    fn begin(&mut self);
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    /// Cubic bezier from the current point through two control points.
    fn curve_to(&mut self, c1: Point, c2: Point, to: Point);
    /// Circular arc. Angles are radians; `ccw` selects sweep direction.
    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64, ccw: bool);
    fn close(&mut self);
}

/// The object-safe seam every drawable outline implements.
///
/// Hit-testing, dragging and rendering all go through this trait, so scene
/// code never needs to know which concrete shape it is holding.
pub trait Shape {
    /// Whether `point` falls inside the filled outline.
    fn contains(&self, point: Point) -> bool;

    /// Displace the whole shape.
    fn translate(&mut self, delta: Vector);

    /// The shape's reference point (top-left corner, circle center, first
    /// vertex — whichever the concrete shape anchors on).
    fn origin(&self) -> Point;

    /// Axis-aligned bounding box.
    fn bounds(&self) -> Rect;

    /// Replay the outline into `sink` as path commands.
    fn trace(&self, sink: &mut dyn PathSink);
}

/// Cubic bezier evaluation, shared by the flattening helpers.
pub(crate) fn cubic_at(from: Point, c1: Point, c2: Point, to: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point::new(
        a * from.x + b * c1.x + c * c2.x + d * to.x,
        a * from.y + b * c1.y + c * c2.y + d * to.y,
    )
}

/// Even-odd ray cast against a closed ring of vertices.
pub(crate) fn point_in_ring(ring: &[Point], p: Point) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if ((a.y > p.y) != (b.y > p.y))
            && (p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
