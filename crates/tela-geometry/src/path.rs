use std::cell::RefCell;
use std::fmt;

use crate::shape::{cubic_at, point_in_ring, PathSink, Shape};
use crate::{GeometryError, Point, Rect, Vector};

/// Samples per curved segment when flattening for containment.
const FLATTEN_STEPS: usize = 16;

/// One command of a composite path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    CurveTo { c1: Point, c2: Point, to: Point },
    Arc {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        ccw: bool,
    },
}

impl PathSegment {
    /// Visit every stored point exactly once. An arc owns only its center;
    /// translating the center translates the whole arc.
    fn for_each_point(&mut self, f: &mut impl FnMut(&mut Point)) {
        match self {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => f(p),
            PathSegment::CurveTo { c1, c2, to } => {
                f(c1);
                f(c2);
                f(to);
            }
            PathSegment::Arc { center, .. } => f(center),
        }
    }
}

/// Composite path built from move/line/curve/arc segments.
///
/// Containment flattens the path into a vertex ring (cached, rebuilt lazily
/// after mutation) and applies the even-odd rule.
#[derive(Debug, Clone, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
    flat: RefCell<Option<Vec<Point>>>,
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Path {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self {
            segments,
            flat: RefCell::new(None),
        }
    }

    pub fn builder() -> PathBuilder {
        PathBuilder::default()
    }

    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
        self.invalidate();
    }

    fn invalidate(&self) {
        *self.flat.borrow_mut() = None;
    }

    fn with_flattened<R>(&self, f: impl FnOnce(&[Point]) -> R) -> R {
        if self.flat.borrow().is_none() {
            *self.flat.borrow_mut() = Some(self.flatten());
        }
        let flat = self.flat.borrow();
        f(flat.as_deref().unwrap_or(&[]))
    }

    fn flatten(&self) -> Vec<Point> {
        let mut ring = Vec::new();
        let mut current = Point::ZERO;
        for seg in &self.segments {
            match *seg {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => {
                    ring.push(p);
                    current = p;
                }
                PathSegment::CurveTo { c1, c2, to } => {
                    for i in 1..=FLATTEN_STEPS {
                        let t = i as f64 / FLATTEN_STEPS as f64;
                        ring.push(cubic_at(current, c1, c2, to, t));
                    }
                    current = to;
                }
                PathSegment::Arc {
                    center,
                    radius,
                    start,
                    end,
                    ccw,
                } => {
                    let sweep = if ccw { -(end - start) } else { end - start };
                    for i in 0..=FLATTEN_STEPS {
                        let a = start + sweep * i as f64 / FLATTEN_STEPS as f64;
                        ring.push(Point::new(
                            center.x + radius * a.cos(),
                            center.y + radius * a.sin(),
                        ));
                    }
                    if let Some(last) = ring.last() {
                        current = *last;
                    }
                }
            }
        }
        ring
    }
}

impl Shape for Path {
    fn contains(&self, point: Point) -> bool {
        self.with_flattened(|ring| point_in_ring(ring, point))
    }

    fn translate(&mut self, delta: Vector) {
        for seg in &mut self.segments {
            seg.for_each_point(&mut |p| p.translate(delta));
        }
        self.invalidate();
    }

    fn origin(&self) -> Point {
        match self.segments.first() {
            Some(PathSegment::MoveTo(p)) | Some(PathSegment::LineTo(p)) => *p,
            Some(PathSegment::CurveTo { to, .. }) => *to,
            Some(PathSegment::Arc { center, .. }) => *center,
            None => Point::ZERO,
        }
    }

    fn bounds(&self) -> Rect {
        self.with_flattened(|ring| {
            let Some(&first) = ring.first() else {
                return Rect::default();
            };
            let mut min = first;
            let mut max = first;
            for p in ring {
                min.x = min.x.min(p.x);
                min.y = min.y.min(p.y);
                max.x = max.x.max(p.x);
                max.y = max.y.max(p.y);
            }
            Rect::new(min, max)
        })
    }

    fn trace(&self, sink: &mut dyn PathSink) {
        for seg in &self.segments {
            match *seg {
                PathSegment::MoveTo(p) => sink.move_to(p),
                PathSegment::LineTo(p) => sink.line_to(p),
                PathSegment::CurveTo { c1, c2, to } => sink.curve_to(c1, c2, to),
                PathSegment::Arc {
                    center,
                    radius,
                    start,
                    end,
                    ccw,
                } => sink.arc(center, radius, start, end, ccw),
            }
        }
    }
}

impl fmt::Display for Path {
    /// Compact text codec, parseable by [`PathBuilder::parse`]:
    /// `M x,y` `L x,y` `C x1,y1,x2,y2,x,y` `A cx,cy,r,start,end,ccw`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match *seg {
                PathSegment::MoveTo(p) => write!(f, "M{},{}", p.x, p.y)?,
                PathSegment::LineTo(p) => write!(f, "L{},{}", p.x, p.y)?,
                PathSegment::CurveTo { c1, c2, to } => {
                    write!(f, "C{},{},{},{},{},{}", c1.x, c1.y, c2.x, c2.y, to.x, to.y)?
                }
                PathSegment::Arc {
                    center,
                    radius,
                    start,
                    end,
                    ccw,
                } => write!(
                    f,
                    "A{},{},{},{},{},{}",
                    center.x,
                    center.y,
                    radius,
                    start,
                    end,
                    if ccw { 1 } else { 0 }
                )?,
            }
        }
        Ok(())
    }
}

/// Incremental path construction with deque-style segment editing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathBuilder {
    segments: Vec<PathSegment>,
}

impl PathBuilder {
    pub fn move_to(mut self, p: Point) -> Self {
        self.segments.push(PathSegment::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: Point) -> Self {
        self.segments.push(PathSegment::LineTo(p));
        self
    }

    pub fn curve_to(mut self, c1: Point, c2: Point, to: Point) -> Self {
        self.segments.push(PathSegment::CurveTo { c1, c2, to });
        self
    }

    pub fn arc(mut self, center: Point, radius: f64, start: f64, end: f64, ccw: bool) -> Self {
        self.segments.push(PathSegment::Arc {
            center,
            radius,
            start,
            end,
            ccw,
        });
        self
    }

    /// Remove and return the last segment.
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Remove and return the first segment.
    pub fn shift(&mut self) -> Option<PathSegment> {
        if self.segments.is_empty() {
            None
        } else {
            Some(self.segments.remove(0))
        }
    }

    /// Prepend a segment.
    pub fn unshift(mut self, segment: PathSegment) -> Self {
        self.segments.insert(0, segment);
        self
    }

    pub fn build(self) -> Path {
        Path::new(self.segments)
    }

    /// Parse the codec emitted by [`Path`]'s `Display` impl.
    pub fn parse(text: &str) -> Result<Self, GeometryError> {
        let mut segments = Vec::new();
        for token in text.split_whitespace() {
            let malformed = || GeometryError::MalformedPath(token.to_string());
            // A multi-byte first char is not a valid segment letter.
            let (letter, rest) = token.split_at_checked(1).ok_or_else(malformed)?;
            let nums: Vec<f64> = rest
                .split(',')
                .map(|s| s.parse::<f64>())
                .collect::<Result<_, _>>()
                .map_err(|_| malformed())?;
            let seg = match (letter, nums.as_slice()) {
                ("M", [x, y]) => PathSegment::MoveTo(Point::new(*x, *y)),
                ("L", [x, y]) => PathSegment::LineTo(Point::new(*x, *y)),
                ("C", [x1, y1, x2, y2, x, y]) => PathSegment::CurveTo {
                    c1: Point::new(*x1, *y1),
                    c2: Point::new(*x2, *y2),
                    to: Point::new(*x, *y),
                },
                ("A", [cx, cy, r, start, end, ccw]) => PathSegment::Arc {
                    center: Point::new(*cx, *cy),
                    radius: *r,
                    start: *start,
                    end: *end,
                    ccw: *ccw != 0.0,
                },
                _ => return Err(malformed()),
            };
            segments.push(seg);
        }
        Ok(Self { segments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Path {
        Path::builder()
            .move_to(Point::ZERO)
            .line_to(Point::new(10.0, 0.0))
            .line_to(Point::new(5.0, 10.0))
            .build()
    }

    #[test]
    fn test_contains_polyline() {
        let t = triangle();
        assert!(t.contains(Point::new(5.0, 2.0)));
        assert!(!t.contains(Point::new(0.0, 9.0)));
    }

    #[test]
    fn test_translate_moves_arc_by_center() {
        let mut p = Path::builder()
            .arc(Point::new(5.0, 5.0), 5.0, 0.0, crate::angle::TAU, false)
            .build();
        assert!(p.contains(Point::new(5.0, 5.0)));
        p.translate(Vector::new(10.0, 0.0));
        assert!(p.contains(Point::new(15.0, 5.0)));
        assert!(!p.contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_flatten_cache_rebuilds_after_push() {
        let mut t = triangle();
        assert!(!t.contains(Point::new(-2.0, 1.0)));
        // Extending the ring changes containment.
        t.push(PathSegment::LineTo(Point::new(-5.0, 5.0)));
        assert!(t.contains(Point::new(-2.0, 4.0)));
    }

    #[test]
    fn test_codec_round_trip() {
        let p = Path::builder()
            .move_to(Point::new(1.0, 2.0))
            .curve_to(
                Point::new(3.0, 4.0),
                Point::new(5.0, 6.0),
                Point::new(7.0, 8.0),
            )
            .arc(Point::new(9.0, 10.0), 2.5, 0.0, 1.5, true)
            .build();
        let text = p.to_string();
        let parsed = PathBuilder::parse(&text).unwrap().build();
        assert_eq!(parsed, p);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            PathBuilder::parse("M1,2 Q3,4"),
            Err(GeometryError::MalformedPath("Q3,4".to_string()))
        );
        assert!(PathBuilder::parse("Mfoo,2").is_err());
        // A token whose first character is multi-byte must error, not panic.
        assert_eq!(
            PathBuilder::parse("é1,2"),
            Err(GeometryError::MalformedPath("é1,2".to_string()))
        );
        assert!(PathBuilder::parse("M1,2 Ω3,4").is_err());
    }

    #[test]
    fn test_builder_editing() {
        let mut b = PathBuilder::default()
            .move_to(Point::ZERO)
            .line_to(Point::new(1.0, 1.0));
        assert_eq!(b.pop(), Some(PathSegment::LineTo(Point::new(1.0, 1.0))));
        assert_eq!(b.shift(), Some(PathSegment::MoveTo(Point::ZERO)));
        assert_eq!(b.pop(), None);
        let b = b.unshift(PathSegment::MoveTo(Point::new(2.0, 2.0)));
        assert_eq!(b.build().origin(), Point::new(2.0, 2.0));
    }

    #[test]
    fn test_empty_path() {
        let p = Path::default();
        assert!(!p.contains(Point::ZERO));
        assert_eq!(p.bounds(), Rect::default());
    }
}
