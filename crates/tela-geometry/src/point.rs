use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A position in canvas space. Y grows downward, matching raster surfaces.
///
/// `Point` doubles as the displacement type via the [`Vector`] alias; the
/// arithmetic operators treat it as a 2-vector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A displacement between two points.
pub type Vector = Point;

/// Grid step directions used by [`Point::neighbour`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    fn offset(self) -> Vector {
        match self {
            Direction::Up => Vector::new(0.0, -1.0),
            Direction::Down => Vector::new(0.0, 1.0),
            Direction::Left => Vector::new(-1.0, 0.0),
            Direction::Right => Vector::new(1.0, 0.0),
            Direction::UpLeft => Vector::new(-1.0, -1.0),
            Direction::UpRight => Vector::new(1.0, -1.0),
            Direction::DownLeft => Vector::new(-1.0, 1.0),
            Direction::DownRight => Vector::new(1.0, 1.0),
        }
    }
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Displace in place.
    #[inline]
    pub fn translate(&mut self, delta: Vector) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Displaced copy.
    #[inline]
    pub fn translated(self, delta: Vector) -> Point {
        Point::new(self.x + delta.x, self.y + delta.y)
    }

    #[inline]
    pub fn move_to(&mut self, target: Point) {
        *self = target;
    }

    /// Vector from `self` to `other`.
    #[inline]
    pub fn diff(self, other: Point) -> Vector {
        other - self
    }

    #[inline]
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Angle of the ray from `self` to `other`, normalized into `[0, 2π)`.
    pub fn angle_to(self, other: Point) -> f64 {
        crate::angle::normalize((other.y - self.y).atan2(other.x - self.x))
    }

    /// Rotate counter-clockwise (in y-up math terms) around `pivot`.
    pub fn rotate(&mut self, angle: f64, pivot: Point) {
        let (sin, cos) = angle.sin_cos();
        let d = pivot.diff(*self);
        self.x = pivot.x + d.x * cos - d.y * sin;
        self.y = pivot.y + d.x * sin + d.y * cos;
    }

    /// Scale the offset from `pivot` component-wise.
    pub fn scale(&mut self, factor: Vector, pivot: Point) {
        let d = pivot.diff(*self);
        self.x = pivot.x + d.x * factor.x;
        self.y = pivot.y + d.y * factor.y;
    }

    /// Round both coordinates to the nearest integer pixel.
    #[inline]
    pub fn snap_to_pixel(&mut self) {
        self.x = self.x.round();
        self.y = self.y.round();
    }

    /// The unit-grid neighbour in `direction`.
    pub fn neighbour(self, direction: Direction) -> Point {
        self.translated(direction.offset())
    }

    /// The 4 orthogonal neighbours, or all 8 when `corners` is set.
    /// Orthogonal neighbours come first either way.
    pub fn neighbours(self, corners: bool) -> Vec<Point> {
        let dirs: &[Direction] = if corners {
            &[
                Direction::Up,
                Direction::Down,
                Direction::Left,
                Direction::Right,
                Direction::UpLeft,
                Direction::UpRight,
                Direction::DownLeft,
                Direction::DownRight,
            ]
        } else {
            &[
                Direction::Up,
                Direction::Down,
                Direction::Left,
                Direction::Right,
            ]
        };
        dirs.iter().map(|d| self.neighbour(*d)).collect()
    }

    /// Componentwise equality within `accuracy`.
    pub fn approx_eq(self, other: Point, accuracy: f64) -> bool {
        (self.x - other.x).abs() < accuracy && (self.y - other.y).abs() < accuracy
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Point) {
        self.translate(rhs);
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    #[inline]
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Point {
    type Output = Point;
    #[inline]
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    #[inline]
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_translate_and_diff() {
        let mut p = Point::new(1.0, 2.0);
        p.translate(Vector::new(3.0, -1.0));
        assert_eq!(p, Point::new(4.0, 1.0));
        assert_eq!(Point::new(1.0, 1.0).diff(p), Vector::new(3.0, 0.0));
    }

    #[test]
    fn test_distance_and_angle() {
        let a = Point::ZERO;
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < EPSILON);
        // Straight down the +y axis.
        assert!((a.angle_to(Point::new(0.0, 1.0)) - PI / 2.0).abs() < EPSILON);
        // Negative atan2 results are normalized into [0, 2π).
        let up = a.angle_to(Point::new(0.0, -1.0));
        assert!((up - 1.5 * PI).abs() < EPSILON);
    }

    #[test]
    fn test_rotate_round_trip() {
        let pivot = Point::new(2.0, 2.0);
        let original = Point::new(5.0, 2.0);
        let mut p = original;
        p.rotate(1.1, pivot);
        assert!((p.distance_to(pivot) - 3.0).abs() < EPSILON);
        p.rotate(-1.1, pivot);
        assert!(p.approx_eq(original, EPSILON));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let mut p = Point::new(1.0, 0.0);
        p.rotate(PI / 2.0, Point::ZERO);
        assert!(p.approx_eq(Point::new(0.0, 1.0), EPSILON));
    }

    #[test]
    fn test_scale_about_pivot() {
        let mut p = Point::new(4.0, 6.0);
        p.scale(Vector::new(0.5, 2.0), Point::new(2.0, 2.0));
        assert_eq!(p, Point::new(3.0, 10.0));
    }

    #[test]
    fn test_snap_to_pixel() {
        let mut p = Point::new(1.4, 2.6);
        p.snap_to_pixel();
        assert_eq!(p, Point::new(1.0, 3.0));
    }

    #[test]
    fn test_neighbours() {
        let p = Point::new(5.0, 5.0);
        assert_eq!(p.neighbour(Direction::UpLeft), Point::new(4.0, 4.0));
        assert_eq!(p.neighbours(false).len(), 4);
        let all = p.neighbours(true);
        assert_eq!(all.len(), 8);
        // Orthogonal neighbours lead.
        assert_eq!(all[0], Point::new(5.0, 4.0));
        assert_eq!(all[7], Point::new(6.0, 6.0));
    }
}
