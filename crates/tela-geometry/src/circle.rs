use crate::angle::TAU;
use crate::shape::{PathSink, Shape};
use crate::{GeometryError, Point, Rect, Vector};

/// Circle anchored on its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    radius: f64,
}

impl Circle {
    /// Radius must be non-negative; a zero radius is a legal degenerate
    /// circle that contains only its center.
    pub fn new(center: Point, radius: f64) -> Result<Self, GeometryError> {
        if radius < 0.0 {
            return Err(GeometryError::NegativeRadius(radius));
        }
        Ok(Self { center, radius })
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<(), GeometryError> {
        if radius < 0.0 {
            return Err(GeometryError::NegativeRadius(radius));
        }
        self.radius = radius;
        Ok(())
    }

    /// Scale the radius and the center's offset from `pivot` uniformly.
    pub fn scale(&mut self, factor: f64, pivot: Point) {
        self.center.scale(Vector::new(factor, factor), pivot);
        self.radius *= factor.abs();
    }

    pub fn intersects_circle(&self, other: &Circle) -> bool {
        self.center.distance_to(other.center) <= self.radius + other.radius
    }
}

impl Shape for Circle {
    fn contains(&self, point: Point) -> bool {
        self.center.distance_to(point) <= self.radius
    }

    fn translate(&mut self, delta: Vector) {
        self.center.translate(delta);
    }

    fn origin(&self) -> Point {
        self.center
    }

    fn bounds(&self) -> Rect {
        let r = Vector::new(self.radius, self.radius);
        Rect::new(self.center - r, self.center + r)
    }

    fn trace(&self, sink: &mut dyn PathSink) {
        sink.arc(self.center, self.radius, 0.0, TAU, false);
        sink.close();
    }
}
