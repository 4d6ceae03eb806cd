use std::cell::RefCell;
use std::rc::Rc;

use tela_geometry::{Point, Shape, Vector};
use tela_surface::{Color, Paint, Surface};

use crate::animation::{AnimationTarget, PropertyValue};

/// Stage-unique element identifier.
pub type ElementId = u64;

/// Something a layer can draw and the mouse router can hit-test.
///
/// `ready` gates drawing for elements whose assets load asynchronously; the
/// default is always-ready.
pub trait Drawable {
    fn draw(&self, surface: &mut dyn Surface);
    fn shape(&self) -> &dyn Shape;
    fn shape_mut(&mut self) -> &mut dyn Shape;
    fn z_index(&self) -> i32;
    fn set_z_index(&mut self, z: i32);
    fn ready(&self) -> bool {
        true
    }
}

pub type SharedDrawable = Rc<RefCell<dyn Drawable>>;

/// The stock element: a shape with optional fill and stroke paints plus the
/// interaction flags the behaviors maintain.
pub struct ShapeElement {
    shape: Box<dyn Shape>,
    pub fill: Option<Paint>,
    pub stroke: Option<(Paint, f64)>,
    pub opacity: f64,
    pub hidden: bool,
    /// Pointer currently over the element (maintained by `Clickable`).
    pub hover: bool,
    /// Pressed and not yet released (maintained by `Clickable`).
    pub active: bool,
    /// Gate checked by the drag behavior before moving the element.
    pub draggable: bool,
    z_index: i32,
}

impl ShapeElement {
    pub fn new(shape: Box<dyn Shape>) -> Self {
        Self {
            shape,
            fill: None,
            stroke: None,
            opacity: 1.0,
            hidden: false,
            hover: false,
            active: false,
            draggable: false,
            z_index: 0,
        }
    }

    pub fn with_fill(mut self, paint: impl Into<Paint>) -> Self {
        self.fill = Some(paint.into());
        self
    }

    pub fn with_stroke(mut self, paint: impl Into<Paint>, width: f64) -> Self {
        self.stroke = Some((paint.into(), width));
        self
    }

    pub fn with_z_index(mut self, z: i32) -> Self {
        self.z_index = z;
        self
    }

    fn solid_fill(&self) -> Option<Color> {
        self.fill.as_ref().and_then(Paint::as_solid)
    }

    fn solid_stroke(&self) -> Option<Color> {
        self.stroke.as_ref().and_then(|(p, _)| p.as_solid())
    }
}

impl Drawable for ShapeElement {
    fn draw(&self, surface: &mut dyn Surface) {
        if self.hidden || self.opacity <= 0.0 {
            return;
        }
        surface.begin();
        self.shape.trace(surface);
        if let Some(fill) = &self.fill {
            surface.fill(fill);
        }
        if let Some((stroke, width)) = &self.stroke {
            surface.stroke(stroke, *width);
        }
    }

    fn shape(&self) -> &dyn Shape {
        self.shape.as_ref()
    }

    fn shape_mut(&mut self) -> &mut dyn Shape {
        self.shape.as_mut()
    }

    fn z_index(&self) -> i32 {
        self.z_index
    }

    fn set_z_index(&mut self, z: i32) {
        self.z_index = z;
    }
}

/// Tweenable properties: the shape origin (`x`, `y`), `opacity`, and the
/// solid fill/stroke colors (`fill`, `stroke`). Gradient paints are not
/// tweenable and read back as missing properties.
impl AnimationTarget for ShapeElement {
    fn get_property(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "x" => Some(PropertyValue::Number(self.shape.origin().x)),
            "y" => Some(PropertyValue::Number(self.shape.origin().y)),
            "opacity" => Some(PropertyValue::Number(self.opacity)),
            "fill" => self.solid_fill().map(PropertyValue::Color),
            "stroke" => self.solid_stroke().map(PropertyValue::Color),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) {
        match (name, value) {
            ("x", PropertyValue::Number(v)) => {
                let origin = self.shape.origin();
                self.shape.translate(Vector::new(v - origin.x, 0.0));
            }
            ("y", PropertyValue::Number(v)) => {
                let origin = self.shape.origin();
                self.shape.translate(Vector::new(0.0, v - origin.y));
            }
            ("opacity", PropertyValue::Number(v)) => self.opacity = v.clamp(0.0, 1.0),
            ("fill", PropertyValue::Color(c)) => self.fill = Some(Paint::Solid(c)),
            ("stroke", PropertyValue::Color(c)) => {
                let width = self.stroke.as_ref().map(|(_, w)| *w).unwrap_or(1.0);
                self.stroke = Some((Paint::Solid(c), width));
            }
            _ => {}
        }
    }
}

/// Helper for stage APIs that need a `Point` out of a drawable.
pub fn element_origin(element: &SharedDrawable) -> Point {
    element.borrow().shape().origin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tela_geometry::{Rect, Size};
    use tela_surface::{Command, RecordingSurface};

    fn element() -> ShapeElement {
        ShapeElement::new(Box::new(Rect::with_size(
            Point::new(10.0, 10.0),
            Size::new(20.0, 20.0),
        )))
        .with_fill(Color::rgb(255, 0, 0))
        .with_stroke(Color::rgb(0, 0, 255), 2.0)
    }

    #[test]
    fn test_draw_emits_path_fill_stroke() {
        let e = element();
        let mut s = RecordingSurface::new(Size::new(100.0, 100.0));
        e.draw(&mut s);
        assert_eq!(s.commands()[0], Command::Begin);
        assert_eq!(s.count(|c| matches!(c, Command::Fill(_))), 1);
        assert_eq!(s.count(|c| matches!(c, Command::Stroke(_, _))), 1);
    }

    #[test]
    fn test_hidden_draws_nothing() {
        let mut e = element();
        e.hidden = true;
        let mut s = RecordingSurface::new(Size::new(100.0, 100.0));
        e.draw(&mut s);
        assert!(s.commands().is_empty());
    }

    #[test]
    fn test_position_properties_translate_shape() {
        let mut e = element();
        e.set_property("x", PropertyValue::Number(50.0));
        assert_eq!(e.shape().origin(), Point::new(50.0, 10.0));
        // The whole shape moved, not just the origin corner.
        assert!(e.shape().contains(Point::new(65.0, 25.0)));
        assert_eq!(e.get_property("x"), Some(PropertyValue::Number(50.0)));
    }

    #[test]
    fn test_color_properties() {
        let mut e = element();
        assert_eq!(
            e.get_property("fill"),
            Some(PropertyValue::Color(Color::rgb(255, 0, 0)))
        );
        e.set_property("stroke", PropertyValue::Color(Color::rgb(9, 9, 9)));
        assert_eq!(e.stroke.as_ref().unwrap().1, 2.0); // width preserved
        assert_eq!(e.get_property("missing"), None);
    }
}
