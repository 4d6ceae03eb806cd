use std::cell::RefCell;
use std::rc::Rc;

use tela_geometry::{PathSink, Point, Rect, Size};

use crate::{Color, ImageHandle, Paint, PixelBuf};

/// Where an image lands on a surface: the destination rectangle, with an
/// optional source crop in image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub dest: Rect,
    pub src: Option<Rect>,
}

impl Placement {
    pub fn full(dest: Rect) -> Self {
        Self { dest, src: None }
    }
}

/// The rendering backend seam.
///
/// A surface is also a [`PathSink`]: shapes trace their outline into it and
/// the subsequent `fill`/`stroke`/`clip` consumes the accumulated path, the
/// way immediate-mode 2D canvases work. Implementations hold whatever GPU or
/// raster state they need behind this trait; the scene crates stay
/// backend-agnostic.
pub trait Surface: PathSink {
    fn size(&self) -> Size;

    /// Fill the current path and reset it.
    fn fill(&mut self, paint: &Paint);

    /// Stroke the current path with the given line width and reset it.
    fn stroke(&mut self, paint: &Paint, width: f64);

    /// Clear the whole surface to `color`, or to transparent black.
    fn clear(&mut self, color: Option<Color>);

    /// Push a copy of the drawing state (clip, transform).
    fn save(&mut self);

    /// Pop the drawing state.
    fn restore(&mut self);

    /// Intersect the clip region with the current path and reset the path.
    fn clip(&mut self);

    fn draw_image(&mut self, image: ImageHandle, placement: Placement);

    /// Blit raw pixels with no blending.
    fn draw_pixels(&mut self, pixels: &PixelBuf, at: Point);

    /// Read back a pixel rectangle. Regions outside the surface read as
    /// transparent black.
    fn pixels(&self, region: Rect) -> PixelBuf;

    /// Advance width of `text` in the surface's current font, in canvas
    /// units. Used for progress/status overlays.
    fn measure_text(&self, text: &str) -> f64;
}

/// Shared handle over a surface.
///
/// A stage takes ownership of its screen surface; embedders (and tests) that
/// need to keep inspecting the same surface hand the stage one half of a
/// `SharedSurface` and keep the other.
pub struct SharedSurface<S>(Rc<RefCell<S>>);

impl<S> SharedSurface<S> {
    pub fn new(surface: S) -> Self {
        Self(Rc::new(RefCell::new(surface)))
    }

    pub fn handle(&self) -> Rc<RefCell<S>> {
        self.0.clone()
    }
}

impl<S> Clone for SharedSurface<S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<S: Surface> PathSink for SharedSurface<S> {
    fn begin(&mut self) {
        self.0.borrow_mut().begin();
    }

    fn move_to(&mut self, p: Point) {
        self.0.borrow_mut().move_to(p);
    }

    fn line_to(&mut self, p: Point) {
        self.0.borrow_mut().line_to(p);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, to: Point) {
        self.0.borrow_mut().curve_to(c1, c2, to);
    }

    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64, ccw: bool) {
        self.0.borrow_mut().arc(center, radius, start, end, ccw);
    }

    fn close(&mut self) {
        self.0.borrow_mut().close();
    }
}

impl<S: Surface> Surface for SharedSurface<S> {
    fn size(&self) -> Size {
        self.0.borrow().size()
    }

    fn fill(&mut self, paint: &Paint) {
        self.0.borrow_mut().fill(paint);
    }

    fn stroke(&mut self, paint: &Paint, width: f64) {
        self.0.borrow_mut().stroke(paint, width);
    }

    fn clear(&mut self, color: Option<Color>) {
        self.0.borrow_mut().clear(color);
    }

    fn save(&mut self) {
        self.0.borrow_mut().save();
    }

    fn restore(&mut self) {
        self.0.borrow_mut().restore();
    }

    fn clip(&mut self) {
        self.0.borrow_mut().clip();
    }

    fn draw_image(&mut self, image: ImageHandle, placement: Placement) {
        self.0.borrow_mut().draw_image(image, placement);
    }

    fn draw_pixels(&mut self, pixels: &PixelBuf, at: Point) {
        self.0.borrow_mut().draw_pixels(pixels, at);
    }

    fn pixels(&self, region: Rect) -> PixelBuf {
        self.0.borrow().pixels(region)
    }

    fn measure_text(&self, text: &str) -> f64 {
        self.0.borrow().measure_text(text)
    }
}
