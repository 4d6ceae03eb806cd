use std::cell::Cell;
use std::cmp::Reverse;
use std::rc::Rc;

use tela_geometry::{Point, Rect, Shape, Size};
use tela_surface::{Color, Paint, Surface};
use tracing::trace;

use crate::element::{ElementId, SharedDrawable};
use crate::processors::{Clearer, Processor};

/// How a layer wipes its surface before redrawing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ClearMode {
    /// Leave the previous frame in place.
    None,
    /// Clear to transparent black.
    #[default]
    Transparent,
    /// Clear to a flat color.
    Color(Color),
}

struct FrameFunc {
    priority: i32,
    callback: Box<dyn FnMut(f64)>,
}

fn run_funcs(funcs: &mut [FrameFunc], elapsed: f64) {
    let mut order: Vec<usize> = (0..funcs.len()).collect();
    order.sort_by_key(|&i| Reverse(funcs[i].priority));
    for i in order {
        (funcs[i].callback)(elapsed);
    }
}

/// One z-ordered drawing plane of a stage.
///
/// Layers are dirty-flagged: a layer redraws only when something requested
/// an update since its last draw, and a frozen layer neither accumulates
/// dirtiness nor redraws. Each layer may own a back buffer; the stage
/// composites buffered layers onto the screen in z order.
pub struct Layer {
    name: String,
    /// Shared with mouse-router subscriptions, so reordering layers is
    /// visible to hit-testing without re-subscribing elements.
    z: Rc<Cell<i32>>,
    elements: Vec<(ElementId, SharedDrawable)>,
    /// Per-tick functions that run every tick, dirty or not.
    plain_funcs: Vec<FrameFunc>,
    /// Draw functions that run only when the layer redraws.
    render_funcs: Vec<FrameFunc>,
    pre: Vec<Box<dyn Processor>>,
    post: Vec<Box<dyn Processor>>,
    needs_redraw: bool,
    frozen: bool,
    buffer: Option<Box<dyn Surface>>,
}

impl Layer {
    pub fn new(name: impl Into<String>, z: i32, buffer: Option<Box<dyn Surface>>) -> Self {
        Self {
            name: name.into(),
            z: Rc::new(Cell::new(z)),
            elements: Vec::new(),
            plain_funcs: Vec::new(),
            render_funcs: Vec::new(),
            pre: Vec::new(),
            post: Vec::new(),
            // A fresh layer draws its first frame unconditionally.
            needs_redraw: true,
            frozen: false,
            buffer,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn z(&self) -> i32 {
        self.z.get()
    }

    pub(crate) fn z_cell(&self) -> Rc<Cell<i32>> {
        self.z.clone()
    }

    pub(crate) fn set_z(&self, z: i32) {
        self.z.set(z);
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    #[inline]
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Mark dirty. Ignored while frozen.
    pub fn request_update(&mut self) {
        if !self.frozen {
            self.needs_redraw = true;
        }
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
        self.needs_redraw = false;
    }

    /// Unfreezing redraws on the next tick to catch up.
    pub fn unfreeze(&mut self) {
        self.frozen = false;
        self.needs_redraw = true;
    }

    /// Consume the dirty flag: true when this tick should redraw.
    pub(crate) fn check_auto_draw(&mut self) -> bool {
        if self.frozen || !self.needs_redraw {
            return false;
        }
        self.needs_redraw = false;
        true
    }

    pub fn add_element(&mut self, id: ElementId, element: SharedDrawable) {
        self.elements.push((id, element));
        self.request_update();
    }

    pub fn remove_element(&mut self, id: ElementId) -> bool {
        let before = self.elements.len();
        self.elements.retain(|(e, _)| *e != id);
        let removed = self.elements.len() != before;
        if removed {
            self.request_update();
        }
        removed
    }

    pub fn element(&self, id: ElementId) -> Option<SharedDrawable> {
        self.elements
            .iter()
            .find(|(e, _)| *e == id)
            .map(|(_, d)| d.clone())
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Register a per-tick function (runs every tick, even when the layer
    /// doesn't redraw).
    pub fn add_func(&mut self, priority: i32, callback: impl FnMut(f64) + 'static) {
        self.plain_funcs.push(FrameFunc {
            priority,
            callback: Box::new(callback),
        });
    }

    /// Register a draw function (runs only on redraw, before elements).
    pub fn add_render_func(&mut self, priority: i32, callback: impl FnMut(f64) + 'static) {
        self.render_funcs.push(FrameFunc {
            priority,
            callback: Box::new(callback),
        });
    }

    pub fn add_pre_processor(&mut self, processor: Box<dyn Processor>) {
        self.pre.push(processor);
    }

    pub fn add_post_processor(&mut self, processor: Box<dyn Processor>) {
        self.post.push(processor);
    }

    pub fn set_clear_mode(&mut self, mode: ClearMode) {
        // Clearing is just the first pre processor.
        match mode {
            ClearMode::None => {}
            ClearMode::Transparent => self.pre.insert(0, Box::new(Clearer(None))),
            ClearMode::Color(c) => self.pre.insert(0, Box::new(Clearer(Some(c)))),
        }
    }

    pub(crate) fn run_plain_funcs(&mut self, elapsed: f64) {
        run_funcs(&mut self.plain_funcs, elapsed);
    }

    /// Draw one frame of this layer into its buffer (or straight onto
    /// `screen` when unbuffered), then composite.
    pub(crate) fn draw_frame(
        &mut self,
        screen: &mut dyn Surface,
        ready: bool,
        progress: f64,
        elapsed: f64,
    ) {
        trace!(layer = %self.name, ready, "layer redraw");
        let Layer {
            buffer,
            pre,
            post,
            render_funcs,
            elements,
            ..
        } = self;
        {
            let surface: &mut dyn Surface = match buffer {
                Some(b) => b.as_mut(),
                None => &mut *screen,
            };
            for p in pre.iter() {
                p.process(surface);
            }
            if ready {
                run_funcs(render_funcs, elapsed);
                // Back-to-front: ascending element z, insertion order on ties.
                let mut order: Vec<usize> = (0..elements.len()).collect();
                order.sort_by_key(|&i| elements[i].1.borrow().z_index());
                for i in order {
                    let element = elements[i].1.borrow();
                    if element.ready() {
                        element.draw(surface);
                    }
                }
            } else {
                draw_progress(surface, progress);
            }
            for p in post.iter() {
                p.process(surface);
            }
        }
        if let Some(buffer) = buffer {
            let size = buffer.size();
            let full = Rect::with_size(Point::ZERO, size);
            let pixels = buffer.pixels(full);
            screen.draw_pixels(&pixels, Point::ZERO);
        }
    }
}

/// Placeholder drawn while assets are still loading: a horizontal progress
/// bar centered on the surface.
fn draw_progress(surface: &mut dyn Surface, progress: f64) {
    let size = surface.size();
    let width = size.width * 0.6;
    let height = 10.0;
    let from = Point::new(
        (size.width - width) / 2.0,
        (size.height - height) / 2.0,
    );
    let track = Rect::with_size(from, Size::new(width, height));
    surface.begin();
    track.trace(surface);
    surface.fill(&Paint::Solid(Color::rgb(0xc0, 0xc0, 0xc0)));
    let filled = Rect::with_size(from, Size::new(width * progress.clamp(0.0, 1.0), height));
    surface.begin();
    filled.trace(surface);
    surface.fill(&Paint::Solid(Color::rgb(0x00, 0x80, 0x00)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ShapeElement;
    use std::cell::RefCell;
    use tela_surface::{Command, RecordingSurface};

    fn rect_element(at: Point, z: i32) -> SharedDrawable {
        Rc::new(RefCell::new(
            ShapeElement::new(Box::new(Rect::with_size(at, Size::new(10.0, 10.0))))
                .with_fill(Color::rgb(255, 0, 0))
                .with_z_index(z),
        ))
    }

    #[test]
    fn test_dirty_lifecycle() {
        let mut layer = Layer::new("test", 1, None);
        assert!(layer.check_auto_draw()); // first frame
        assert!(!layer.check_auto_draw());
        layer.request_update();
        assert!(layer.check_auto_draw());
    }

    #[test]
    fn test_frozen_layer_ignores_updates() {
        let mut layer = Layer::new("test", 1, None);
        layer.freeze();
        layer.request_update();
        assert!(!layer.check_auto_draw());
        layer.unfreeze();
        assert!(layer.check_auto_draw());
    }

    #[test]
    fn test_elements_draw_in_ascending_z() {
        let mut layer = Layer::new("test", 1, None);
        layer.add_element(1, rect_element(Point::ZERO, 5));
        layer.add_element(2, rect_element(Point::new(20.0, 0.0), 1));
        let mut screen = RecordingSurface::new(Size::new(100.0, 100.0));
        layer.draw_frame(&mut screen, true, 1.0, 16.0);
        // First path drawn starts at the low-z element's corner.
        let first_move = screen
            .commands()
            .iter()
            .find_map(|c| match c {
                Command::MoveTo(p) => Some(*p),
                _ => None,
            })
            .unwrap();
        assert_eq!(first_move, Point::new(20.0, 0.0));
    }

    #[test]
    fn test_not_ready_draws_progress_bar() {
        let mut layer = Layer::new("test", 1, None);
        layer.add_element(1, rect_element(Point::ZERO, 1));
        let mut screen = RecordingSurface::new(Size::new(100.0, 100.0));
        layer.draw_frame(&mut screen, false, 0.5, 16.0);
        // Two fills (track + filled portion), no element fill beyond them.
        assert_eq!(screen.count(|c| matches!(c, Command::Fill(_))), 2);
    }

    #[test]
    fn test_buffered_layer_composites() {
        let buffer = RecordingSurface::new(Size::new(50.0, 50.0));
        let mut layer = Layer::new("test", 1, Some(Box::new(buffer)));
        layer.add_element(1, rect_element(Point::ZERO, 1));
        let mut screen = RecordingSurface::new(Size::new(50.0, 50.0));
        layer.draw_frame(&mut screen, true, 1.0, 16.0);
        // Element commands went to the buffer; the screen only got the blit.
        assert_eq!(
            screen.commands(),
            &[Command::DrawPixels {
                width: 50,
                height: 50,
                at: Point::ZERO
            }]
        );
    }

    #[test]
    fn test_clear_mode_installs_clearer() {
        let mut layer = Layer::new("test", 1, None);
        layer.set_clear_mode(ClearMode::Color(Color::rgb(9, 9, 9)));
        let mut screen = RecordingSurface::new(Size::new(10.0, 10.0));
        layer.draw_frame(&mut screen, true, 1.0, 16.0);
        assert_eq!(
            screen.commands()[0],
            Command::Clear(Some(Color::rgb(9, 9, 9)))
        );
    }
}
