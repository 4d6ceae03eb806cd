use tela_geometry::{PathSink, Point, Rect, Size};

use crate::{Color, ImageHandle, Paint, PixelBuf, Placement, Surface};

/// One recorded surface operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Begin,
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
    Arc {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        ccw: bool,
    },
    Close,
    Fill(Paint),
    Stroke(Paint, f64),
    Clear(Option<Color>),
    Save,
    Restore,
    Clip,
    DrawImage(ImageHandle, Placement),
    DrawPixels {
        width: u32,
        height: u32,
        at: Point,
    },
}

/// Surface that records commands instead of rasterizing.
///
/// Pixel readback returns transparent black of the requested size, which is
/// enough for the back-buffer composite plumbing to run under test.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    size: Size,
    commands: Vec<Command>,
    /// Advance per character for `measure_text`; a flat-width fake.
    char_width: f64,
}

impl RecordingSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
            char_width: 7.0,
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl PathSink for RecordingSurface {
    fn begin(&mut self) {
        self.commands.push(Command::Begin);
    }

    fn move_to(&mut self, p: Point) {
        self.commands.push(Command::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.commands.push(Command::LineTo(p));
    }

    fn curve_to(&mut self, c1: Point, c2: Point, to: Point) {
        self.commands.push(Command::CurveTo(c1, c2, to));
    }

    fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64, ccw: bool) {
        self.commands.push(Command::Arc {
            center,
            radius,
            start,
            end,
            ccw,
        });
    }

    fn close(&mut self) {
        self.commands.push(Command::Close);
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn fill(&mut self, paint: &Paint) {
        self.commands.push(Command::Fill(paint.clone()));
    }

    fn stroke(&mut self, paint: &Paint, width: f64) {
        self.commands.push(Command::Stroke(paint.clone(), width));
    }

    fn clear(&mut self, color: Option<Color>) {
        self.commands.push(Command::Clear(color));
    }

    fn save(&mut self) {
        self.commands.push(Command::Save);
    }

    fn restore(&mut self) {
        self.commands.push(Command::Restore);
    }

    fn clip(&mut self) {
        self.commands.push(Command::Clip);
    }

    fn draw_image(&mut self, image: ImageHandle, placement: Placement) {
        self.commands.push(Command::DrawImage(image, placement));
    }

    fn draw_pixels(&mut self, pixels: &PixelBuf, at: Point) {
        self.commands.push(Command::DrawPixels {
            width: pixels.width(),
            height: pixels.height(),
            at,
        });
    }

    fn pixels(&self, region: Rect) -> PixelBuf {
        let n = region.normalized();
        PixelBuf::new(n.width().max(0.0) as u32, n.height().max(0.0) as u32)
    }

    fn measure_text(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tela_geometry::Shape;

    #[test]
    fn test_records_shape_trace_and_fill() {
        let mut s = RecordingSurface::new(Size::new(100.0, 100.0));
        let rect = Rect::new(Point::ZERO, Point::new(10.0, 10.0));
        s.begin();
        rect.trace(&mut s);
        s.fill(&Paint::Solid(Color::rgb(255, 0, 0)));
        assert_eq!(s.commands()[0], Command::Begin);
        assert_eq!(
            s.count(|c| matches!(c, Command::LineTo(_))),
            3,
        );
        assert_eq!(
            *s.commands().last().unwrap(),
            Command::Fill(Paint::Solid(Color::rgb(255, 0, 0)))
        );
    }

    #[test]
    fn test_take_commands_drains() {
        let mut s = RecordingSurface::new(Size::new(10.0, 10.0));
        s.clear(None);
        assert_eq!(s.take_commands().len(), 1);
        assert!(s.commands().is_empty());
    }

    #[test]
    fn test_pixel_readback_is_blank() {
        let s = RecordingSurface::new(Size::new(10.0, 10.0));
        let buf = s.pixels(Rect::new(Point::ZERO, Point::new(4.0, 2.0)));
        assert_eq!((buf.width(), buf.height()), (4, 2));
        assert!(buf.data().iter().all(|&b| b == 0));
    }
}
