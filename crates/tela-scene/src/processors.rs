//! Pre/post frame processors.
//!
//! A processor runs against a layer's surface before its elements draw
//! (pre) or after (post). Pixel processors read the surface back, transform
//! the buffer, and blit it again; [`Clearer`] short-circuits that and clears
//! directly.

use palette::{FromColor, Hsv, Srgb};
use tela_geometry::{Point, Rect};
use tela_surface::{Color, PixelBuf, Surface};

pub trait Processor {
    /// Pixel transform, for processors that work on raw RGBA.
    fn process_pixels(&self, _pixels: &mut PixelBuf) {}

    /// Full-surface pass. The default reads back the whole surface, runs
    /// [`Self::process_pixels`], and writes the result in place.
    fn process(&self, surface: &mut dyn Surface) {
        let size = surface.size();
        let region = Rect::with_size(Point::ZERO, size);
        let mut pixels = surface.pixels(region);
        self.process_pixels(&mut pixels);
        surface.draw_pixels(&pixels, Point::ZERO);
    }
}

/// Clears the surface, optionally to a flat color.
pub struct Clearer(pub Option<Color>);

impl Processor for Clearer {
    fn process(&self, surface: &mut dyn Surface) {
        surface.clear(self.0);
    }
}

/// Rec. 601 luma grayscale.
pub struct Grayscale;

impl Processor for Grayscale {
    fn process_pixels(&self, pixels: &mut PixelBuf) {
        for px in pixels.data_mut().chunks_exact_mut(4) {
            let luma = 0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64;
            let v = luma.round().clamp(0.0, 255.0) as u8;
            px[0] = v;
            px[1] = v;
            px[2] = v;
        }
    }
}

/// Channel inversion, alpha untouched.
pub struct Invert;

impl Processor for Invert {
    fn process_pixels(&self, pixels: &mut PixelBuf) {
        for px in pixels.data_mut().chunks_exact_mut(4) {
            px[0] = 255 - px[0];
            px[1] = 255 - px[1];
            px[2] = 255 - px[2];
        }
    }
}

/// Hue/saturation/value shift through HSV space.
pub struct HsbShift {
    /// Degrees added to the hue.
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl Processor for HsbShift {
    fn process_pixels(&self, pixels: &mut PixelBuf) {
        for px in pixels.data_mut().chunks_exact_mut(4) {
            let rgb = Srgb::new(
                px[0] as f32 / 255.0,
                px[1] as f32 / 255.0,
                px[2] as f32 / 255.0,
            );
            let mut hsv = Hsv::from_color(rgb);
            hsv.hue += self.hue;
            hsv.saturation = (hsv.saturation + self.saturation).clamp(0.0, 1.0);
            hsv.value = (hsv.value + self.value).clamp(0.0, 1.0);
            let out = Srgb::from_color(hsv);
            px[0] = (out.red * 255.0).round().clamp(0.0, 255.0) as u8;
            px[1] = (out.green * 255.0).round().clamp(0.0, 255.0) as u8;
            px[2] = (out.blue * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tela_geometry::Size;
    use tela_surface::{Command, RecordingSurface};

    #[test]
    fn test_clearer_clears_directly() {
        let mut s = RecordingSurface::new(Size::new(10.0, 10.0));
        Clearer(Some(Color::rgb(1, 2, 3))).process(&mut s);
        assert_eq!(s.commands(), &[Command::Clear(Some(Color::rgb(1, 2, 3)))]);
        Clearer(None).process(&mut s);
        assert_eq!(s.commands().last(), Some(&Command::Clear(None)));
    }

    #[test]
    fn test_grayscale_pixels() {
        let mut buf = PixelBuf::new(1, 1);
        buf.set(0, 0, [255, 0, 0, 255]);
        Grayscale.process_pixels(&mut buf);
        let px = buf.get(0, 0).unwrap();
        assert_eq!(px, [76, 76, 76, 255]); // 0.299 * 255
    }

    #[test]
    fn test_invert_pixels() {
        let mut buf = PixelBuf::new(1, 1);
        buf.set(0, 0, [10, 20, 30, 200]);
        Invert.process_pixels(&mut buf);
        assert_eq!(buf.get(0, 0).unwrap(), [245, 235, 225, 200]);
    }

    #[test]
    fn test_hsb_shift_rotates_hue() {
        let mut buf = PixelBuf::new(1, 1);
        buf.set(0, 0, [255, 0, 0, 255]);
        HsbShift {
            hue: 120.0,
            saturation: 0.0,
            value: 0.0,
        }
        .process_pixels(&mut buf);
        let px = buf.get(0, 0).unwrap();
        // Red rotated a third of the wheel lands on green.
        assert_eq!(px, [0, 255, 0, 255]);
    }

    #[test]
    fn test_pixel_processor_default_surface_pass() {
        let mut s = RecordingSurface::new(Size::new(4.0, 4.0));
        Invert.process(&mut s);
        assert!(matches!(
            s.commands().last(),
            Some(Command::DrawPixels {
                width: 4,
                height: 4,
                ..
            })
        ));
    }
}
