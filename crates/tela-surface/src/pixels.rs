use crate::Color;

/// Opaque reference to a decoded image owned by the rendering backend.
///
/// The scene layer never sees pixel data for images, only the handle and the
/// natural size it needs for placement math.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageHandle {
    pub id: u64,
    pub width: f64,
    pub height: f64,
}

/// CPU-side RGBA8 pixel rectangle, used by the get/put pixel surface
/// operations and the pixel processors.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuf {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuf {
    /// Transparent-black buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(((y * self.width + x) * 4) as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.index(x, y)?;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Out-of-range writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(i) = self.index(x, y) {
            self.data[i..i + 4].copy_from_slice(&rgba);
        }
    }

    pub fn fill(&mut self, color: Color) {
        let a = (color.alpha_or_opaque() * 255.0).round().clamp(0.0, 255.0) as u8;
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, a]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_round_trip() {
        let mut buf = PixelBuf::new(4, 3);
        buf.set(2, 1, [10, 20, 30, 40]);
        assert_eq!(buf.get(2, 1), Some([10, 20, 30, 40]));
        assert_eq!(buf.get(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_out_of_range() {
        let mut buf = PixelBuf::new(2, 2);
        buf.set(5, 5, [1, 1, 1, 1]); // silently ignored
        assert_eq!(buf.get(5, 5), None);
    }

    #[test]
    fn test_fill() {
        let mut buf = PixelBuf::new(2, 2);
        buf.fill(Color::rgba(1, 2, 3, 0.5));
        assert_eq!(buf.get(1, 1), Some([1, 2, 3, 128]));
    }
}
