//! Paints and the raster surface seam.
//!
//! Rendering backends live outside this workspace; they plug in by
//! implementing [`Surface`] (which is also a [`tela_geometry::PathSink`], so
//! shapes trace straight into it). The crate ships one implementation,
//! [`RecordingSurface`], which records draw commands for tests and
//! diagnostics instead of rasterizing.

mod paint;
mod pixels;
mod recording;
mod surface;

pub use paint::{Color, ColorDelta, GradientStop, Paint, PaintError};
pub use pixels::{ImageHandle, PixelBuf};
pub use recording::{Command, RecordingSurface};
pub use surface::{Placement, SharedSurface, Surface};
