//! Tela: a retained-mode 2D canvas scene library.
//!
//! This facade crate re-exports the workspace members:
//! - [`tela_geometry`]: points, vectors and the shape primitives
//! - [`tela_surface`]: colors, paints and the raster surface seam
//! - [`tela_config`]: `tela.toml` / environment configuration
//! - [`tela_scene`]: scheduler, animation, layers, input routing

pub use tela_config as config;
pub use tela_geometry as geometry;
pub use tela_scene as scene;
pub use tela_surface as surface;

pub use tela_config::TelaConfig;
pub use tela_geometry::{Point, Rect, Shape, Vector};
pub use tela_scene::{Stage, StageOptions};
pub use tela_surface::{Color, Paint, Surface};
