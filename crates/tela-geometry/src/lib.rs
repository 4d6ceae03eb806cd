//! Geometry primitives for the Tela scene library.
//!
//! Everything here is plain value math: points and vectors, the canonical
//! shapes (rectangles, circles, ellipses, polygons, lines, composite paths)
//! and the two seams the rest of the workspace draws through:
//!
//! - [`Shape`]: object-safe containment / translation / bounds / tracing
//! - [`PathSink`]: the path-command receiver shapes trace themselves into
//!
//! Shapes own their points. Mutators invalidate any derived caches (the
//! ellipse control polygon, the path flatten buffer) and the caches rebuild
//! lazily on the next read.

pub mod angle;
mod circle;
mod ellipse;
mod error;
mod line;
mod path;
mod point;
mod polygon;
mod rect;
mod rounded;
mod shape;

pub use circle::Circle;
pub use ellipse::Ellipse;
pub use error::GeometryError;
pub use line::Line;
pub use path::{Path, PathBuilder, PathSegment};
pub use point::{Direction, Point, Vector};
pub use polygon::Polygon;
pub use rect::{Rect, Size};
pub use rounded::RoundedRect;
pub use shape::{PathSink, Shape};
