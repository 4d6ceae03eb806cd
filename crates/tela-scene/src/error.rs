use thiserror::Error;

/// Scene-level errors. Everything here is raised synchronously at the call
/// site; nothing is deferred into the frame loop.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("no timing function `{0}`")]
    UnknownTimingFunction(String),

    #[error("animation target has no property `{0}`")]
    UnknownProperty(String),

    #[error("property `{0}` cannot tween between different value kinds")]
    PropertyTypeMismatch(String),

    #[error("animation has no target properties")]
    EmptyAnimation,

    #[error("layer `{0}` already exists")]
    LayerExists(String),

    #[error("no layer `{0}`")]
    UnknownLayer(String),

    #[error("no element {0}")]
    UnknownElement(u64),

    #[error("no image `{0}`")]
    UnknownImage(String),

    #[error(transparent)]
    Geometry(#[from] tela_geometry::GeometryError),

    #[error(transparent)]
    Paint(#[from] tela_surface::PaintError),
}
