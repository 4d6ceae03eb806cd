use thiserror::Error;

/// Errors raised by shape constructors and the path string codec.
///
/// Construction is the validation boundary: a successfully built shape is
/// always geometrically well-formed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("circle radius must be non-negative, got {0}")]
    NegativeRadius(f64),

    #[error("corner radius must be non-negative, got {0}")]
    NegativeCornerRadius(f64),

    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("malformed path string near `{0}`")]
    MalformedPath(String),
}
