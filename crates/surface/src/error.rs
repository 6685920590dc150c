use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface image decode failed: {0}")]
    Decode(String),

    #[error("surface image encode failed: {0}")]
    Encode(String),

    #[error("surface image is empty")]
    EmptyImage,

    #[error("surface image buffer of {len} bytes does not match {width}x{height}")]
    InvalidDimensions { width: u32, height: u32, len: usize },

    #[error("invalid surface parameter: {0}")]
    InvalidParameter(String),

    #[error("texture strategy `{0}` needs a source image")]
    MissingSource(&'static str),
}
