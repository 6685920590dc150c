use airports::ResolveError;
use gpu::GpuError;
use surface::SurfaceError;
use thiserror::Error;

/// Anything that stops a cycle from producing a scene.
///
/// A superseded cycle is not an error; see [`crate::CycleOutcome::Stale`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GlobeError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Gpu(#[from] GpuError),

    #[error("invalid globe configuration: {0}")]
    Config(String),

    #[error("failed to load surface source {source_name}: {message}")]
    Asset {
        source_name: String,
        message: String,
    },
}

impl GlobeError {
    pub fn asset(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        GlobeError::Asset {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}
