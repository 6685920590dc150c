use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GpuError {
    #[error("graphics context unavailable: {0}")]
    Context(String),

    #[error("host element unavailable: {0}")]
    Host(String),

    #[error("failed to create {kind}: {message}")]
    Resource { kind: &'static str, message: String },

    #[error("render failed: {0}")]
    Render(String),
}

impl GpuError {
    pub fn resource(kind: &'static str, message: impl Into<String>) -> Self {
        GpuError::Resource {
            kind,
            message: message.into(),
        }
    }
}
