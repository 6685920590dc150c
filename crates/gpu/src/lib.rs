//! Graphics backend seam for the route globe.
//!
//! [`GraphicsBackend`] is what the globe component allocates through; the
//! browser crate implements it with wgpu, [`HeadlessBackend`] implements it
//! in memory and records what is live.

pub mod backend;
pub mod error;
pub mod headless;
pub mod renderer;
pub mod viewport;

pub use backend::*;
pub use error::*;
pub use headless::*;
pub use renderer::*;
pub use viewport::*;
