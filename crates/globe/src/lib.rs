//! Route globe: a 3D globe showing one flight route.
//!
//! [`GlobeComponent`] ties the pieces together. Give it a [`Platform`]
//! (airport resolver, asset loader, graphics backend, frame loop, resize
//! observer) and a [`GlobeConfig`], then call
//! [`GlobeComponent::set_route`] whenever the origin or destination
//! changes. Each call supersedes the previous one; at most one
//! [`SceneHandle`] is alive at a time.

pub mod assets;
pub mod config;
pub mod error;
pub mod handle;
pub mod lifecycle;

pub use assets::*;
pub use config::*;
pub use error::*;
pub use handle::SceneHandle;
pub use lifecycle::*;
