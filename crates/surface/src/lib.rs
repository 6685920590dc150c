//! Land/ocean surface texture synthesis for the route globe.
//!
//! Every strategy ends in the same place: a binary-ish land alpha plane,
//! which is expanded into the three textures the land overlay samples
//! (color, alpha mask, bump). See [`synthesize`].

pub mod blur;
pub mod decode;
pub mod error;
pub mod land_mask;
pub mod plane;
pub mod procedural;
pub mod sdf;
pub mod strategy;
pub mod textures;

pub use error::*;
pub use plane::*;
pub use strategy::*;
pub use textures::*;
