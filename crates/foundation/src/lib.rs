//! Math and handle primitives shared by the globe crates.

pub mod handles;
pub mod math;

pub use handles::*;
