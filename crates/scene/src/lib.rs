pub mod arc;
pub mod camera;
pub mod controls;
pub mod graph;
pub mod light;
pub mod material;
pub mod mesh;
pub mod prefabs;

pub use arc::*;
pub use camera::*;
pub use controls::*;
pub use graph::*;
pub use light::*;
pub use material::*;
pub use mesh::*;
pub use prefabs::*;
