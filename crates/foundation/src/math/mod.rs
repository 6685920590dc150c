pub mod bezier;
pub mod mat4;
pub mod sphere;
pub mod vec;

pub use bezier::*;
pub use mat4::*;
pub use sphere::*;
pub use vec::*;
