//! Airport lookup: IATA validation, records, and resolvers.
//!
//! Two resolvers are provided: [`HttpResolver`] talks to the lookup endpoint
//! (`reqwest` natively, `gloo-net` in the browser) and [`AirportDirectory`]
//! answers from memory. The lookup server uses the directory directly.

pub mod code;
pub mod directory;
pub mod error;
pub mod http;
pub mod record;
pub mod resolver;

pub use code::*;
pub use directory::*;
pub use error::*;
pub use http::*;
pub use record::*;
pub use resolver::*;
