use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("invalid IATA code {0:?}: expected three letters")]
    InvalidCode(String),

    #[error("Airport {iata} not found")]
    NotFound { iata: String },

    #[error("airport lookup request failed: {0}")]
    Transport(String),

    #[error("airport lookup returned an unreadable payload: {0}")]
    Decode(String),
}
