//! Market provider error types.

use thiserror::Error;

/// A fault that fails a whole provider call.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned status {status}")]
    Status { status: u16 },

    #[error("invalid provider payload: {0}")]
    Payload(String),
}

/// Why a single market entry was dropped.
#[derive(Debug, Error, PartialEq)]
pub enum CoercionError {
    #[error("market entry is not an object")]
    NotAnObject,

    #[error("'details' is not an object")]
    DetailsNotAnObject,

    #[error("field '{0}' is not a string")]
    InvalidText(&'static str),

    #[error("field '{field}' cannot be read as a number: {value}")]
    InvalidNumber { field: &'static str, value: String },
}
