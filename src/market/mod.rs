//! External market data: fetching, per-entry coercion and partial results.

mod client;
mod error;
mod record;

pub use client::MarketClient;
pub use error::{CoercionError, MarketError};
pub use record::{MarketRecord, coerce_market};
