//! Persistence for status-check records.

pub mod error;
pub mod file;
mod status;

pub use error::{StorageError, StorageResult};
pub use status::StatusCheckStore;
