//! File-based storage implementations.
//!
//! Each collection is an append-only JSONL file inside the database directory.

mod status;

pub use status::FileStatusStore;
