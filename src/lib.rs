//! Agentgate - HTTP gateway that dispatches requests to pluggable agents and
//! aggregates market listings from an external provider.

pub mod agent;
pub mod api;
pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod llm;
pub mod market;
pub mod server;
pub mod store;
pub mod sync;
