//! Agents and the process-wide registry that owns them.
//!
//! An agent is anything implementing [`Agent`]: it turns a prompt into an
//! [`AgentResult`] and advertises a static list of capabilities. The
//! [`AgentRegistry`] maps agent-type names to constructors and caches at most
//! one instance per type for the lifetime of the process.

pub const CHAT_AGENT: &str = "chat";
pub const SEARCH_AGENT: &str = "search";

mod base;
mod chat;
mod error;
mod registry;
mod result;
mod search;
mod web_search;

pub use base::{Agent, SharedAgent};
pub use chat::ChatAgent;
pub use error::{AgentError, RegistryError};
pub use registry::{AgentConstructor, AgentRegistry};
pub use result::{AgentResult, Metadata};
pub use search::{SearchAgent, research_prompt};
pub use web_search::{WebResult, WebSearch, WebSearchError};
