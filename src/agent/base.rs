//! The agent capability interface.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::AgentError;
use super::result::AgentResult;

/// A named, stateful agent.
///
/// `execute` returning `Err` is an invocation fault; a structured failure is
/// `Ok` with an unsuccessful [`AgentResult`]. Implementations may keep mutable
/// state (conversation history, counters) and are shared across concurrent
/// requests; any isolation between those calls is the implementation's job.
#[async_trait]
pub trait Agent: Send + Sync {
    /// The registry key this agent is constructed under.
    fn agent_type(&self) -> &str;

    /// Static capability list for this agent type.
    fn capabilities(&self) -> Vec<String>;

    /// Run one prompt. `use_tools` enables tool use for agents that have tools.
    async fn execute(&self, prompt: &str, use_tools: bool) -> Result<AgentResult, AgentError>;
}

/// Shared handle to a cached agent.
pub type SharedAgent = Arc<dyn Agent>;
