//! Agent error types.

use thiserror::Error;

use crate::llm::LLMError;

/// Fault raised by an agent while being built or while executing a prompt.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("llm provider '{0}' is not configured")]
    ProviderUnavailable(String),

    #[error("llm request failed: {0}")]
    Llm(#[from] LLMError),

    #[error("{0}")]
    Other(String),
}

/// Errors returned by [`AgentRegistry::get_or_create`](super::AgentRegistry::get_or_create).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No constructor is registered under this name. Caller-fixable.
    #[error("Unknown agent type '{0}'")]
    InvalidAgentType(String),

    /// The constructor itself failed; nothing was cached.
    #[error("failed to construct '{agent_type}' agent: {source}")]
    Construction {
        agent_type: String,
        #[source]
        source: AgentError,
    },
}
