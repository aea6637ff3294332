//! Runs chat and search requests against cached agents.
//!
//! The dispatcher is the only place where agent outcomes are turned into API
//! responses. An unknown agent type is the one error handed back to the
//! caller; construction and invocation faults become `success: false`
//! bodies so clients always get something they can parse.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::agent::{
    AgentRegistry, AgentResult, CHAT_AGENT, Metadata, RegistryError, SEARCH_AGENT, research_prompt,
};
use crate::api::{CapabilitiesResponse, ChatResponse, SearchResponse};

/// Metadata keys consulted for the search source count, in preference order.
const SOURCE_COUNT_KEYS: [&str; 2] = ["tool_run_count", "tools_used"];

#[derive(Clone)]
pub struct Dispatcher {
    registry: AgentRegistry,
}

impl Dispatcher {
    pub fn new(registry: AgentRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Run `message` through the agent registered as `agent_type`.
    ///
    /// Returns `Err` only for [`RegistryError::InvalidAgentType`].
    pub async fn handle_chat(
        &self,
        message: &str,
        agent_type: &str,
    ) -> Result<ChatResponse, RegistryError> {
        let agent = match self.registry.get_or_create(agent_type).await {
            Ok(agent) => agent,
            Err(e @ RegistryError::InvalidAgentType(_)) => {
                warn!(agent_type = %agent_type, "Rejected unknown agent type");
                return Err(e);
            }
            Err(e) => {
                error!(agent_type = %agent_type, error = %e, "Agent construction failed");
                return Ok(chat_fault(agent_type, e.to_string()));
            }
        };

        match agent.execute(message, false).await {
            Ok(result) => {
                let (content, metadata, error) = result.into_parts();
                Ok(ChatResponse {
                    success: error.is_none(),
                    response: content,
                    agent_type: agent_type.to_string(),
                    capabilities: agent.capabilities(),
                    metadata,
                    error,
                })
            }
            Err(e) => {
                error!(agent_type = %agent_type, error = %e, "Agent invocation failed");
                Ok(chat_fault(agent_type, e.to_string()))
            }
        }
    }

    /// Ask the search agent for a summary of `query`, with tools enabled.
    ///
    /// `max_results` is advisory; the search agent's own configuration decides
    /// how many web results it fetches.
    pub async fn handle_search(&self, query: &str, max_results: u32) -> SearchResponse {
        debug!(query = %query, max_results, "Dispatching search");

        let agent = match self.registry.get_or_create(SEARCH_AGENT).await {
            Ok(agent) => agent,
            Err(e) => {
                error!(agent_type = SEARCH_AGENT, error = %e, "Search agent unavailable");
                return search_failure(query, e.to_string());
            }
        };

        let prompt = research_prompt(query);
        match agent.execute(&prompt, true).await {
            Ok(result) if result.is_success() => {
                let count = sources_count(result.metadata());
                let (summary, metadata, _) = result.into_parts();
                SearchResponse {
                    success: true,
                    query: query.to_string(),
                    summary,
                    search_results: metadata,
                    sources_count: count,
                    error: None,
                }
            }
            Ok(result) => search_failure(query, failure_reason(&result)),
            Err(e) => {
                error!(agent_type = SEARCH_AGENT, error = %e, "Agent invocation failed");
                search_failure(query, e.to_string())
            }
        }
    }

    /// Capability lists for the built-in agents, constructing them if needed.
    pub async fn list_capabilities(&self) -> CapabilitiesResponse {
        let mut capabilities = BTreeMap::new();
        for (key, agent_type) in [("search_agent", SEARCH_AGENT), ("chat_agent", CHAT_AGENT)] {
            match self.registry.get_or_create(agent_type).await {
                Ok(agent) => {
                    capabilities.insert(key.to_string(), agent.capabilities());
                }
                Err(e) => {
                    error!(agent_type = %agent_type, error = %e, "Failed to resolve agent capabilities");
                    return CapabilitiesResponse::err(e.to_string());
                }
            }
        }
        CapabilitiesResponse::ok(capabilities)
    }
}

fn chat_fault(agent_type: &str, error: String) -> ChatResponse {
    ChatResponse {
        success: false,
        response: String::new(),
        agent_type: agent_type.to_string(),
        capabilities: Vec::new(),
        metadata: Metadata::new(),
        error: Some(error),
    }
}

fn search_failure(query: &str, error: String) -> SearchResponse {
    SearchResponse {
        success: false,
        query: query.to_string(),
        summary: String::new(),
        search_results: Metadata::new(),
        sources_count: 0,
        error: Some(error),
    }
}

fn failure_reason(result: &AgentResult) -> String {
    result.error().unwrap_or_default().to_string()
}

/// Number of sources reported by an agent, read from the first metadata key
/// present. Negative, fractional-negative or non-numeric values count as 0.
pub fn sources_count(metadata: &Metadata) -> u64 {
    SOURCE_COUNT_KEYS
        .iter()
        .find_map(|key| metadata.get(*key))
        .map(coerce_count)
        .unwrap_or(0)
}

fn coerce_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f > 0.0)
                .map_or(0, |f| f.trunc() as u64)
        }),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
