//! Lazy, memoized construction of agents keyed by type name.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::base::SharedAgent;
use super::chat::ChatAgent;
use super::error::{AgentError, RegistryError};
use super::search::SearchAgent;
use super::web_search::WebSearch;
use super::{CHAT_AGENT, SEARCH_AGENT};
use crate::config::AgentConfig;
use crate::llm::ProviderRegistry;

/// Builds an agent from the shared [`AgentConfig`].
pub type AgentConstructor =
    Arc<dyn Fn(&AgentConfig) -> Result<SharedAgent, AgentError> + Send + Sync>;

/// Process-wide agent cache.
///
/// Holds a constructor table (fixed once the registry is shared) and at most
/// one live instance per registered type. The first request for a type builds
/// it under a per-type lock; every later request gets the same instance back.
/// Unknown types are rejected before the cache is touched.
///
/// Cloning is cheap and clones share the same cache.
#[derive(Clone)]
pub struct AgentRegistry {
    config: Arc<AgentConfig>,
    constructors: Arc<HashMap<String, AgentConstructor>>,
    instances: Arc<RwLock<HashMap<String, SharedAgent>>>,
    inflight: crate::sync::KeyedLocks,
}

impl AgentRegistry {
    /// Create a registry with no agent types registered.
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config: Arc::new(config),
            constructors: Arc::new(HashMap::new()),
            instances: Arc::new(RwLock::new(HashMap::new())),
            inflight: crate::sync::KeyedLocks::new(),
        }
    }

    /// Create a registry with the built-in `chat` and `search` agents.
    pub fn with_builtins(config: AgentConfig, providers: ProviderRegistry) -> Self {
        let chat_providers = providers.clone();
        let search_providers = providers;

        Self::new(config)
            .register(CHAT_AGENT, move |config| {
                let agent = ChatAgent::from_registry(config, &chat_providers)?;
                Ok(Arc::new(agent) as SharedAgent)
            })
            .register(SEARCH_AGENT, move |config| {
                let web = WebSearch::from_env(search_providers.client().clone());
                if web.is_none() {
                    warn!("BRAVE_API_KEY not set; search agent will answer without web results");
                }
                let agent = SearchAgent::from_registry(config, &search_providers, web)?;
                Ok(Arc::new(agent) as SharedAgent)
            })
    }

    /// Register a constructor for `agent_type`, replacing any previous one.
    ///
    /// Registration happens while building the registry; clones taken before
    /// this call keep their own constructor table.
    #[must_use]
    pub fn register<F>(mut self, agent_type: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&AgentConfig) -> Result<SharedAgent, AgentError> + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.constructors).insert(agent_type.into(), Arc::new(constructor));
        self
    }

    /// Registered agent types, sorted.
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.constructors.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn is_registered(&self, agent_type: &str) -> bool {
        self.constructors.contains_key(agent_type)
    }

    /// Number of agents constructed so far.
    pub async fn cached_len(&self) -> usize {
        self.instances.read().await.len()
    }

    /// Return the cached agent for `agent_type`, constructing it on first use.
    pub async fn get_or_create(&self, agent_type: &str) -> Result<SharedAgent, RegistryError> {
        let Some(constructor) = self.constructors.get(agent_type) else {
            return Err(RegistryError::InvalidAgentType(agent_type.to_string()));
        };

        if let Some(agent) = self.cached(agent_type).await {
            return Ok(agent);
        }

        let lock = self.inflight.get(agent_type);
        let _guard = lock.lock().await;

        // Another request may have finished construction while we waited.
        if let Some(agent) = self.cached(agent_type).await {
            return Ok(agent);
        }

        let agent = constructor(&self.config).map_err(|source| RegistryError::Construction {
            agent_type: agent_type.to_string(),
            source,
        })?;

        self.instances
            .write()
            .await
            .insert(agent_type.to_string(), agent.clone());
        if agent.agent_type() != agent_type {
            warn!(
                agent_type = %agent_type,
                reported = %agent.agent_type(),
                "Agent reports a different type than it was registered under"
            );
        }
        info!(agent_type = %agent.agent_type(), "Constructed agent");

        Ok(agent)
    }

    async fn cached(&self, agent_type: &str) -> Option<SharedAgent> {
        let agent = self.instances.read().await.get(agent_type).cloned();
        if agent.is_some() {
            debug!(agent_type = %agent_type, "Agent cache hit");
        }
        agent
    }
}
