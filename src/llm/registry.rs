//! Provider registry for LLM credentials and provider creation.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};

use super::openai::OpenAICompatibleProvider;
use super::provider::{LLMProvider, Provider};

/// Default base URLs for each provider.
pub mod defaults {
    pub const OLLAMA: &str = "http://localhost:11434/v1";
    pub const OPENAI: &str = "https://api.openai.com/v1";
    pub const OPENROUTER: &str = "https://openrouter.ai/api/v1";
}

/// Registry of LLM provider credentials.
///
/// Holds API keys read from the environment and one shared `reqwest::Client`
/// handed to every provider it creates, so agents share a connection pool.
#[derive(Clone)]
pub struct ProviderRegistry {
    api_keys: HashMap<Provider, String>,
    client: Client,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self {
            api_keys: HashMap::new(),
            client: Client::new(),
        }
    }
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize registry with API keys from environment variables.
    pub fn from_env() -> Self {
        let mut registry = Self::new();

        // Ollama doesn't need an API key
        registry.api_keys.insert(Provider::Ollama, String::new());

        for (provider, var) in [
            (Provider::OpenAI, "OPENAI_API_KEY"),
            (Provider::OpenRouter, "OPENROUTER_API_KEY"),
        ] {
            if let Ok(key) = std::env::var(var)
                && !key.is_empty()
            {
                info!(provider = %provider, "Found API key");
                registry.api_keys.insert(provider, key);
            }
        }

        if !registry.has_cloud_provider() {
            warn!(
                "No cloud LLM providers configured. \
                Set OPENROUTER_API_KEY or OPENAI_API_KEY."
            );
        }

        registry
    }

    /// Register a key explicitly (takes precedence over the environment).
    #[must_use]
    pub fn with_api_key(mut self, provider: Provider, key: impl Into<String>) -> Self {
        self.api_keys.insert(provider, key.into());
        self
    }

    fn has_cloud_provider(&self) -> bool {
        self.api_keys.contains_key(&Provider::OpenAI)
            || self.api_keys.contains_key(&Provider::OpenRouter)
    }

    /// Shared HTTP client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Create a provider instance with optional base_url override.
    ///
    /// Returns `None` when the provider is unknown or has no credentials.
    pub fn get(&self, provider: &Provider, base_url: Option<&str>) -> Option<Arc<dyn LLMProvider>> {
        let default_url = match provider {
            Provider::Ollama => defaults::OLLAMA,
            Provider::OpenAI => defaults::OPENAI,
            Provider::OpenRouter => defaults::OPENROUTER,
            Provider::Other(name) => {
                warn!(provider = %name, "Unknown provider");
                return None;
            }
        };

        let api_key = self.api_keys.get(provider)?;
        let api_key = (!api_key.is_empty()).then(|| api_key.clone());
        let url = base_url.unwrap_or(default_url);

        Some(Arc::new(OpenAICompatibleProvider::new(
            self.client.clone(),
            url.to_string(),
            api_key,
        )))
    }
}
