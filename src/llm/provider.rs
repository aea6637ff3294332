//! LLM provider trait and types.

use std::str::FromStr;

use async_trait::async_trait;
use serde::Deserialize;

use super::error::LLMError;
use super::types::{ChatRequest, ChatResponse};

// ============================================================================
// Provider Enum
// ============================================================================

/// Supported model providers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Provider {
    Ollama,
    OpenAI,
    OpenRouter,
    Other(String),
}

impl Provider {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Provider::Ollama => "ollama",
            Provider::OpenAI => "openai",
            Provider::OpenRouter => "openrouter",
            Provider::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Provider::from(s.to_string()))
    }
}

impl From<String> for Provider {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ollama" => Provider::Ollama,
            "openai" => Provider::OpenAI,
            "openrouter" => Provider::OpenRouter,
            _ => Provider::Other(s),
        }
    }
}

// ============================================================================
// LLMProvider Trait
// ============================================================================

/// A chat-completion backend.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LLMError>;
}
