use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tokio::fs;

use crate::llm::Provider;

/// Environment variable naming the data-store location.
pub const STORE_URL_ENV: &str = "STORE_URL";
/// Environment variable naming the database inside the data store.
pub const DB_NAME_ENV: &str = "DB_NAME";

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub agents: AgentConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),

    #[error("environment variable '{0}' is not set")]
    MissingEnvVar(String),

    #[error("unclosed variable reference '${{' (missing '}}')")]
    UnclosedVarReference,
}

impl Config {
    /// Load the config file, expanding `${VAR}` references first.
    ///
    /// A missing file yields the defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path.as_ref()).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let expanded = expand_env_vars(&contents)?;
        Ok(serde_saphyr::from_str(&expanded)?)
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

// ============================================================================
// AgentConfig
// ============================================================================

/// Settings shared by every agent, applied once when an agent is constructed.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_provider")]
    pub provider: Provider,
    #[serde(default = "default_model")]
    pub model: String,
    /// Overrides the provider's default endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Conversation turns kept by the chat agent.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Web results requested per search tool run.
    #[serde(default = "default_search_results")]
    pub search_results: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            temperature: None,
            max_tokens: None,
            max_history: default_max_history(),
            search_results: default_search_results(),
        }
    }
}

// ============================================================================
// MarketConfig
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_market_base_url")]
    pub base_url: String,
    #[serde(default = "default_market_timeout")]
    pub timeout_seconds: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: default_market_base_url(),
            timeout_seconds: default_market_timeout(),
        }
    }
}

// ============================================================================
// StoreConfig
// ============================================================================

/// Data-store location. Both fields are required at startup; values missing
/// from the file are taken from `STORE_URL` / `DB_NAME`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
}

/// Fully resolved data-store location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    pub url: String,
    pub database: String,
}

impl StoreLocation {
    /// Directory holding the database's collections.
    ///
    /// `url` is a filesystem path, optionally written as `file://<path>`.
    pub fn database_dir(&self) -> PathBuf {
        let root = self.url.strip_prefix("file://").unwrap_or(&self.url);
        Path::new(root).join(&self.database)
    }
}

impl StoreConfig {
    pub fn resolve(&self) -> Result<StoreLocation, ConfigError> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    fn resolve_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<StoreLocation, ConfigError> {
        let pick = |configured: &Option<String>, env: &str| {
            configured
                .clone()
                .or_else(|| lookup(env))
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(env.to_string()))
        };

        Ok(StoreLocation {
            url: pick(&self.url, STORE_URL_ENV)?,
            database: pick(&self.database, DB_NAME_ENV)?,
        })
    }
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` references; `$$` is a literal `$`.
///
/// A `$` not followed by `{` or `$` is kept as-is. Nested references are not
/// supported.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if let Some(after) = tail.strip_prefix('$') {
            out.push('$');
            rest = after;
        } else if let Some(after) = tail.strip_prefix('{') {
            let end = after.find('}').ok_or(ConfigError::UnclosedVarReference)?;
            out.push_str(&lookup_reference(&after[..end])?);
            rest = &after[end + 1..];
        } else {
            out.push('$');
            rest = tail;
        }
    }

    out.push_str(rest);
    Ok(out)
}

fn lookup_reference(reference: &str) -> Result<String, ConfigError> {
    let (name, default) = match reference.split_once(":-") {
        Some((name, default)) => (name, Some(default)),
        None => (reference, None),
    };

    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_string()),
        (Err(_), None) => Err(ConfigError::MissingEnvVar(name.to_string())),
    }
}

// ============================================================================
// Private Helpers (Serde Defaults)
// ============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    300
}

fn default_provider() -> Provider {
    Provider::OpenRouter
}

fn default_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_max_history() -> usize {
    20
}

fn default_search_results() -> u32 {
    5
}

fn default_market_base_url() -> String {
    "https://api-v2.pendle.finance/core".to_string()
}

fn default_market_timeout() -> u64 {
    30
}

// ============================================================================
// Tests
// ============================================================================
