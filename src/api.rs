//! Request and response bodies for the HTTP API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::agent::{CHAT_AGENT, Metadata};
use crate::market::MarketRecord;

// ============================================================================
// Root
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

// ============================================================================
// Status checks
// ============================================================================

/// An audit record written on each `POST /status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCheck {
    pub id: String,
    pub client_name: String,
    pub timestamp: DateTime<Utc>,
}

impl StatusCheck {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_name: client_name.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusCheckCreate {
    pub client_name: String,
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_agent_type")]
    pub agent_type: String,
    /// Accepted for compatibility; not forwarded to agents.
    #[serde(default)]
    pub context: Option<serde_json::Map<String, Value>>,
}

fn default_agent_type() -> String {
    CHAT_AGENT.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub agent_type: String,
    pub capabilities: Vec<String>,
    pub metadata: Metadata,
    pub error: Option<String>,
}

// ============================================================================
// Search
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Advisory only; never enforced as a cap here.
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_max_results() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub summary: String,
    pub search_results: Metadata,
    pub sources_count: u64,
    pub error: Option<String>,
}

// ============================================================================
// Capabilities
// ============================================================================

/// Either the full capability map or an error, never partial data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilitiesResponse {
    Ok {
        success: bool,
        capabilities: BTreeMap<String, Vec<String>>,
    },
    Err {
        success: bool,
        error: String,
    },
}

impl CapabilitiesResponse {
    pub fn ok(capabilities: BTreeMap<String, Vec<String>>) -> Self {
        Self::Ok {
            success: true,
            capabilities,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self::Err {
            success: false,
            error: error.into(),
        }
    }
}

// ============================================================================
// Vaults
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChainQuery {
    #[serde(default = "default_chain_id")]
    pub chain_id: i64,
}

fn default_chain_id() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultsResponse {
    pub success: bool,
    pub vaults: Vec<MarketRecord>,
    pub total: usize,
    pub error: Option<String>,
}

impl VaultsResponse {
    /// `total` always equals the number of records returned.
    pub fn from_records(vaults: Vec<MarketRecord>) -> Self {
        Self {
            success: true,
            total: vaults.len(),
            vaults,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            vaults: Vec::new(),
            total: 0,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VaultDetailResponse {
    pub success: bool,
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_defaults_to_chat_agent() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(req.agent_type, "chat");
        assert!(req.context.is_none());
    }

    #[test]
    fn search_request_defaults_max_results() {
        let req: SearchRequest = serde_json::from_str(r#"{"query": "q"}"#).unwrap();
        assert_eq!(req.max_results, 5);
    }

    #[test]
    fn capabilities_error_has_no_capability_map() {
        let json = serde_json::to_value(CapabilitiesResponse::err("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn failed_vaults_response_is_empty() {
        let resp = VaultsResponse::failed("Failed to fetch vaults: timeout");
        assert!(!resp.success);
        assert!(resp.vaults.is_empty());
        assert_eq!(resp.total, 0);
    }

    #[test]
    fn status_check_gets_fresh_id() {
        let a = StatusCheck::new("probe");
        let b = StatusCheck::new("probe");
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }
}
