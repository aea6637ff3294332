//! HTTP client for the market data provider.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, warn};

use super::error::MarketError;
use super::record::{MarketRecord, coerce_market, entry_address};
use crate::api::VaultsResponse;
use crate::config::MarketConfig;

/// Read-only client for the provider's market endpoints.
///
/// Every request is bounded by the configured timeout; hitting it is a
/// transport fault like any other.
#[derive(Clone)]
pub struct MarketClient {
    client: reqwest::Client,
    base_url: String,
}

impl MarketClient {
    pub fn new(config: &MarketConfig) -> Result<Self, MarketError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Active markets on `chain_id`, keeping every entry that coerces.
    ///
    /// Only a failed provider call yields `success: false`; entries that fail
    /// coercion are logged and skipped.
    pub async fn list_vaults(&self, chain_id: i64) -> VaultsResponse {
        match self.fetch_markets(chain_id).await {
            Ok(entries) => {
                let records = collect_records(&entries, chain_id);
                debug!(
                    chain_id,
                    received = entries.len(),
                    kept = records.len(),
                    "Fetched markets"
                );
                VaultsResponse::from_records(records)
            }
            Err(e) => {
                error!(chain_id, error = %e, "Failed to fetch markets");
                VaultsResponse::failed(format!("Failed to fetch vaults: {e}"))
            }
        }
    }

    /// Raw provider payload for one market. No coercion is applied.
    pub async fn vault_details(&self, address: &str, chain_id: i64) -> Result<Value, MarketError> {
        let mut url = self.endpoint(&["v2", &chain_id.to_string(), "markets"])?;
        url.path_segments_mut()
            .map_err(|()| MarketError::Payload(format!("cannot-be-a-base url: {}", self.base_url)))?
            .extend([address, "data"]);

        self.get_json(url).await
    }

    async fn fetch_markets(&self, chain_id: i64) -> Result<Vec<Value>, MarketError> {
        let url = self.endpoint(&["v1", &chain_id.to_string(), "markets", "active"])?;
        let mut body = self.get_json(url).await?;
        if !body.is_object() {
            return Err(MarketError::Payload("response is not a JSON object".into()));
        }

        match body.get_mut("markets").map(Value::take) {
            None => Ok(Vec::new()),
            Some(Value::Array(entries)) => Ok(entries),
            Some(other) => Err(MarketError::Payload(format!(
                "'markets' is not an array: {other}"
            ))),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<url::Url, MarketError> {
        let mut url = url::Url::parse(&self.base_url)
            .map_err(|e| MarketError::Payload(format!("invalid base url '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| MarketError::Payload(format!("cannot-be-a-base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: url::Url) -> Result<Value, MarketError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| MarketError::Payload(e.to_string()))
    }
}

/// Coerce each entry on its own; a bad entry never aborts the rest.
fn collect_records(entries: &[Value], chain_id: i64) -> Vec<MarketRecord> {
    entries
        .iter()
        .filter_map(|entry| match coerce_market(entry, chain_id) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(address = %entry_address(entry), error = %e, "Dropping market entry");
                None
            }
        })
        .collect()
}
