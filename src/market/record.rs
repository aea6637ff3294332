//! Coercion of untrusted provider entries into [`MarketRecord`]s.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::CoercionError;

/// One vault/market entry as exposed by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub expiry: String,
    pub chain_id: i64,
    pub volume_24h: f64,
    pub liquidity: f64,
    pub implied_apy: f64,
    pub underlying_apy: f64,
    pub lp_apy: f64,
    pub pt_price: f64,
    pub yt_price: f64,
}

/// Coerce one entry of the provider's `markets` array.
///
/// Text fields fall back to their defaults when absent; metrics fall back to
/// `0.0`. Anything present but unusable fails the whole entry.
pub fn coerce_market(entry: &Value, chain_id: i64) -> Result<MarketRecord, CoercionError> {
    let entry = entry.as_object().ok_or(CoercionError::NotAnObject)?;

    let empty = Map::new();
    let details = match entry.get("details") {
        None => &empty,
        Some(Value::Object(details)) => details,
        Some(_) => return Err(CoercionError::DetailsNotAnObject),
    };

    Ok(MarketRecord {
        address: text(entry, "address", "")?,
        name: text(entry, "name", "Unknown")?,
        symbol: text(entry, "symbol", "")?,
        expiry: text(entry, "expiry", "")?,
        chain_id,
        volume_24h: metric(details, "volume24h")?,
        liquidity: metric(details, "liquidity")?,
        implied_apy: metric(details, "impliedApy")?,
        underlying_apy: metric(details, "underlyingApy")?,
        lp_apy: metric(details, "lpApy")?,
        pt_price: metric(details, "ptPrice")?,
        yt_price: metric(details, "ytPrice")?,
    })
}

/// Best-effort address of an entry, for log lines about dropped entries.
pub fn entry_address(entry: &Value) -> &str {
    entry
        .get("address")
        .and_then(Value::as_str)
        .unwrap_or("<unknown>")
}

fn text(entry: &Map<String, Value>, field: &'static str, default: &str) -> Result<String, CoercionError> {
    match entry.get(field) {
        None => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(CoercionError::InvalidText(field)),
    }
}

fn metric(details: &Map<String, Value>, field: &'static str) -> Result<f64, CoercionError> {
    let Some(value) = details.get(field) else {
        return Ok(0.0);
    };

    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    // NaN and infinities have no JSON representation.
    number
        .filter(|n| n.is_finite())
        .ok_or_else(|| CoercionError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}
