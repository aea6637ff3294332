use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::server::AppState;

pub async fn livez() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

#[derive(Serialize)]
pub struct ReadyzResponse {
    pub status: String,
    pub status_store: String,
}

pub async fn readyz(State(state): State<AppState>) -> Json<ReadyzResponse> {
    let status_store = if state.status_store.is_some() {
        "ready"
    } else {
        "unavailable"
    };
    Json(ReadyzResponse {
        status: "ok".to_string(),
        status_store: status_store.to_string(),
    })
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}

pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
    })
}
