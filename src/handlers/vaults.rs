//! Vault listing and detail handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::{ChainQuery, VaultDetailResponse, VaultsResponse};
use crate::handlers::problem_details;
use crate::server::AppState;

/// GET /api/vaults?chain_id=1
pub async fn list_vaults(
    State(state): State<AppState>,
    Query(query): Query<ChainQuery>,
) -> Json<VaultsResponse> {
    Json(state.market.list_vaults(query.chain_id).await)
}

/// GET /api/vaults/{address}?chain_id=1
pub async fn get_vault(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<ChainQuery>,
) -> Response {
    match state.market.vault_details(&address, query.chain_id).await {
        Ok(data) => Json(VaultDetailResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(e) => {
            error!(address = %address, chain_id = query.chain_id, error = %e, "Failed to fetch vault details");
            problem_details::internal_error(format!("Failed to fetch vault details: {e}"))
                .into_response()
        }
    }
}
