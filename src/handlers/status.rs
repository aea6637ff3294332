//! Root greeting and status-check handlers.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::{RootResponse, StatusCheck, StatusCheckCreate};
use crate::handlers::problem_details;
use crate::server::AppState;

/// Upper bound on records returned by `GET /status`.
pub const STATUS_LIST_LIMIT: usize = 1000;

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Hello World".to_string(),
    })
}

/// POST /api/status
pub async fn create_status_check(
    State(state): State<AppState>,
    Json(input): Json<StatusCheckCreate>,
) -> Response {
    let Some(store) = state.status_store.as_ref() else {
        return problem_details::service_unavailable("status store is not ready").into_response();
    };

    let check = StatusCheck::new(input.client_name);
    if let Err(e) = store.insert(&check).await {
        error!(error = %e, "Failed to persist status check");
        return problem_details::service_unavailable("status store is not ready").into_response();
    }

    Json(check).into_response()
}

/// GET /api/status
pub async fn list_status_checks(State(state): State<AppState>) -> Response {
    let Some(store) = state.status_store.as_ref() else {
        return problem_details::service_unavailable("status store is not ready").into_response();
    };

    match store.list_recent(STATUS_LIST_LIMIT).await {
        Ok(checks) => Json(checks).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list status checks");
            problem_details::service_unavailable("status store is not ready").into_response()
        }
    }
}
