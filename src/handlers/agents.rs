//! Chat, search and capability handlers.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::api::{CapabilitiesResponse, ChatRequest, SearchRequest, SearchResponse};
use crate::handlers::problem_details;
use crate::server::AppState;

/// POST /api/chat
///
/// An unknown `agent_type` is a 400; every other outcome is a 200 body.
pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    match state.dispatcher.handle_chat(&req.message, &req.agent_type).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => problem_details::bad_request(e.to_string()).into_response(),
    }
}

/// POST /api/search
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Json<SearchResponse> {
    Json(
        state
            .dispatcher
            .handle_search(&req.query, req.max_results)
            .await,
    )
}

/// GET /api/agents/capabilities
pub async fn capabilities(State(state): State<AppState>) -> Json<CapabilitiesResponse> {
    Json(state.dispatcher.list_capabilities().await)
}
