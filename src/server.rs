use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::dispatch::Dispatcher;
use crate::handlers;
use crate::market::MarketClient;
use crate::store::StatusCheckStore;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub market: MarketClient,
    /// `None` until a store is available; status routes answer 503 meanwhile.
    pub status_store: Option<Arc<dyn StatusCheckStore>>,
}

// ============================================================================
// Server Setup
// ============================================================================

pub fn build_app(state: AppState, request_timeout_seconds: u64) -> Router {
    let api_routes = Router::new()
        .route("/", get(handlers::root))
        .route(
            "/status",
            get(handlers::list_status_checks).post(handlers::create_status_check),
        )
        .route("/chat", post(handlers::chat))
        .route("/search", post(handlers::search))
        .route("/agents/capabilities", get(handlers::capabilities))
        .route("/vaults", get(handlers::list_vaults))
        .route("/vaults/{address}", get(handlers::get_vault))
        .with_state(state.clone())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_seconds),
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/version", get(handlers::version))
        // Nesting only matches `/api`; the greeting also answers with the slash.
        .route("/api/", get(handlers::root))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
