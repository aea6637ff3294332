//! Common test utilities.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use agentgate::agent::{
    Agent, AgentError, AgentRegistry, AgentResult, CHAT_AGENT, Metadata, SEARCH_AGENT,
    SharedAgent,
};
use agentgate::config::AgentConfig;
use agentgate::dispatch::Dispatcher;
use agentgate::market::MarketClient;
use agentgate::server::{self, AppState};
use agentgate::store::StatusCheckStore;
use agentgate::store::file::FileStatusStore;

/// What a [`StubAgent`] does when executed.
#[derive(Clone)]
pub enum Reply {
    Success(String, Metadata),
    Failure(String),
    Fault(String),
}

/// Agent with a canned reply and fixed capabilities.
pub struct StubAgent {
    reply: Reply,
    capabilities: Vec<String>,
}

impl StubAgent {
    pub fn shared(reply: Reply, capabilities: &[&str]) -> SharedAgent {
        Arc::new(Self {
            reply,
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        })
    }
}

#[async_trait]
impl Agent for StubAgent {
    fn agent_type(&self) -> &str {
        "stub"
    }

    fn capabilities(&self) -> Vec<String> {
        self.capabilities.clone()
    }

    async fn execute(&self, _prompt: &str, _use_tools: bool) -> Result<AgentResult, AgentError> {
        match &self.reply {
            Reply::Success(content, metadata) => {
                Ok(AgentResult::success(content.clone(), metadata.clone()))
            }
            Reply::Failure(reason) => Ok(AgentResult::failure(reason.clone(), Metadata::new())),
            Reply::Fault(reason) => Err(AgentError::Other(reason.clone())),
        }
    }
}

/// Registry whose `chat` and `search` constructors count their calls.
pub fn stub_registry(chat: Reply, search: Reply, constructed: Arc<AtomicUsize>) -> AgentRegistry {
    let chat_count = constructed.clone();
    let search_count = constructed;
    AgentRegistry::new(AgentConfig::default())
        .register(CHAT_AGENT, move |_| {
            chat_count.fetch_add(1, Ordering::SeqCst);
            Ok(StubAgent::shared(chat.clone(), &["chat"]))
        })
        .register(SEARCH_AGENT, move |_| {
            search_count.fetch_add(1, Ordering::SeqCst);
            Ok(StubAgent::shared(search.clone(), &["web_search", "summarization"]))
        })
}

/// Create a test `AppState`.
///
/// The market client points at `market_url`; the status store lives in a
/// leaked temp dir when `with_store` is true.
pub fn test_app_state(registry: AgentRegistry, market_url: &str, with_store: bool) -> AppState {
    let status_store = with_store.then(|| {
        let tmp = tempfile::TempDir::new().unwrap();
        // Leak the TempDir so it doesn't get cleaned up during the test.
        let tmp = Box::leak(Box::new(tmp));
        Arc::new(FileStatusStore::new(tmp.path().join("test_db"))) as Arc<dyn StatusCheckStore>
    });

    AppState {
        dispatcher: Dispatcher::new(registry),
        market: MarketClient::with_client(reqwest::Client::new(), market_url),
        status_store,
    }
}

/// Create a test app with stub agents that always succeed.
pub fn test_app() -> Router {
    let registry = stub_registry(
        Reply::Success("hello".to_string(), Metadata::new()),
        Reply::Success("summary".to_string(), Metadata::new()),
        Arc::new(AtomicUsize::new(0)),
    );
    server::build_app(test_app_state(registry, "http://127.0.0.1:9", true), 300)
}

/// Send `request` and decode the JSON body.
pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}
