//! Research agent: optional web search followed by a model-written summary.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use super::SEARCH_AGENT;
use super::base::Agent;
use super::error::AgentError;
use super::result::{AgentResult, Metadata};
use super::web_search::{WebResult, WebSearch, format_results};
use crate::config::AgentConfig;
use crate::llm::{ChatRequest, LLMError, LLMProvider, Message, ProviderRegistry, Role};

const SYSTEM_PROMPT: &str = "You are a research assistant. Summarize what is known about \
the user's topic. When web results are provided, ground the summary in them and cite \
sources by their number.";

const TOPIC_PREFIX: &str = "Search for information about: ";
const TOPIC_SUFFIX: &str = ". Provide a comprehensive summary with key findings.";

/// Prompt asking for a comprehensive summary of `topic`.
pub fn research_prompt(topic: &str) -> String {
    format!("{TOPIC_PREFIX}{topic}{TOPIC_SUFFIX}")
}

/// The bare topic of a [`research_prompt`]; other prompts are returned whole.
fn topic_of(prompt: &str) -> &str {
    prompt
        .strip_prefix(TOPIC_PREFIX)
        .and_then(|rest| rest.strip_suffix(TOPIC_SUFFIX))
        .unwrap_or(prompt)
}

/// Search-and-summarize agent. Stateless between calls.
pub struct SearchAgent {
    provider: Arc<dyn LLMProvider>,
    web: Option<WebSearch>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    results_per_search: u32,
}

impl SearchAgent {
    pub fn new(config: &AgentConfig, provider: Arc<dyn LLMProvider>, web: Option<WebSearch>) -> Self {
        Self {
            provider,
            web,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            results_per_search: config.search_results,
        }
    }

    pub fn from_registry(
        config: &AgentConfig,
        providers: &ProviderRegistry,
        web: Option<WebSearch>,
    ) -> Result<Self, AgentError> {
        let provider = providers
            .get(&config.provider, config.base_url.as_deref())
            .ok_or_else(|| AgentError::ProviderUnavailable(config.provider.to_string()))?;
        Ok(Self::new(config, provider, web))
    }
}

#[async_trait]
impl Agent for SearchAgent {
    fn agent_type(&self) -> &str {
        SEARCH_AGENT
    }

    fn capabilities(&self) -> Vec<String> {
        ["web_search", "summarization", "source_citation"]
            .map(String::from)
            .to_vec()
    }

    async fn execute(&self, prompt: &str, use_tools: bool) -> Result<AgentResult, AgentError> {
        let mut metadata = Metadata::new();
        metadata.insert("model".into(), json!(self.model));

        let mut sources: Vec<WebResult> = Vec::new();
        let mut tool_runs = 0u32;

        if use_tools && let Some(web) = &self.web {
            match web.search(topic_of(prompt), self.results_per_search).await {
                Ok(results) => {
                    tool_runs += 1;
                    sources = results;
                }
                Err(e) => {
                    warn!(error = %e, "Web search failed");
                    metadata.insert("tool_run_count".into(), json!(tool_runs));
                    return Ok(AgentResult::failure(format!("web search failed: {e}"), metadata));
                }
            }
        }

        metadata.insert("tool_run_count".into(), json!(tool_runs));
        metadata.insert("sources".into(), json!(sources));

        let user_content = if sources.is_empty() {
            prompt.to_string()
        } else {
            format!("Web results:\n{}\n{prompt}", format_results(&sources))
        };

        let request = ChatRequest::new(
            &self.model,
            vec![
                Message::new(Role::System, SYSTEM_PROMPT),
                Message::new(Role::User, user_content),
            ],
            self.temperature,
            self.max_tokens,
        );

        let response = match self.provider.chat(request).await {
            Ok(response) => response,
            Err(LLMError::Api { status, message }) => {
                return Ok(AgentResult::failure(
                    format!("model returned status {status}: {message}"),
                    metadata,
                ));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(usage) = &response.usage {
            metadata.insert("usage".into(), json!(usage));
        }

        match response.first_content() {
            Some(summary) => Ok(AgentResult::success(summary, metadata)),
            None => Ok(AgentResult::failure(LLMError::EmptyResponse.to_string(), metadata)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::llm::{ChatResponse, Choice};
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct EchoProvider {
        seen: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl LLMProvider for EchoProvider {
        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LLMError> {
            let user = request.messages.last().unwrap().content.clone();
            self.seen.lock().unwrap().push(user);
            Ok(ChatResponse {
                id: "r".to_string(),
                choices: vec![Choice {
                    index: 0,
                    message: Message::new(Role::Assistant, "summary"),
                    finish_reason: None,
                }],
                usage: None,
            })
        }
    }

    fn provider() -> Arc<EchoProvider> {
        Arc::new(EchoProvider {
            seen: StdMutex::new(Vec::new()),
        })
    }

    async fn brave_stub(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "web": {"results": [
                    {"title": "A", "url": "https://a.example"},
                    {"title": "B", "url": "https://b.example", "description": "bee"}
                ]}
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn without_tools_skips_search() {
        let server = brave_stub(200).await;
        let llm = provider();
        let web = WebSearch::new(reqwest::Client::new(), "k", server.uri());
        let agent = SearchAgent::new(&AgentConfig::default(), llm.clone(), Some(web));

        let result = agent.execute("rust async", false).await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.metadata()["tool_run_count"], 0);
        assert_eq!(llm.seen.lock().unwrap()[0], "rust async");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn with_tools_feeds_results_to_model() {
        let server = brave_stub(200).await;
        let llm = provider();
        let web = WebSearch::new(reqwest::Client::new(), "k", server.uri());
        let agent = SearchAgent::new(&AgentConfig::default(), llm.clone(), Some(web));

        let result = agent.execute("rust async", true).await.unwrap();
        assert_eq!(result.content(), "summary");
        assert_eq!(result.metadata()["tool_run_count"], 1);
        assert_eq!(result.metadata()["sources"].as_array().unwrap().len(), 2);
        assert!(llm.seen.lock().unwrap()[0].contains("https://b.example"));
    }

    #[tokio::test]
    async fn web_query_is_the_bare_topic() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "rust async"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "web": {"results": [{"title": "A", "url": "https://a.example"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let llm = provider();
        let web = WebSearch::new(reqwest::Client::new(), "k", server.uri());
        let agent = SearchAgent::new(&AgentConfig::default(), llm.clone(), Some(web));

        let result = agent.execute(&research_prompt("rust async"), true).await.unwrap();
        assert_eq!(result.metadata()["tool_run_count"], 1);
        assert!(llm.seen.lock().unwrap()[0].contains("comprehensive summary"));
    }

    #[test]
    fn topic_of_plain_prompt_is_unchanged() {
        assert_eq!(topic_of(&research_prompt("tides")), "tides");
        assert_eq!(topic_of("what is rust"), "what is rust");
    }

    #[tokio::test]
    async fn search_failure_is_structured_failure() {
        let server = brave_stub(500).await;
        let web = WebSearch::new(reqwest::Client::new(), "k", server.uri());
        let agent = SearchAgent::new(&AgentConfig::default(), provider(), Some(web));

        let result = agent.execute("q", true).await.unwrap();
        assert!(!result.is_success());
        assert!(result.error().unwrap().starts_with("web search failed"));
    }

    #[tokio::test]
    async fn tools_without_backend_still_answers() {
        let agent = SearchAgent::new(&AgentConfig::default(), provider(), None);
        let result = agent.execute("q", true).await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.metadata()["tool_run_count"], 0);
    }
}
