//! Conversational agent backed by an OpenAI-compatible model.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use super::CHAT_AGENT;
use super::base::Agent;
use super::error::AgentError;
use super::result::{AgentResult, Metadata};
use crate::config::AgentConfig;
use crate::llm::{ChatRequest, LLMError, LLMProvider, Message, ProviderRegistry, Role};

const SYSTEM_PROMPT: &str = "You are a helpful, concise assistant. \
Answer directly and say so when you are unsure.";

/// General-purpose chat agent.
///
/// Keeps a rolling conversation history shared by every caller of this
/// instance. Concurrent requests interleave their turns in that history.
pub struct ChatAgent {
    provider: Arc<dyn LLMProvider>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    max_history: usize,
    history: Mutex<VecDeque<Message>>,
}

impl ChatAgent {
    pub fn new(config: &AgentConfig, provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_history: config.max_history,
            history: Mutex::new(VecDeque::new()),
        }
    }

    /// Build with the provider named in `config`.
    pub fn from_registry(
        config: &AgentConfig,
        providers: &ProviderRegistry,
    ) -> Result<Self, AgentError> {
        let provider = providers
            .get(&config.provider, config.base_url.as_deref())
            .ok_or_else(|| AgentError::ProviderUnavailable(config.provider.to_string()))?;
        Ok(Self::new(config, provider))
    }

    async fn remember(&self, user: Message, assistant: Message) -> usize {
        let mut history = self.history.lock().await;
        history.push_back(user);
        history.push_back(assistant);
        while history.len() > self.max_history {
            history.pop_front();
        }
        history.len()
    }
}

#[async_trait]
impl Agent for ChatAgent {
    fn agent_type(&self) -> &str {
        CHAT_AGENT
    }

    fn capabilities(&self) -> Vec<String> {
        ["conversation", "context_memory", "general_knowledge"]
            .map(String::from)
            .to_vec()
    }

    async fn execute(&self, prompt: &str, _use_tools: bool) -> Result<AgentResult, AgentError> {
        let user = Message::new(Role::User, prompt);

        let mut messages = vec![Message::new(Role::System, SYSTEM_PROMPT)];
        messages.extend(self.history.lock().await.iter().cloned());
        messages.push(user.clone());

        let request = ChatRequest::new(&self.model, messages, self.temperature, self.max_tokens);

        let mut metadata = Metadata::new();
        metadata.insert("model".into(), json!(self.model));
        metadata.insert("tools_used".into(), json!(0));

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

        let Some(content) = response.first_content().map(str::to_string) else {
            return Ok(AgentResult::failure(
                LLMError::EmptyResponse.to_string(),
                metadata,
            ));
        };

        let length = self
            .remember(user, Message::new(Role::Assistant, content.clone()))
            .await;
        metadata.insert("conversation_length".into(), json!(length));
        if let Some(usage) = response.usage {
            metadata.insert("usage".into(), json!(usage));
        }

        Ok(AgentResult::success(content, metadata))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::llm::{ChatResponse, Choice, Usage};

    /// Records requests and answers with a fixed reply or error status.
    struct ScriptedProvider {
        reply: Result<&'static str, u16>,
        seen: StdMutex<Vec<Vec<Message>>>,
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LLMError> {
            self.seen.lock().unwrap().push(request.messages);
            match self.reply {
                Ok(text) => Ok(ChatResponse {
                    id: "r".to_string(),
                    choices: vec![Choice {
                        index: 0,
                        message: Message::new(Role::Assistant, text),
                        finish_reason: Some("stop".to_string()),
                    }],
                    usage: Some(Usage {
                        prompt_tokens: 3,
                        completion_tokens: 1,
                        total_tokens: 4,
                    }),
                }),
                Err(status) => Err(LLMError::Api {
                    status,
                    message: "nope".to_string(),
                }),
            }
        }
    }

    fn agent(reply: Result<&'static str, u16>, max_history: usize) -> (ChatAgent, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider {
            reply,
            seen: StdMutex::new(Vec::new()),
        });
        let config = AgentConfig {
            max_history,
            ..AgentConfig::default()
        };
        (ChatAgent::new(&config, provider.clone()), provider)
    }

    #[tokio::test]
    async fn success_carries_model_metadata() {
        let (agent, _) = agent(Ok("hello"), 20);
        let result = agent.execute("hi", false).await.unwrap();

        assert!(result.is_success());
        assert_eq!(result.content(), "hello");
        assert_eq!(result.metadata()["tools_used"], 0);
        assert_eq!(result.metadata()["conversation_length"], 2);
        assert_eq!(result.metadata()["usage"]["total_tokens"], 4);
    }

    #[tokio::test]
    async fn history_is_replayed_and_bounded() {
        let (agent, provider) = agent(Ok("ok"), 2);
        agent.execute("first", false).await.unwrap();
        agent.execute("second", false).await.unwrap();

        let seen = provider.seen.lock().unwrap();
        // system + previous turn (2) + new user message
        assert_eq!(seen[1].len(), 4);
        assert_eq!(seen[1][1].content, "first");
        drop(seen);

        assert_eq!(agent.history.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn api_error_is_structured_failure() {
        let (agent, _) = agent(Err(503), 20);
        let result = agent.execute("hi", false).await.unwrap();

        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("503"));
        assert!(agent.history.lock().await.is_empty());
    }

    #[test]
    fn missing_credentials_fail_construction() {
        let err = ChatAgent::from_registry(&AgentConfig::default(), &ProviderRegistry::new())
            .err()
            .unwrap();
        assert!(matches!(err, AgentError::ProviderUnavailable(p) if p == "openrouter"));
    }
}
