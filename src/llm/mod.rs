//! LLM provider client for chat completions.

mod error;
mod openai;
mod provider;
mod registry;
mod types;

pub use error::LLMError;
pub use openai::OpenAICompatibleProvider;
pub use provider::{LLMProvider, Provider};
pub use registry::ProviderRegistry;
pub use types::{ChatRequest, ChatResponse, Choice, Message, Role, Usage};
