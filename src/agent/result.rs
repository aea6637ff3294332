//! The uniform outcome of one agent invocation.

use serde::Serialize;
use serde_json::{Map, Value};

/// Agent-specific metadata attached to a result.
pub type Metadata = Map<String, Value>;

const UNSPECIFIED_FAILURE: &str = "agent reported failure without a reason";

/// Outcome of one agent invocation.
///
/// Built only through [`AgentResult::success`] or [`AgentResult::failure`]:
/// a successful result never carries an error, and a failed one always has
/// empty content and a non-empty error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResult {
    success: bool,
    content: String,
    metadata: Metadata,
    error: Option<String>,
}

impl AgentResult {
    pub fn success(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            success: true,
            content: content.into(),
            metadata,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>, metadata: Metadata) -> Self {
        let error = error.into();
        let error = if error.trim().is_empty() {
            UNSPECIFIED_FAILURE.to_string()
        } else {
            error
        };

        Self {
            success: false,
            content: String::new(),
            metadata,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Split into `(content, metadata, error)`.
    pub fn into_parts(self) -> (String, Metadata, Option<String>) {
        (self.content, self.metadata, self.error)
    }
}
