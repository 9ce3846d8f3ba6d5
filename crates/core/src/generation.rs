//! Generator trait — the abstraction over text-generation backends.
//!
//! A Generator takes a plain-text prompt and returns plain text. Failures
//! (binary missing, non-zero exit, timeout) come back as a tagged
//! [`GenerationError`] rather than as magic strings; callers that want the
//! failure in a transcript render it explicitly with `to_string()`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Prefix carried by the rendered form of every [`GenerationError`].
pub const GENERATION_ERROR_MARKER: &str = "[GENERATION ERROR]";

/// A single generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The full prompt text
    pub prompt: String,

    /// Model override; `None` uses the generator's configured model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Timeout override; `None` uses the generator's configured timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The core Generator trait.
///
/// The orchestration layer only ever sees text in and text out; which model
/// or process produces it is the implementation's business.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this generator (e.g., "ollama-cli").
    fn name(&self) -> &str;

    /// Generate a response for the prompt.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<String, GenerationError>;

    /// Health check: is the backend reachable?
    async fn health_check(&self) -> std::result::Result<bool, GenerationError> {
        Ok(true)
    }
}
