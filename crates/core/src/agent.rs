//! Agent contract shared by every pipeline stage.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which responsibility an agent carries.
///
/// Informational only: the controller hands every agent the same
/// [`RunOptions`] and never branches on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Records the raw input into shared memory
    Capture,
    /// Decomposes the input into ordered sub-tasks
    Plan,
    /// Extracts insights, optionally retrieval-augmented
    Analyze,
    /// Produces the final summary
    Synthesize,
}

/// Per-run options passed uniformly to every agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOptions {
    /// Caller-supplied reference documents
    #[serde(default)]
    pub docs: String,

    /// Additional free-form context for the prompt
    #[serde(default)]
    pub extra_context: String,
}

impl RunOptions {
    pub fn with_docs(docs: impl Into<String>) -> Self {
        Self {
            docs: docs.into(),
            extra_context: String::new(),
        }
    }
}

/// A task executor in the pipeline.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Name used as the memory role and the output key.
    fn name(&self) -> &str;

    fn kind(&self) -> AgentKind;

    /// Run the agent on `input`.
    ///
    /// Generation failures are not errors at this level: they are rendered
    /// into the returned text. `Err` is reserved for failures of the agent
    /// itself or of a collaborator it cannot work around.
    async fn run(&self, input: &str, options: &RunOptions) -> Result<String, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_options_default_is_empty() {
        let opts = RunOptions::default();
        assert!(opts.docs.is_empty());
        assert!(opts.extra_context.is_empty());
    }

    #[test]
    fn agent_kind_serializes_snake_case() {
        let json = serde_json::to_string(&AgentKind::Synthesize).unwrap();
        assert_eq!(json, "\"synthesize\"");
    }
}
