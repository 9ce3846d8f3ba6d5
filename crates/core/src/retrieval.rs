//! Retriever trait — document search used to augment agent prompts.
//!
//! The orchestrator only consumes the search/add/persist contract; ranking,
//! storage, and any embedding machinery belong to the implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// A ranked search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// The document text
    pub content: String,

    /// Relevance score (higher is better)
    #[serde(default)]
    pub score: f32,

    /// Who produced the document (agent name, "user", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Where it came from (file path, "agent_output", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A document handed to the store for indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    pub content: String,
    pub role: String,
    pub source: String,
}

impl NewDocument {
    pub fn new(
        content: impl Into<String>,
        role: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            role: role.into(),
            source: source.into(),
        }
    }
}

/// The core Retriever trait.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// The store name (e.g., "document_store").
    fn name(&self) -> &str;

    /// Return at most `top_k` documents, best first.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<RetrievedDocument>, RetrievalError>;

    /// Index new documents.
    async fn add_documents(
        &self,
        documents: Vec<NewDocument>,
    ) -> std::result::Result<(), RetrievalError>;

    /// Flush the store to durable storage.
    async fn persist(&self) -> std::result::Result<(), RetrievalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieved_document_deserializes_without_optional_fields() {
        let doc: RetrievedDocument =
            serde_json::from_str(r#"{"content":"Rust has no GC"}"#).unwrap();
        assert_eq!(doc.content, "Rust has no GC");
        assert_eq!(doc.score, 0.0);
        assert!(doc.role.is_none());
    }

    #[test]
    fn new_document_builder() {
        let doc = NewDocument::new("finding", "AnalystAgent", "agent_output");
        assert_eq!(doc.role, "AnalystAgent");
        assert_eq!(doc.source, "agent_output");
    }
}
