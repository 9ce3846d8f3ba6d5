//! Document store — local retrieval collaborator with JSON-lines persistence.
//!
//! Documents are scored by keyword overlap with the query: the fraction of
//! distinct query terms that occur in the document. No embeddings are
//! computed. Each line of the backing file is one JSON-encoded
//! `StoredDocument`.
//!
//! The CLI keeps its store at `~/.neuroqueue/documents.jsonl` unless
//! `retrieval.persist_path` says otherwise.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use neuroqueue_core::error::RetrievalError;
use neuroqueue_core::retrieval::{NewDocument, RetrievedDocument, Retriever};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// A document as kept on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub content: String,
    pub role: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// Keyword-scored document store, optionally backed by a JSONL file.
///
/// Documents are loaded on creation and only written back on
/// [`Retriever::persist`].
pub struct DocumentStore {
    path: Option<PathBuf>,
    documents: RwLock<Vec<StoredDocument>>,
}

impl DocumentStore {
    /// A store that lives only in process memory.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            documents: RwLock::new(Vec::new()),
        }
    }

    /// Open a store backed by `path`.
    ///
    /// If the file exists, documents are loaded from it; otherwise the store
    /// starts empty and the file is created on the first `persist`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RetrievalError> {
        let path = path.into();
        let documents = Self::load_from_disk(&path)?;
        debug!(path = %path.display(), count = documents.len(), "Document store loaded");
        Ok(Self {
            path: Some(path),
            documents: RwLock::new(documents),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Remove every document, including the backing file.
    pub async fn clear(&self) -> Result<(), RetrievalError> {
        self.documents.write().await.clear();
        if let Some(path) = &self.path {
            if path.exists() {
                std::fs::remove_file(path).map_err(|e| {
                    RetrievalError::Storage(format!("Failed to remove {}: {e}", path.display()))
                })?;
            }
        }
        Ok(())
    }

    fn load_from_disk(path: &Path) -> Result<Vec<StoredDocument>, RetrievalError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(RetrievalError::Unavailable(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<StoredDocument>(line) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted document line");
                    None
                }
            })
            .collect())
    }
}

/// Lower-cased alphanumeric terms of `text`, deduplicated.
fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl Retriever for DocumentStore {
    fn name(&self) -> &str {
        "document_store"
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        let query_terms = terms(query);
        if query_terms.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let documents = self.documents.read().await;
        let mut results: Vec<RetrievedDocument> = documents
            .iter()
            .filter_map(|doc| {
                let doc_terms = terms(&doc.content);
                let hits = query_terms.iter().filter(|t| doc_terms.contains(*t)).count();
                if hits == 0 {
                    return None;
                }
                Some(RetrievedDocument {
                    content: doc.content.clone(),
                    score: hits as f32 / query_terms.len() as f32,
                    role: Some(doc.role.clone()),
                    source: Some(doc.source.clone()),
                })
            })
            .collect();

        // Stable: equal scores keep insertion order.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);
        Ok(results)
    }

    async fn add_documents(&self, new_documents: Vec<NewDocument>) -> Result<(), RetrievalError> {
        let mut documents = self.documents.write().await;
        for doc in new_documents {
            documents.push(StoredDocument {
                id: Uuid::new_v4().to_string(),
                content: doc.content,
                role: doc.role,
                source: doc.source,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn persist(&self) -> Result<(), RetrievalError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let documents = self.documents.read().await;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RetrievalError::Storage(format!("Failed to create store directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for doc in documents.iter() {
            let line = serde_json::to_string(doc).map_err(|e| {
                RetrievalError::Storage(format!("Failed to serialize document: {e}"))
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(path, &content)
            .map_err(|e| RetrievalError::Storage(format!("Failed to write store file: {e}")))?;

        debug!(path = %path.display(), count = documents.len(), "Document store persisted");
        Ok(())
    }
}
