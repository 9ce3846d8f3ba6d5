//! Analyst agent — retrieval-augmented insight extraction.
//!
//! # Flow
//!
//! 1. Start from the caller's `docs`
//! 2. If a retriever is configured, append the top-k hits as ranked excerpts
//! 3. Generate insights and record them in shared memory
//! 4. On success, write the insights back into the retriever and persist it

use std::sync::Arc;

use async_trait::async_trait;
use neuroqueue_core::agent::{Agent, AgentKind, RunOptions};
use neuroqueue_core::error::Error;
use neuroqueue_core::generation::Generator;
use neuroqueue_core::retrieval::{NewDocument, Retriever};
use neuroqueue_memory::SalienceMemory;
use tracing::{debug, warn};

use super::{DEFAULT_TOP_K, generate_and_record};
use crate::prompt::{ANALYZE_TASK, build_prompt, retrieved_block, with_task};

/// Source tag for documents the analyst writes back.
pub const AGENT_OUTPUT_SOURCE: &str = "agent_output";

pub struct AnalystAgent {
    memory: Arc<SalienceMemory>,
    generator: Arc<dyn Generator>,
    retriever: Option<Arc<dyn Retriever>>,
    top_k: usize,
}

impl AnalystAgent {
    pub fn new(memory: Arc<SalienceMemory>, generator: Arc<dyn Generator>) -> Self {
        Self {
            memory,
            generator,
            retriever: None,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Caller docs followed by any retrieved excerpts.
    ///
    /// A failing search is logged and skipped; the analysis proceeds
    /// without retrieved context.
    async fn gather_context(&self, input: &str, docs: &str) -> String {
        let Some(retriever) = &self.retriever else {
            return docs.to_string();
        };

        let hits = match retriever.search(input, self.top_k).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(retriever = retriever.name(), error = %e, "Retrieval failed; continuing without it");
                return docs.to_string();
            }
        };
        debug!(hits = hits.len(), "Analyst retrieved documents");

        if hits.is_empty() {
            return docs.to_string();
        }
        let block = retrieved_block(&hits);
        if docs.is_empty() {
            block
        } else {
            format!("{docs}\n{block}")
        }
    }
}

#[async_trait]
impl Agent for AnalystAgent {
    fn name(&self) -> &str {
        "AnalystAgent"
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Analyze
    }

    async fn run(&self, input: &str, options: &RunOptions) -> Result<String, Error> {
        let extra = self.gather_context(input, &options.docs).await;
        let context = self.memory.context_text().await;
        let prompt = with_task(build_prompt(self.name(), &context, &extra, input), ANALYZE_TASK);

        let generated =
            generate_and_record(self.generator.as_ref(), &self.memory, self.name(), prompt).await;

        if let Some(retriever) = &self.retriever {
            if generated.succeeded && !generated.text.is_empty() {
                retriever
                    .add_documents(vec![NewDocument::new(
                        generated.text.clone(),
                        self.name(),
                        AGENT_OUTPUT_SOURCE,
                    )])
                    .await?;
                retriever.persist().await?;
            }
        }

        Ok(generated.text)
    }
}
