//! The pipeline agents.
//!
//! 1. **Capture** — records the raw input into shared memory
//! 2. **Planner** — decomposes the request into three ordered sub-tasks
//! 3. **Analyst** — extracts insights, augmented by a retriever if present
//! 4. **Synthesizer** — writes the final summary
//!
//! All but Capture go through the generator and record what it returned,
//! failure text included, so the transcript shows what happened.

pub mod analyst;
pub mod capture;
pub mod planner;
pub mod synthesizer;

pub use analyst::AnalystAgent;
pub use capture::CaptureAgent;
pub use planner::PlannerAgent;
pub use synthesizer::SynthesizerAgent;

use std::sync::Arc;

use neuroqueue_core::agent::Agent;
use neuroqueue_core::generation::{GenerationRequest, Generator};
use neuroqueue_core::retrieval::Retriever;
use neuroqueue_memory::SalienceMemory;
use tracing::warn;

/// Number of documents the analyst retrieves per query by default.
pub const DEFAULT_TOP_K: usize = 3;

/// The standard four-stage pipeline, in execution order.
pub fn default_agents(
    memory: Arc<SalienceMemory>,
    generator: Arc<dyn Generator>,
    retriever: Option<Arc<dyn Retriever>>,
    top_k: usize,
) -> Vec<Arc<dyn Agent>> {
    let mut analyst = AnalystAgent::new(memory.clone(), generator.clone()).with_top_k(top_k);
    if let Some(retriever) = retriever {
        analyst = analyst.with_retriever(retriever);
    }

    vec![
        Arc::new(CaptureAgent::new(memory.clone())),
        Arc::new(PlannerAgent::new(memory.clone(), generator.clone())),
        Arc::new(analyst),
        Arc::new(SynthesizerAgent::new(memory, generator)),
    ]
}

/// Text produced by one generation call.
pub(crate) struct Generated {
    pub text: String,
    pub succeeded: bool,
}

/// Run `prompt` through the generator and record the result under
/// `agent_name`. Failures are rendered into the recorded text.
pub(crate) async fn generate_and_record(
    generator: &dyn Generator,
    memory: &SalienceMemory,
    agent_name: &str,
    prompt: String,
) -> Generated {
    let generated = match generator.generate(GenerationRequest::new(prompt)).await {
        Ok(text) => Generated {
            text,
            succeeded: true,
        },
        Err(e) => {
            warn!(agent = agent_name, error = %e, "Generation failed; recording failure text");
            Generated {
                text: e.to_string(),
                succeeded: false,
            }
        }
    };

    memory.add_item(agent_name, &generated.text, None).await;
    generated
}
