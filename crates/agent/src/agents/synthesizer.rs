//! Synthesizer agent — final summary over everything in memory.

use std::sync::Arc;

use async_trait::async_trait;
use neuroqueue_core::agent::{Agent, AgentKind, RunOptions};
use neuroqueue_core::error::Error;
use neuroqueue_core::generation::Generator;
use neuroqueue_memory::SalienceMemory;

use super::generate_and_record;
use crate::prompt::{SYNTHESIZE_TASK, build_prompt, with_task};

pub struct SynthesizerAgent {
    memory: Arc<SalienceMemory>,
    generator: Arc<dyn Generator>,
}

impl SynthesizerAgent {
    pub fn new(memory: Arc<SalienceMemory>, generator: Arc<dyn Generator>) -> Self {
        Self { memory, generator }
    }
}

#[async_trait]
impl Agent for SynthesizerAgent {
    fn name(&self) -> &str {
        "SynthesizerAgent"
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Synthesize
    }

    async fn run(&self, input: &str, options: &RunOptions) -> Result<String, Error> {
        let context = self.memory.context_text().await;
        let prompt = with_task(
            build_prompt(self.name(), &context, &options.extra_context, input),
            SYNTHESIZE_TASK,
        );

        let generated =
            generate_and_record(self.generator.as_ref(), &self.memory, self.name(), prompt).await;
        Ok(generated.text)
    }
}
