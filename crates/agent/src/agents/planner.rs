//! Planner agent — decomposes the request into ordered sub-tasks.

use std::sync::Arc;

use async_trait::async_trait;
use neuroqueue_core::agent::{Agent, AgentKind, RunOptions};
use neuroqueue_core::error::Error;
use neuroqueue_core::generation::Generator;
use neuroqueue_memory::SalienceMemory;

use super::generate_and_record;
use crate::prompt::{PLAN_TASK, build_prompt, with_task};

pub struct PlannerAgent {
    memory: Arc<SalienceMemory>,
    generator: Arc<dyn Generator>,
}

impl PlannerAgent {
    pub fn new(memory: Arc<SalienceMemory>, generator: Arc<dyn Generator>) -> Self {
        Self { memory, generator }
    }
}

#[async_trait]
impl Agent for PlannerAgent {
    fn name(&self) -> &str {
        "PlannerAgent"
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Plan
    }

    async fn run(&self, input: &str, _options: &RunOptions) -> Result<String, Error> {
        let context = self.memory.context_text().await;
        let prompt = with_task(build_prompt(self.name(), &context, "", input), PLAN_TASK);

        let generated =
            generate_and_record(self.generator.as_ref(), &self.memory, self.name(), prompt).await;
        Ok(generated.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedGenerator;
    use neuroqueue_core::error::GenerationError;
    use neuroqueue_core::generation::GENERATION_ERROR_MARKER;

    #[tokio::test]
    async fn prompt_carries_memory_and_plan_task() {
        let memory = Arc::new(SalienceMemory::new(5, true));
        memory.add_item("User", "visit Kyoto", None).await;
        let generator = Arc::new(ScriptedGenerator::new("1. book\n2. pack\n3. go"));
        let agent = PlannerAgent::new(memory.clone(), generator.clone());

        let out = agent.run("visit Kyoto", &RunOptions::default()).await.unwrap();

        assert_eq!(out, "1. book\n2. pack\n3. go");
        let prompt = &generator.prompts()[0];
        assert!(prompt.starts_with("[Agent: PlannerAgent]\n"));
        assert!(prompt.contains("--- FIFO Memory (oldest->newest) ---\nUser: visit Kyoto\n"));
        assert!(!prompt.contains("--- Extra Context ---"));
        assert!(prompt.ends_with(PLAN_TASK));

        let items = memory.items().await;
        assert_eq!(items.last().unwrap().role, "PlannerAgent");
    }

    #[tokio::test]
    async fn ignores_caller_docs() {
        let memory = Arc::new(SalienceMemory::new(5, true));
        let generator = Arc::new(ScriptedGenerator::new("plan"));
        let agent = PlannerAgent::new(memory, generator.clone());

        agent
            .run("x", &RunOptions::with_docs("secret reference"))
            .await
            .unwrap();

        assert!(!generator.prompts()[0].contains("secret reference"));
    }

    #[tokio::test]
    async fn generation_failure_is_returned_as_text() {
        let memory = Arc::new(SalienceMemory::new(5, true));
        let generator = Arc::new(ScriptedGenerator::failing(GenerationError::Timeout {
            secs: 300,
        }));
        let agent = PlannerAgent::new(memory.clone(), generator);

        let out = agent.run("x", &RunOptions::default()).await.unwrap();

        assert!(out.starts_with(GENERATION_ERROR_MARKER));
        assert_eq!(memory.items().await[0].text, out);
    }
}
