//! Capture agent — records the user's input verbatim.

use std::sync::Arc;

use async_trait::async_trait;
use neuroqueue_core::agent::{Agent, AgentKind, RunOptions};
use neuroqueue_core::error::Error;
use neuroqueue_memory::SalienceMemory;

use crate::prompt::truncate_chars;

/// Memory role under which captured input is stored.
pub const USER_ROLE: &str = "User";

const ECHO_CHARS: usize = 200;

/// Stores the input in shared memory; never calls the generator.
pub struct CaptureAgent {
    memory: Arc<SalienceMemory>,
}

impl CaptureAgent {
    pub fn new(memory: Arc<SalienceMemory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Agent for CaptureAgent {
    fn name(&self) -> &str {
        "CaptureAgent"
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Capture
    }

    async fn run(&self, input: &str, _options: &RunOptions) -> Result<String, Error> {
        self.memory.add_item(USER_ROLE, input, None).await;
        Ok(format!("Captured: {}", truncate_chars(input, ECHO_CHARS)))
    }
}
