//! Workflow controller — drives the agents over shared memory.
//!
//! # Modes
//!
//! ```text
//! Sequential:  Capture ─▶ Planner ─▶ Analyst ─▶ Synthesizer
//!              (each agent sees every earlier agent's memory writes)
//!
//! Parallel:    ┌▶ Capture ─────┐
//!              ├▶ Planner ─────┤
//!   input ─────┤               ├─▶ outputs (completion order) ─▶ consensus
//!              ├▶ Analyst ─────┤
//!              └▶ Synthesizer ─┘
//! ```
//!
//! A failing or panicking agent never aborts the workflow: its slot in the
//! result carries an `[ERROR] ...` text instead.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use neuroqueue_core::agent::{Agent, RunOptions};
use neuroqueue_core::error::Error;
use neuroqueue_core::generation::{GenerationRequest, Generator};
use neuroqueue_core::retrieval::Retriever;
use neuroqueue_memory::SalienceMemory;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::agents::{DEFAULT_TOP_K, default_agents};
use crate::prompt::consensus_prompt;

/// Memory role for consensus entries.
pub const CONSENSUS_ROLE: &str = "Consensus";

/// Salience given to consensus entries so they outlive ordinary turns.
pub const CONSENSUS_SALIENCE: f32 = 0.9;

/// Prefix of the text recorded for an agent that failed.
pub const AGENT_ERROR_MARKER: &str = "[ERROR]";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

impl std::str::FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(Self::Sequential),
            "parallel" | "par" => Ok(Self::Parallel),
            other => Err(format!("unknown mode '{other}' (expected sequential or parallel)")),
        }
    }
}

/// One agent's contribution to a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutput {
    pub agent: String,
    pub output: String,
}

impl AgentOutput {
    pub fn new(agent: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            output: output.into(),
        }
    }
}

/// Result of one `run_workflow` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub user_input: String,
    /// List order in sequential mode, completion order in parallel mode.
    pub agent_outputs: Vec<AgentOutput>,
    /// Only produced in parallel mode.
    pub consensus: Option<String>,
    /// Pretty-printed JSON snapshot of shared memory after the run.
    pub memory: String,
}

impl WorkflowResult {
    /// Output of the agent called `agent`, if it ran.
    pub fn output(&self, agent: &str) -> Option<&str> {
        self.agent_outputs
            .iter()
            .find(|o| o.agent == agent)
            .map(|o| o.output.as_str())
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.agent_outputs.iter().map(|o| o.agent.as_str()).collect()
    }
}

pub struct Controller {
    memory: Arc<SalienceMemory>,
    generator: Arc<dyn Generator>,
    agents: Vec<Arc<dyn Agent>>,
    mode: ExecutionMode,
}

impl Controller {
    pub fn new(
        memory: Arc<SalienceMemory>,
        generator: Arc<dyn Generator>,
        agents: Vec<Arc<dyn Agent>>,
    ) -> Self {
        Self {
            memory,
            generator,
            agents,
            mode: ExecutionMode::default(),
        }
    }

    /// Controller over the standard Capture, Planner, Analyst, Synthesizer
    /// pipeline.
    pub fn with_default_agents(
        memory: Arc<SalienceMemory>,
        generator: Arc<dyn Generator>,
        retriever: Option<Arc<dyn Retriever>>,
    ) -> Self {
        let agents = default_agents(memory.clone(), generator.clone(), retriever, DEFAULT_TOP_K);
        Self::new(memory, generator, agents)
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn set_mode(&mut self, mode: ExecutionMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn memory(&self) -> &Arc<SalienceMemory> {
        &self.memory
    }

    pub fn agents(&self) -> &[Arc<dyn Agent>] {
        &self.agents
    }

    /// Run one agent, converting an error or a panic into `[ERROR] ...` text.
    pub async fn run_agent_isolated(agent: &dyn Agent, input: &str, options: &RunOptions) -> String {
        match AssertUnwindSafe(agent.run(input, options)).catch_unwind().await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(agent = agent.name(), error = %e, "Agent failed; continuing workflow");
                format!("{AGENT_ERROR_MARKER} {e}")
            }
            Err(payload) => {
                let reason = panic_reason(payload.as_ref());
                warn!(agent = agent.name(), %reason, "Agent panicked; continuing workflow");
                format!("{AGENT_ERROR_MARKER} agent panicked: {reason}")
            }
        }
    }

    /// Run every agent on `input`, passing `docs` through to them.
    pub async fn run_workflow(&self, input: &str, docs: &str) -> Result<WorkflowResult, Error> {
        self.run_workflow_with(input, RunOptions::with_docs(docs)).await
    }

    pub async fn run_workflow_with(
        &self,
        input: &str,
        options: RunOptions,
    ) -> Result<WorkflowResult, Error> {
        info!(mode = %self.mode, agents = self.agents.len(), "Workflow started");

        let (agent_outputs, consensus) = match self.mode {
            ExecutionMode::Sequential => (self.run_sequential(input, &options).await, None),
            ExecutionMode::Parallel => {
                let outputs = self.run_parallel(input, &options).await;
                let consensus = if outputs.len() >= 2 {
                    self.consensus(&outputs).await
                } else {
                    None
                };
                (outputs, consensus)
            }
        };

        let memory = self.memory.export().await?;
        info!(
            mode = %self.mode,
            outputs = agent_outputs.len(),
            consensus = consensus.is_some(),
            "Workflow finished"
        );

        Ok(WorkflowResult {
            user_input: input.to_string(),
            agent_outputs,
            consensus,
            memory,
        })
    }

    async fn run_sequential(&self, input: &str, options: &RunOptions) -> Vec<AgentOutput> {
        let mut outputs = Vec::with_capacity(self.agents.len());
        for agent in &self.agents {
            let output = Self::run_agent_isolated(agent.as_ref(), input, options).await;
            debug!(agent = agent.name(), chars = output.len(), "Agent finished");
            outputs.push(AgentOutput::new(agent.name(), output));
        }
        outputs
    }

    async fn run_parallel(&self, input: &str, options: &RunOptions) -> Vec<AgentOutput> {
        let mut tasks = FuturesUnordered::new();
        for agent in &self.agents {
            let name = agent.name().to_string();
            let agent = agent.clone();
            let input = input.to_string();
            let options = options.clone();
            let handle = tokio::spawn(async move {
                Self::run_agent_isolated(agent.as_ref(), &input, &options).await
            });
            tasks.push(async move { (name, handle.await) });
        }

        let mut outputs = Vec::with_capacity(self.agents.len());
        while let Some((name, joined)) = tasks.next().await {
            let output = match joined {
                Ok(output) => output,
                Err(e) => {
                    warn!(agent = %name, error = %e, "Agent task aborted");
                    format!("{AGENT_ERROR_MARKER} agent task failed: {e}")
                }
            };
            debug!(agent = %name, chars = output.len(), "Agent finished");
            outputs.push(AgentOutput::new(name, output));
        }
        outputs
    }

    /// Reconcile `outputs` into one text and record it in memory.
    ///
    /// Identical outputs are returned as-is without a generator call. When
    /// the generator fails or returns nothing, the first output is used.
    pub async fn consensus(&self, outputs: &[AgentOutput]) -> Option<String> {
        let text = match outputs {
            [] => return None,
            [only] => only.output.clone(),
            [first, rest @ ..] if rest.iter().all(|o| o.output == first.output) => {
                debug!("Agents agree; skipping consensus generation");
                first.output.clone()
            }
            [first, ..] => {
                let request = GenerationRequest::new(consensus_prompt(outputs));
                match self.generator.generate(request).await {
                    Ok(text) if !text.trim().is_empty() => text,
                    Ok(_) => {
                        warn!(fallback = %first.agent, "Consensus was empty; using first output");
                        first.output.clone()
                    }
                    Err(e) => {
                        warn!(fallback = %first.agent, error = %e, "Consensus failed; using first output");
                        first.output.clone()
                    }
                }
            }
        };

        let text = non_empty(text)?;
        self.memory
            .add_item(CONSENSUS_ROLE, &text, Some(CONSENSUS_SALIENCE))
            .await;
        Some(text)
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".into()
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() { None } else { Some(text) }
}
