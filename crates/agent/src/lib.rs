//! Agents and the workflow controller.
//!
//! A [`Controller`] owns the shared [`SalienceMemory`](neuroqueue_memory::SalienceMemory)
//! and an ordered list of agents. It runs them one after another, or all at
//! once followed by a consensus step:
//!
//! 1. **Capture** the input into memory
//! 2. **Plan** the request as ordered sub-tasks
//! 3. **Analyze** it, with retrieved documents when a store is configured
//! 4. **Synthesize** a final summary

pub mod agents;
pub mod controller;
pub mod prompt;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use agents::{
    AnalystAgent, CaptureAgent, DEFAULT_TOP_K, PlannerAgent, SynthesizerAgent, default_agents,
};
pub use controller::{
    AGENT_ERROR_MARKER, AgentOutput, CONSENSUS_ROLE, CONSENSUS_SALIENCE, Controller,
    ExecutionMode, WorkflowResult,
};
