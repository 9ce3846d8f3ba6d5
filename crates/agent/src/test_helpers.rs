//! Shared test doubles for agent and controller tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use neuroqueue_core::agent::{Agent, AgentKind, RunOptions};
use neuroqueue_core::error::{Error, GenerationError, RetrievalError};
use neuroqueue_core::generation::{GenerationRequest, Generator};
use neuroqueue_core::retrieval::{NewDocument, RetrievedDocument, Retriever};

type Reply = Result<String, GenerationError>;

/// A generator that answers by prompt content and records every prompt.
///
/// Rules are checked in insertion order; the first whose needle occurs in
/// the prompt wins, otherwise the fallback reply is used.
pub struct ScriptedGenerator {
    rules: Vec<(String, Reply)>,
    fallback: Reply,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(fallback: &str) -> Self {
        Self {
            rules: Vec::new(),
            fallback: Ok(fallback.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails with `err`.
    pub fn failing(err: GenerationError) -> Self {
        Self {
            fallback: Err(err),
            ..Self::new("")
        }
    }

    pub fn on(mut self, needle: &str, reply: &str) -> Self {
        self.rules.push((needle.to_string(), Ok(reply.to_string())));
        self
    }

    pub fn on_error(mut self, needle: &str, err: GenerationError) -> Self {
        self.rules.push((needle.to_string(), Err(err)));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());

        self.rules
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// A generator that must never be called.
pub struct PanickingGenerator;

#[async_trait]
impl Generator for PanickingGenerator {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        panic!("generator invoked unexpectedly with prompt: {}", request.prompt);
    }
}

/// An agent with a fixed answer and optional latency.
pub struct StaticAgent {
    pub name: String,
    pub output: String,
    pub delay: Option<Duration>,
}

impl StaticAgent {
    pub fn new(name: &str, output: &str) -> Self {
        Self {
            name: name.to_string(),
            output: output.to_string(),
            delay: None,
        }
    }

    pub fn slow(name: &str, output: &str, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(name, output)
        }
    }
}

#[async_trait]
impl Agent for StaticAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Synthesize
    }

    async fn run(&self, _input: &str, _options: &RunOptions) -> Result<String, Error> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.output.clone())
    }
}

/// An agent that always returns an error.
pub struct FailingAgent(pub &'static str);

#[async_trait]
impl Agent for FailingAgent {
    fn name(&self) -> &str {
        self.0
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Analyze
    }

    async fn run(&self, _input: &str, _options: &RunOptions) -> Result<String, Error> {
        Err(Error::Agent {
            agent: self.0.to_string(),
            message: "collaborator misconfigured".into(),
        })
    }
}

/// An agent that panics mid-run.
pub struct PanickingAgent(pub &'static str);

#[async_trait]
impl Agent for PanickingAgent {
    fn name(&self) -> &str {
        self.0
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Plan
    }

    async fn run(&self, _input: &str, _options: &RunOptions) -> Result<String, Error> {
        panic!("agent {} blew up", self.0);
    }
}

/// A retriever that is configured but broken.
pub struct BrokenRetriever;

#[async_trait]
impl Retriever for BrokenRetriever {
    fn name(&self) -> &str {
        "broken"
    }

    async fn search(&self, _query: &str, _top_k: usize) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        Err(RetrievalError::Unavailable("index missing".into()))
    }

    async fn add_documents(&self, _documents: Vec<NewDocument>) -> Result<(), RetrievalError> {
        Err(RetrievalError::Storage("read-only".into()))
    }

    async fn persist(&self) -> Result<(), RetrievalError> {
        Err(RetrievalError::Storage("read-only".into()))
    }
}
