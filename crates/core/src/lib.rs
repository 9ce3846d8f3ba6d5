//! # NeuroQueue Core
//!
//! Domain types, traits, and error definitions for the NeuroQueue agent
//! orchestrator. This crate performs **no I/O**; it defines the contracts
//! that the other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here:
//! - [`Generator`] — opaque text-generation service (prompt in, text out)
//! - [`Retriever`] — opaque document search/store service
//! - [`Agent`] — a task executor driven by the controller
//!
//! Implementations live in their respective crates, which keeps the
//! orchestration engine testable with stub collaborators.

pub mod agent;
pub mod error;
pub mod generation;
pub mod retrieval;

// Re-export key types at crate root for ergonomics
pub use agent::{Agent, AgentKind, RunOptions};
pub use error::{Error, GenerationError, MemoryError, Result, RetrievalError};
pub use generation::{GENERATION_ERROR_MARKER, GenerationRequest, Generator};
pub use retrieval::{NewDocument, RetrievedDocument, Retriever};
