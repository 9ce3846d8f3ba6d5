//! Memory implementations for NeuroQueue.
//!
//! - [`SalienceMemory`] — the bounded working memory shared by the agents
//! - [`DocumentStore`] — a local [`Retriever`](neuroqueue_core::Retriever)
//!   used to augment the analyst's prompts

pub mod document_store;
pub mod salience;

pub use document_store::{DocumentStore, StoredDocument};
pub use salience::{MemoryEntry, NEUTRAL_SALIENCE, SalienceMemory, score_salience};
