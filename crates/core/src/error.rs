//! Error types for the NeuroQueue domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator boundary has its own error enum.

use thiserror::Error;

/// The top-level error type for all NeuroQueue operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Generation errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Agent errors ---
    #[error("Agent '{agent}' failed: {message}")]
    Agent { agent: String, message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Boundary errors ---

/// Failure of the text-generation collaborator.
///
/// Every variant renders with the [`crate::GENERATION_ERROR_MARKER`] prefix so the
/// text can be recorded in a transcript and still be recognisable.
/// Keep the literal prefixes below in sync with the constant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("[GENERATION ERROR] '{binary}' not found; install it and pull the model")]
    NotInstalled { binary: String },

    #[error("[GENERATION ERROR] exit code {code}\n{stderr}\n{stdout}")]
    ExitStatus {
        code: i32,
        stderr: String,
        stdout: String,
    },

    #[error("[GENERATION ERROR] timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("[GENERATION ERROR] {0}")]
    Io(String),
}

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Retrieval store unavailable: {0}")]
    Unavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Capacity must be at least 1 (got {0})")]
    InvalidCapacity(usize),

    #[error("Export failed: {0}")]
    Export(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GENERATION_ERROR_MARKER;

    #[test]
    fn generation_error_carries_marker() {
        let errors = [
            GenerationError::NotInstalled { binary: "ollama".into() },
            GenerationError::ExitStatus {
                code: 1,
                stderr: "model missing".into(),
                stdout: String::new(),
            },
            GenerationError::Timeout { secs: 300 },
            GenerationError::Io("broken pipe".into()),
        ];
        for err in errors {
            assert!(err.to_string().starts_with(GENERATION_ERROR_MARKER), "{err}");
        }
    }

    #[test]
    fn agent_error_displays_correctly() {
        let err = Error::Agent {
            agent: "AnalystAgent".into(),
            message: "store offline".into(),
        };
        assert!(err.to_string().contains("AnalystAgent"));
        assert!(err.to_string().contains("store offline"));
    }

    #[test]
    fn memory_error_wraps_into_top_level() {
        let err: Error = MemoryError::InvalidCapacity(0).into();
        assert!(matches!(err, Error::Memory(MemoryError::InvalidCapacity(0))));
    }
}
