//! Error types for registry, dispatch, and host-side loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the registry, the dispatcher, and the agent sources.
#[derive(Debug, Error)]
pub enum MicroagentError {
    /// Structurally invalid agent (blank id, no triggers, blank trigger phrase).
    #[error("Invalid agent: {0}")]
    InvalidAgent(String),

    /// An agent with this id is already registered.
    #[error("Duplicate agent id: {0}")]
    DuplicateAgent(String),

    /// No agent with this id is registered.
    #[error("Agent not found: {0}")]
    NotFound(String),

    /// Dispatch was called with an empty or whitespace-only prompt.
    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An agent file could not be read or parsed.
    #[error("Failed to load agent source {}: {message}", path.display())]
    SourceError { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MicroagentError {
    pub(crate) fn source_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        MicroagentError::SourceError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for MicroagentError {
    fn from(err: config::ConfigError) -> Self {
        MicroagentError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MicroagentError>;
