//! Agent source port.

use crate::agent::domain::AgentSpec;
use crate::error::Result;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a loaded agent came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOrigin {
    /// Compiled into the binary
    Builtin,
    /// Read from a file
    File(PathBuf),
}

impl fmt::Display for AgentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentOrigin::Builtin => write!(f, "builtin"),
            AgentOrigin::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedAgent {
    pub spec: AgentSpec,
    pub origin: AgentOrigin,
}

/// A producer of agent specs, e.g. a directory of markdown files.
pub trait AgentSource: Send + Sync {
    /// Short label used in logs and validation output.
    fn name(&self) -> &str;

    /// Per-entry outcomes. The outer error means the source as a whole could
    /// not be read; inner errors are individual broken entries.
    fn entries(&self) -> Result<Vec<Result<LoadedAgent>>>;

    /// Directory to watch for changes, if the source is file backed.
    fn watch_root(&self) -> Option<&Path> {
        None
    }

    /// Load every valid entry, skipping broken ones with a warning.
    fn load(&self) -> Result<Vec<LoadedAgent>> {
        let mut loaded = Vec::new();
        for entry in self.entries()? {
            match entry {
                Ok(agent) => loaded.push(agent),
                Err(e) => {
                    tracing::warn!(source = self.name(), "Skipping agent: {}", e);
                }
            }
        }
        Ok(loaded)
    }
}
