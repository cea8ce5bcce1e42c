//! Configuration
//!
//! Layered configuration for sources, dispatch rendering, watching, and
//! logging. Precedence, lowest first: built-in defaults, global file
//! (`$XDG_CONFIG_HOME/microagents/config.toml`), workspace file
//! (`.microagents/config.toml`), `MICROAGENTS__*` environment variables.

mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MicroagentsConfig {
    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which agent sources feed the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Load the agents compiled into the binary
    #[serde(default = "default_true")]
    pub include_builtin: bool,

    /// Load `$XDG_CONFIG_HOME/microagents/agents/`
    #[serde(default = "default_true")]
    pub include_user: bool,

    /// Load `<workspace>/.microagents/agents/`
    #[serde(default = "default_true")]
    pub include_workspace: bool,

    /// Extra agent directories, relative paths resolved against the workspace
    #[serde(default)]
    pub directories: Vec<PathBuf>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            include_builtin: true,
            include_user: true,
            include_workspace: true,
            directories: Vec::new(),
        }
    }
}

/// How selected payloads are rendered for injection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Upper bound on rendered agents; unset means all
    #[serde(default)]
    pub max_agents: Option<usize>,

    #[serde(default = "default_separator")]
    pub separator: String,

    /// Prefix each payload with a comment naming the agent and its triggers
    #[serde(default = "default_true")]
    pub include_header: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_agents: None,
            separator: default_separator(),
            include_header: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Quiet period after the last filesystem event before reloading
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_separator() -> String {
    "\n\n---\n\n".to_string()
}

fn default_debounce_ms() -> u64 {
    200
}
