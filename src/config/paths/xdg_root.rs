//! XDG Base Directory utilities for user-level and workspace-level agent files.

use crate::error::MicroagentError;
use std::path::{Path, PathBuf};

/// Directory inside a workspace that holds local config and agents.
pub const WORKSPACE_DIR: &str = ".microagents";

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
/// Follows XDG Base Directory Specification
pub fn config_home() -> Result<PathBuf, MicroagentError> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config_home.is_empty() {
            return Ok(PathBuf::from(xdg_config_home));
        }
    }

    let home = std::env::var("HOME").map_err(|_| {
        MicroagentError::ConfigError(
            "Could not determine XDG config home directory (HOME not set)".to_string(),
        )
    })?;

    Ok(PathBuf::from(home).join(".config"))
}

/// `$XDG_CONFIG_HOME/microagents/config.toml`
pub fn global_config_path() -> Result<PathBuf, MicroagentError> {
    Ok(config_home()?.join("microagents").join("config.toml"))
}

/// Get user agents directory path
///
/// Returns `$XDG_CONFIG_HOME/microagents/agents/`. The directory may not exist.
pub fn user_agents_dir() -> Result<PathBuf, MicroagentError> {
    Ok(config_home()?.join("microagents").join("agents"))
}

/// Like [`user_agents_dir`], creating the directory if it doesn't exist
pub fn ensure_user_agents_dir() -> Result<PathBuf, MicroagentError> {
    let agents_dir = user_agents_dir()?;

    if !agents_dir.exists() {
        std::fs::create_dir_all(&agents_dir).map_err(|e| {
            MicroagentError::ConfigError(format!(
                "Failed to create agents directory {}: {}",
                agents_dir.display(),
                e
            ))
        })?;
    }

    Ok(agents_dir)
}

/// `<workspace>/.microagents/agents/`
pub fn workspace_agents_dir(workspace_root: &Path) -> PathBuf {
    workspace_root.join(WORKSPACE_DIR).join("agents")
}

/// `<workspace>/.microagents/config.toml`
pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(WORKSPACE_DIR).join("config.toml")
}

/// Canonical workspace root without Windows verbatim prefixes.
pub fn canonical_workspace(workspace_root: &Path) -> Result<PathBuf, MicroagentError> {
    dunce::canonicalize(workspace_root).map_err(|e| {
        MicroagentError::ConfigError(format!(
            "Failed to canonicalize workspace path {}: {}",
            workspace_root.display(),
            e
        ))
    })
}
