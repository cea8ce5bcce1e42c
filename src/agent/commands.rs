//! Agent command service: single entry point per agent CLI command variant.
//!
//! Owns all agent workflow logic; CLI parses, calls one method per variant, and formats output.

use crate::agent::repository::{validate_sources, AgentSource, ValidationResult, BUILTIN_AGENTS};
use crate::agent::{AgentRegistry, RegistrySnapshot};
use crate::dispatch::{self, MatchResult};
use crate::error::{MicroagentError, Result};
use crate::views::ContextView;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub struct AgentCommandService;

/// Result of dispatch command.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchCommandResult {
    pub prompt: String,
    pub matches: Vec<MatchResult>,
    /// Rendered guidance, present when rendering was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Result of list command.
#[derive(Debug, Clone, Serialize)]
pub struct AgentListResult {
    pub agents: Vec<AgentListItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentListItem {
    pub id: String,
    pub triggers: Vec<String>,
    pub description: Option<String>,
    pub payload_chars: usize,
}

/// Result of show command.
#[derive(Debug, Clone, Serialize)]
pub struct AgentShowResult {
    pub id: String,
    pub description: Option<String>,
    pub triggers: Vec<String>,
    pub payload: String,
}

/// Result of validate command.
#[derive(Debug, Clone)]
pub struct AgentValidateResult {
    pub results: Vec<ValidationResult>,
}

impl AgentValidateResult {
    pub fn is_valid(&self) -> bool {
        self.results.iter().all(ValidationResult::is_valid)
    }

    pub fn valid_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_valid()).count()
    }
}

/// Planned or performed write of one built-in agent file.
#[derive(Debug, Clone, Serialize)]
pub struct InitEntry {
    pub agent_id: String,
    pub path: PathBuf,
    pub exists: bool,
    pub written: bool,
}

/// Result of init command.
#[derive(Debug, Clone, Serialize)]
pub struct InitResult {
    pub agents_dir: PathBuf,
    pub entries: Vec<InitEntry>,
}

impl AgentCommandService {
    /// Dispatch against one snapshot, optionally rendering the selected payloads.
    pub fn dispatch(
        snapshot: &RegistrySnapshot,
        prompt: &str,
        view: Option<&ContextView>,
    ) -> Result<DispatchCommandResult> {
        let matches = dispatch::dispatch(prompt, snapshot)?;
        let context = view.map(|view| view.render(&matches, snapshot));
        Ok(DispatchCommandResult {
            prompt: prompt.to_string(),
            matches,
            context,
        })
    }

    /// List agents in registration order.
    pub fn list(registry: &AgentRegistry) -> AgentListResult {
        let agents = registry
            .all()
            .iter()
            .map(|agent| AgentListItem {
                id: agent.id().to_string(),
                triggers: agent.trigger_phrases().into_iter().map(String::from).collect(),
                description: agent.description().map(String::from),
                payload_chars: agent.payload().chars().count(),
            })
            .collect();
        AgentListResult { agents }
    }

    /// Show one agent.
    pub fn show(registry: &AgentRegistry, agent_id: &str) -> Result<AgentShowResult> {
        let agent = registry.get(agent_id)?;
        Ok(AgentShowResult {
            id: agent.id().to_string(),
            description: agent.description().map(String::from),
            triggers: agent.trigger_phrases().into_iter().map(String::from).collect(),
            payload: agent.payload().to_string(),
        })
    }

    /// Validate every entry of every source.
    pub fn validate(sources: &[Box<dyn AgentSource>]) -> Result<AgentValidateResult> {
        Ok(AgentValidateResult {
            results: validate_sources(sources)?,
        })
    }

    /// Plan (and unless `dry_run`, perform) writing the built-in agents into `agents_dir`.
    ///
    /// Existing files are left alone unless `force` is set.
    pub fn init(agents_dir: &Path, force: bool, dry_run: bool) -> Result<InitResult> {
        if !dry_run {
            std::fs::create_dir_all(agents_dir).map_err(|e| {
                MicroagentError::ConfigError(format!(
                    "Failed to create agents directory {}: {}",
                    agents_dir.display(),
                    e
                ))
            })?;
        }

        let mut entries = Vec::with_capacity(BUILTIN_AGENTS.len());
        for (file_name, content) in BUILTIN_AGENTS {
            let path = agents_dir.join(file_name);
            let exists = path.exists();
            let should_write = !dry_run && (force || !exists);
            if should_write {
                std::fs::write(&path, content)?;
                tracing::info!(path = %path.display(), "Wrote built-in agent");
            }
            entries.push(InitEntry {
                agent_id: file_name.trim_end_matches(".md").to_string(),
                path,
                exists,
                written: should_write,
            });
        }

        Ok(InitResult {
            agents_dir: agents_dir.to_path_buf(),
            entries,
        })
    }
}
