//! Agent sources and the layering that turns them into one registry input.

pub mod contract;
pub mod directory;
pub mod embedded;
pub mod markdown;

pub use contract::{AgentOrigin, AgentSource, LoadedAgent};
pub use directory::DirectorySource;
pub use embedded::{EmbeddedSource, BUILTIN_AGENTS};
pub use markdown::{parse_agent_markdown, render_agent_markdown, ParseError};

use crate::agent::domain::{Agent, AgentSpec};
use crate::config::{xdg, SourcesConfig};
use crate::error::Result;
use std::collections::HashSet;
use std::path::Path;

/// Build the source list described by configuration.
///
/// Order, lowest precedence first: built-in, user agents directory, workspace
/// agents directory, then extra directories in the order listed.
pub fn sources_from_config(
    config: &SourcesConfig,
    workspace_root: &Path,
) -> Result<Vec<Box<dyn AgentSource>>> {
    let mut sources: Vec<Box<dyn AgentSource>> = Vec::new();
    if config.include_builtin {
        sources.push(Box::new(EmbeddedSource::new()));
    }
    if config.include_user {
        sources.push(Box::new(DirectorySource::new("user", xdg::user_agents_dir()?)));
    }
    if config.include_workspace {
        sources.push(Box::new(DirectorySource::new(
            "workspace",
            xdg::workspace_agents_dir(workspace_root),
        )));
    }
    for dir in &config.directories {
        let root = if dir.is_absolute() {
            dir.clone()
        } else {
            workspace_root.join(dir)
        };
        sources.push(Box::new(DirectorySource::new(
            format!("dir:{}", dir.display()),
            root,
        )));
    }
    Ok(sources)
}

/// Load all sources and layer them into an ordered list of agents.
///
/// An agent from a later source shadows one with the same id from an earlier
/// source and takes over its position. Duplicate ids within one source are
/// kept, so registration reports them.
pub fn collect_agents(sources: &[Box<dyn AgentSource>]) -> Result<Vec<LoadedAgent>> {
    let mut layered: Vec<(usize, LoadedAgent)> = Vec::new();

    for (layer, source) in sources.iter().enumerate() {
        let mut seen_in_layer: HashSet<String> = HashSet::new();
        for agent in source.load()? {
            let first_in_layer = seen_in_layer.insert(agent.spec.id.clone());
            let shadowed = first_in_layer
                .then(|| {
                    layered
                        .iter()
                        .position(|(l, a)| *l < layer && a.spec.id == agent.spec.id)
                })
                .flatten();

            match shadowed {
                Some(position) => {
                    tracing::debug!(
                        agent_id = %agent.spec.id,
                        source = source.name(),
                        "Agent shadows {}",
                        layered[position].1.origin
                    );
                    layered[position] = (layer, agent);
                }
                None => layered.push((layer, agent)),
            }
        }
    }

    Ok(layered.into_iter().map(|(_, agent)| agent).collect())
}

/// Specs only, ready for `AgentRegistry::replace`.
pub fn collect_specs(sources: &[Box<dyn AgentSource>]) -> Result<Vec<AgentSpec>> {
    Ok(collect_agents(sources)?
        .into_iter()
        .map(|agent| agent.spec)
        .collect())
}

/// Validation result for one agent entry
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Agent id, or the file path when the entry could not be parsed
    pub subject: String,
    pub source: String,
    pub checks: Vec<(String, bool)>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new(subject: String, source: String) -> Self {
        Self {
            subject,
            source,
            checks: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn add_check(&mut self, description: &str, passed: bool) {
        self.checks.push((description.to_string(), passed));
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.checks.iter().all(|(_, passed)| *passed)
    }

    pub fn total_checks(&self) -> usize {
        self.checks.len()
    }

    pub fn passed_checks(&self) -> usize {
        self.checks.iter().filter(|(_, passed)| *passed).count()
    }
}

/// Check every entry of every source without touching a registry.
pub fn validate_sources(sources: &[Box<dyn AgentSource>]) -> Result<Vec<ValidationResult>> {
    let mut results = Vec::new();

    for source in sources {
        let mut seen: HashSet<String> = HashSet::new();
        for entry in source.entries()? {
            let loaded = match entry {
                Ok(loaded) => loaded,
                Err(e) => {
                    let subject = match &e {
                        crate::error::MicroagentError::SourceError { path, .. } => {
                            path.display().to_string()
                        }
                        _ => "<unknown>".to_string(),
                    };
                    let mut result = ValidationResult::new(subject, source.name().to_string());
                    result.add_error(e.to_string());
                    results.push(result);
                    continue;
                }
            };

            let mut result =
                ValidationResult::new(loaded.spec.id.clone(), source.name().to_string());
            result.add_check("Front-matter parsed", true);
            result.add_check("Unique id within source", seen.insert(loaded.spec.id.clone()));
            match Agent::from_spec(loaded.spec.clone()) {
                Ok(agent) => {
                    result.add_check("Triggers valid", true);
                    result.add_check(
                        "Triggers distinct",
                        agent.triggers().len() == loaded.spec.triggers.len(),
                    );
                }
                Err(e) => result.add_error(e.to_string()),
            }
            result.add_check("Payload present", !loaded.spec.payload.trim().is_empty());
            results.push(result);
        }
    }

    Ok(results)
}
