//! Built-in agents compiled into the binary.

use super::contract::{AgentOrigin, AgentSource, LoadedAgent};
use super::markdown::parse_agent_markdown;
use crate::error::{MicroagentError, Result};
use std::path::PathBuf;

/// (file name, content) of every built-in agent, in registration order.
pub const BUILTIN_AGENTS: &[(&str, &str)] = &[
    ("startup.md", include_str!("../embedded/startup.md")),
    ("architect.md", include_str!("../embedded/architect.md")),
    ("backend.md", include_str!("../embedded/backend.md")),
    ("frontend.md", include_str!("../embedded/frontend.md")),
    ("qa.md", include_str!("../embedded/qa.md")),
];

#[derive(Debug, Default)]
pub struct EmbeddedSource;

impl EmbeddedSource {
    pub fn new() -> Self {
        Self
    }
}

impl AgentSource for EmbeddedSource {
    fn name(&self) -> &str {
        "builtin"
    }

    fn entries(&self) -> Result<Vec<Result<LoadedAgent>>> {
        Ok(BUILTIN_AGENTS
            .iter()
            .map(|(file_name, content)| {
                let stem = file_name.trim_end_matches(".md");
                parse_agent_markdown(content, Some(stem))
                    .map(|spec| LoadedAgent {
                        spec,
                        origin: AgentOrigin::Builtin,
                    })
                    .map_err(|e| MicroagentError::source_error(PathBuf::from(file_name), e.to_string()))
            })
            .collect())
    }
}
