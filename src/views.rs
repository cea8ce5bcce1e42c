//! Context Views
//!
//! Turns dispatch results into the block of guidance text a host injects into
//! its LLM context. Selection order is the dispatch order; the view only bounds
//! and formats it.

use crate::agent::RegistrySnapshot;
use crate::config::DispatchConfig;
use crate::dispatch::MatchResult;
use serde::{Deserialize, Serialize};

/// Context view policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextView {
    /// Render at most this many agents; `None` renders all of them
    pub max_agents: Option<usize>,
    pub separator: String,
    /// Prefix each payload with an HTML comment naming the agent and triggers
    pub include_header: bool,
}

impl Default for ContextView {
    fn default() -> Self {
        Self::from(&DispatchConfig::default())
    }
}

impl From<&DispatchConfig> for ContextView {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            max_agents: config.max_agents,
            separator: config.separator.clone(),
            include_header: config.include_header,
        }
    }
}

impl ContextView {
    pub fn with_max_agents(mut self, max_agents: Option<usize>) -> Self {
        if max_agents.is_some() {
            self.max_agents = max_agents;
        }
        self
    }

    /// Results that survive the `max_agents` bound.
    pub fn select<'a>(&self, results: &'a [MatchResult]) -> &'a [MatchResult] {
        match self.max_agents {
            Some(max) if max < results.len() => &results[..max],
            _ => results,
        }
    }

    /// Render the payloads of the selected agents.
    ///
    /// Results whose agent is not in `registry` (e.g. produced against an
    /// older snapshot) are skipped. Returns an empty string when nothing is
    /// selected.
    pub fn render(&self, results: &[MatchResult], registry: &RegistrySnapshot) -> String {
        let sections: Vec<String> = self
            .select(results)
            .iter()
            .filter_map(|result| {
                let agent = registry.get(&result.agent_id)?;
                let payload = agent.payload().trim_end();
                Some(if self.include_header {
                    format!(
                        "<!-- microagent: {} (triggers: {}) -->\n{}",
                        result.agent_id,
                        result.matched_triggers.join(", "),
                        payload
                    )
                } else {
                    payload.to_string()
                })
            })
            .collect();
        sections.join(&self.separator)
    }
}
