//! Trigger Dispatcher
//!
//! Matches a free-text prompt against the trigger phrases of every agent in a
//! registry snapshot and reports which agents fire. Dispatch is a pure
//! function of `(prompt, snapshot)`: no I/O, no logging, no mutation.

pub mod matcher;

use crate::agent::{Agent, RegistrySnapshot};
use crate::error::{MicroagentError, Result};
use serde::{Deserialize, Serialize};

/// One selected agent and the trigger phrases that selected it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub agent_id: String,
    /// Matching trigger phrases, in the agent's trigger order. Never empty.
    pub matched_triggers: Vec<String>,
}

impl MatchResult {
    pub fn new<I, S>(agent_id: impl Into<String>, matched_triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            agent_id: agent_id.into(),
            matched_triggers: matched_triggers.into_iter().map(Into::into).collect(),
        }
    }
}

/// Match `prompt` against every agent in `registry`.
///
/// Results follow registry order, not match position in the prompt. No match
/// is an empty vector; only a blank prompt is an error.
pub fn dispatch(prompt: &str, registry: &RegistrySnapshot) -> Result<Vec<MatchResult>> {
    if prompt.trim().is_empty() {
        return Err(MicroagentError::EmptyPrompt);
    }

    let text = matcher::normalize_prompt(prompt);
    Ok(registry
        .iter()
        .filter_map(|agent| match_agent(&text, agent))
        .collect())
}

fn match_agent(text: &str, agent: &Agent) -> Option<MatchResult> {
    let matched: Vec<String> = agent
        .triggers()
        .iter()
        .filter(|trigger| matcher::phrase_occurs(text, trigger.normalized()))
        .map(|trigger| trigger.phrase().to_string())
        .collect();

    if matched.is_empty() {
        None
    } else {
        Some(MatchResult {
            agent_id: agent.id().to_string(),
            matched_triggers: matched,
        })
    }
}
