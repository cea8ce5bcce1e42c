//! Agent spec validation owned by the agent domain.

use super::spec::AgentSpec;
use crate::error::{MicroagentError, Result};

/// Validate an agent spec before it is admitted to a registry.
pub fn validate_agent_spec(spec: &AgentSpec) -> Result<()> {
    if spec.id.trim().is_empty() {
        return Err(MicroagentError::InvalidAgent(
            "Agent ID cannot be empty".to_string(),
        ));
    }

    if spec.triggers.is_empty() {
        return Err(MicroagentError::InvalidAgent(format!(
            "Agent '{}' must declare at least one trigger",
            spec.id.trim()
        )));
    }

    if let Some(position) = spec.triggers.iter().position(|t| t.trim().is_empty()) {
        return Err(MicroagentError::InvalidAgent(format!(
            "Agent '{}' has a blank trigger at position {}",
            spec.id.trim(),
            position
        )));
    }

    Ok(())
}
