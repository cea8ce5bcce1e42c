//! Agent shapes: the unvalidated `AgentSpec` handed in by loaders and the
//! validated `Agent` held by the registry.

use crate::dispatch::matcher::normalize_phrase;
use crate::error::{MicroagentError, Result};
use serde::{Deserialize, Serialize};

/// Agent description as produced by a loader, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique identifier for the agent
    pub id: String,
    /// Trigger phrases in the order they should be tested
    pub triggers: Vec<String>,
    /// Guidance text returned to the caller on match
    #[serde(default)]
    pub payload: String,
    /// Short human-readable summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AgentSpec {
    pub fn new<I, S>(id: impl Into<String>, triggers: I, payload: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            triggers: triggers.into_iter().map(Into::into).collect(),
            payload: payload.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A trigger phrase: the text as registered plus its matching form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trigger {
    phrase: String,
    #[serde(skip)]
    normalized: String,
}

impl Trigger {
    /// The phrase as registered, trimmed.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// NFC, lower-cased, single-spaced form used for matching.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// A validated agent. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    id: String,
    triggers: Vec<Trigger>,
    payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Agent {
    /// Validate a spec and build the registry form.
    ///
    /// Triggers whose normalized forms collide are collapsed to the first
    /// occurrence, so `triggers()` is an ordered set.
    pub fn from_spec(spec: AgentSpec) -> Result<Self> {
        super::validation::validate_agent_spec(&spec)?;

        let mut triggers: Vec<Trigger> = Vec::with_capacity(spec.triggers.len());
        for raw in &spec.triggers {
            let normalized = normalize_phrase(raw);
            if triggers.iter().any(|t| t.normalized == normalized) {
                continue;
            }
            triggers.push(Trigger {
                phrase: raw.trim().to_string(),
                normalized,
            });
        }

        Ok(Self {
            id: spec.id.trim().to_string(),
            triggers,
            payload: spec.payload,
            description: spec.description,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Trigger phrases as registered.
    pub fn trigger_phrases(&self) -> Vec<&str> {
        self.triggers.iter().map(Trigger::phrase).collect()
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Back to the loader shape, e.g. for writing agent files.
    pub fn to_spec(&self) -> AgentSpec {
        AgentSpec {
            id: self.id.clone(),
            triggers: self.triggers.iter().map(|t| t.phrase.clone()).collect(),
            payload: self.payload.clone(),
            description: self.description.clone(),
        }
    }
}

impl TryFrom<AgentSpec> for Agent {
    type Error = MicroagentError;

    fn try_from(spec: AgentSpec) -> Result<Self> {
        Agent::from_spec(spec)
    }
}
