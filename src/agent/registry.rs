//! Agent registry.
//!
//! The registry publishes immutable [`RegistrySnapshot`]s behind a
//! `RwLock<Arc<_>>`. Readers clone the `Arc` and work lock-free; writers build
//! a complete new snapshot and swap the pointer, so a reader never sees a
//! half-applied change.

use crate::agent::domain::{Agent, AgentSpec};
use crate::dispatch::{self, MatchResult};
use crate::error::{MicroagentError, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable set of agents in registration order.
#[derive(Debug, Default)]
pub struct RegistrySnapshot {
    agents: Vec<Arc<Agent>>,
    index: HashMap<String, usize>,
}

impl RegistrySnapshot {
    /// Build a snapshot from specs, failing on the first invalid or duplicate agent.
    pub fn from_specs<I>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = AgentSpec>,
    {
        let mut snapshot = Self::default();
        for spec in specs {
            snapshot.push(Agent::from_spec(spec)?)?;
        }
        Ok(snapshot)
    }

    fn push(&mut self, agent: Agent) -> Result<()> {
        if self.index.contains_key(agent.id()) {
            return Err(MicroagentError::DuplicateAgent(agent.id().to_string()));
        }
        self.index.insert(agent.id().to_string(), self.agents.len());
        self.agents.push(Arc::new(agent));
        Ok(())
    }

    /// Copy of this snapshot with one more agent appended.
    fn with_agent(&self, agent: Agent) -> Result<Self> {
        let mut next = Self {
            agents: self.agents.clone(),
            index: self.index.clone(),
        };
        next.push(agent)?;
        Ok(next)
    }

    pub fn get(&self, agent_id: &str) -> Option<&Arc<Agent>> {
        self.index.get(agent_id).map(|&i| &self.agents[i])
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.index.contains_key(agent_id)
    }

    /// Agents in registration order. Can be called any number of times.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.iter().map(|agent| agent.as_ref())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.agents.iter().map(|agent| agent.id())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl<'a> IntoIterator for &'a RegistrySnapshot {
    type Item = &'a Agent;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, Arc<Agent>>, fn(&'a Arc<Agent>) -> &'a Agent>;

    fn into_iter(self) -> Self::IntoIter {
        fn unwrap_arc(agent: &Arc<Agent>) -> &Agent {
            agent
        }
        self.agents
            .iter()
            .map(unwrap_arc as fn(&'a Arc<Agent>) -> &'a Agent)
    }
}

/// Agent registry with copy-on-write updates.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    current: RwLock<Arc<RegistrySnapshot>>,
    /// Serializes writers so concurrent `register` calls never drop each other.
    writer: Mutex<()>,
}

impl AgentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated from specs.
    pub fn from_specs<I>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = AgentSpec>,
    {
        let snapshot = RegistrySnapshot::from_specs(specs)?;
        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
        })
    }

    /// Current snapshot. Stays consistent for as long as the caller holds it.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.current.read().clone()
    }

    /// Register a new agent.
    ///
    /// Fails with `InvalidAgent` or `DuplicateAgent`; on failure the registry
    /// is unchanged.
    pub fn register(&self, spec: AgentSpec) -> Result<()> {
        let agent = Agent::from_spec(spec)?;
        let _guard = self.writer.lock();
        let next = self.snapshot().with_agent(agent)?;
        let agent_id = next.agents.last().map(|a| a.id().to_string());
        *self.current.write() = Arc::new(next);
        tracing::debug!(agent_id = ?agent_id, "Registered agent");
        Ok(())
    }

    /// Get an agent by ID
    pub fn get(&self, agent_id: &str) -> Result<Arc<Agent>> {
        self.snapshot()
            .get(agent_id)
            .cloned()
            .ok_or_else(|| MicroagentError::NotFound(agent_id.to_string()))
    }

    /// All registered agents, in registration order.
    ///
    /// The returned snapshot is iterable repeatedly and unaffected by later
    /// registry updates.
    pub fn all(&self) -> Arc<RegistrySnapshot> {
        self.snapshot()
    }

    /// Atomically replace the whole registry.
    ///
    /// The new set is fully validated before the swap; if any spec is invalid
    /// or ids collide, the previous registry stays in place.
    pub fn replace<I>(&self, specs: I) -> Result<()>
    where
        I: IntoIterator<Item = AgentSpec>,
    {
        let next = RegistrySnapshot::from_specs(specs)?;
        let count = next.len();
        let _guard = self.writer.lock();
        *self.current.write() = Arc::new(next);
        tracing::info!(agents = count, "Replaced agent registry");
        Ok(())
    }

    /// Dispatch a prompt against the current snapshot.
    pub fn dispatch(&self, prompt: &str) -> Result<Vec<MatchResult>> {
        dispatch::dispatch(prompt, &self.snapshot())
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.snapshot().contains(agent_id)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
