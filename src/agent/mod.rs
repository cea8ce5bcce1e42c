//! Agents: the validated agent model, the copy-on-write registry, and the
//! sources that feed it.

pub mod commands;
pub mod domain;
mod registry;
pub mod repository;

pub use commands::AgentCommandService;
pub use domain::{Agent, AgentSpec, Trigger};
pub use registry::{AgentRegistry, RegistrySnapshot};
pub use repository::{
    collect_specs, validate_sources, AgentOrigin, AgentSource, DirectorySource, EmbeddedSource,
    LoadedAgent, ValidationResult,
};
