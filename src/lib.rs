//! Microagents: Keyword-Triggered Context Dispatch
//!
//! Keeps a registry of microagents (guidance documents with trigger phrases)
//! and selects the ones whose triggers occur in a user prompt, so a host can
//! inject only the relevant guidance into an LLM context.

pub mod agent;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod tooling;
pub mod views;
pub mod watch;

pub use agent::{Agent, AgentRegistry, AgentSpec, RegistrySnapshot};
pub use dispatch::{dispatch, MatchResult};
pub use error::{MicroagentError, Result};
