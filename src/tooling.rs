//! Tooling & Integration Layer
//!
//! Command-line front end over the registry, dispatcher, and agent sources.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
