pub mod spec;
pub mod validation;

pub use spec::{Agent, AgentSpec, Trigger};
pub use validation::validate_agent_spec;
