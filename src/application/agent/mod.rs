mod errors;
mod instructions;
mod models;
mod runner;
pub mod runtime;


pub use errors::AgentError;
pub use models::{ActionStep, AgentConfig, ChatOptions, ChatOutcome};
pub use runner::Agent;
