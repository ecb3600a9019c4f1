use thiserror::Error;

use crate::infrastructure::model::ModelError;

/// Faults that end a chat call. Tool-level problems never appear here;
/// they are folded into the conversation as error blocks instead.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("action limit of {0} tool rounds exceeded in one request")]
    ActionLimitExceeded(usize),
}
