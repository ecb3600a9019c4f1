use std::pin::Pin;

use futures::Stream;
use thiserror::Error;

use crate::domain::types::Turn;

/// One chat-completion call: the composed turn sequence plus sampling
/// parameters. The transport deadline lives on the HTTP client itself.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub turns: Vec<Turn>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Incremental piece of a streamed reply. Reasoner-class models emit a
/// separate reasoning channel ahead of the user-visible content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFragment {
    Reasoning(String),
    Content(String),
}

pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<StreamFragment, ModelError>> + Send>>;

/// Transport-level faults. All of these are fatal to the surrounding
/// conversation turn and propagate to the caller without retry.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("network error contacting model endpoint: {0}")]
    Network(#[from] reqwest::Error),
    #[error("model endpoint deadline exceeded")]
    Timeout,
    #[error("model stream failed: {0}")]
    Stream(String),
    #[error("model endpoint returned an invalid payload: {0}")]
    InvalidResponse(String),
    #[error("API key is not set (expected in ${0})")]
    MissingApiKey(String),
}
