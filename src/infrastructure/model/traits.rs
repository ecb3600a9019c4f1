use async_trait::async_trait;

use super::types::{FragmentStream, ModelError, ModelRequest};

#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Opens a streamed chat completion. The stream yields content and
    /// reasoning fragments until the reply is complete; a stream error is
    /// fatal for the surrounding conversation turn.
    async fn stream_chat(&self, request: ModelRequest) -> Result<FragmentStream, ModelError>;
}
