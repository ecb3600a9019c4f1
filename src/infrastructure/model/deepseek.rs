//! OpenAI-compatible streaming client for DeepSeek-style endpoints.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use reqwest::Client;
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::traits::ModelProvider;
use super::types::{FragmentStream, ModelError, ModelRequest, StreamFragment};
use crate::domain::types::Turn;

/// Chat-completions client speaking the OpenAI wire dialect over SSE.
/// `reasoning_content` deltas are kept on their own channel so reasoning
/// never mixes into the user-visible reply.
#[derive(Clone)]
pub struct DeepSeekClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl DeepSeekClient {
    /// The deadline covers the whole call, streamed body included; a
    /// breach surfaces as a fatal timeout and is never retried here.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

#[async_trait]
impl ModelProvider for DeepSeekClient {
    async fn stream_chat(&self, request: ModelRequest) -> Result<FragmentStream, ModelError> {
        let url = self.endpoint("/chat/completions");
        info!(
            model = request.model.as_str(),
            turns = request.turns.len(),
            "Opening model stream"
        );

        let builder = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ChatCompletionRequest {
                model: request.model,
                messages: request.turns,
                temperature: request.temperature,
                max_tokens: request.max_tokens,
                stream: true,
            });
        let source =
            EventSource::new(builder).map_err(|error| ModelError::Stream(error.to_string()))?;
        Ok(sse_fragments(source))
    }
}

fn sse_fragments(source: EventSource) -> FragmentStream {
    Box::pin(stream::unfold(Some(source), |state| async move {
        let mut source = state?;
        loop {
            match source.next().await {
                None => return None,
                Some(Ok(Event::Open)) => {
                    debug!("Model stream opened");
                }
                Some(Ok(Event::Message(message))) => {
                    if message.data.trim() == "[DONE]" {
                        source.close();
                        return None;
                    }
                    match parse_delta(&message.data) {
                        Ok(Some(fragment)) => return Some((Ok(fragment), Some(source))),
                        Ok(None) => {}
                        Err(error) => {
                            source.close();
                            return Some((Err(error), None));
                        }
                    }
                }
                Some(Err(reqwest_eventsource::Error::StreamEnded)) => return None,
                Some(Err(error)) => {
                    source.close();
                    return Some((Err(stream_fault(error)), None));
                }
            }
        }
    }))
}

fn stream_fault(error: reqwest_eventsource::Error) -> ModelError {
    match error {
        reqwest_eventsource::Error::Transport(source) if source.is_timeout() => ModelError::Timeout,
        reqwest_eventsource::Error::Transport(source) => ModelError::Network(source),
        other => ModelError::Stream(other.to_string()),
    }
}

fn parse_delta(data: &str) -> Result<Option<StreamFragment>, ModelError> {
    let chunk: StreamChunk = serde_json::from_str(data)
        .map_err(|error| ModelError::InvalidResponse(format!("bad stream chunk: {error}")))?;
    let Some(choice) = chunk.choices.into_iter().next() else {
        return Ok(None);
    };
    if let Some(reasoning) = choice.delta.reasoning_content {
        if !reasoning.is_empty() {
            return Ok(Some(StreamFragment::Reasoning(reasoning)));
        }
    }
    if let Some(content) = choice.delta.content {
        if !content.is_empty() {
            return Ok(Some(StreamFragment::Content(content)));
        }
    }
    Ok(None)
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Turn>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
    reasoning_content: Option<String>,
}
