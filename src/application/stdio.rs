use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::application::agent::{ActionStep, Agent, ChatOptions};
use crate::infrastructure::model::ModelProvider;

#[derive(Debug, Error)]
pub enum StdioError {
    #[error("stdin/stdout I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize stdio response: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct StdioChatRequest {
    prompt: String,
    model: Option<String>,
    system_prompt: Option<String>,
    conversation_id: Option<String>,
    project: Option<String>,
    profile: Option<String>,
}

#[derive(Debug, Serialize)]
struct StdioChatResponse {
    conversation_id: Option<String>,
    content: Option<String>,
    reasoning: Option<String>,
    error: Option<String>,
    actions: Vec<ActionStep>,
}

impl StdioChatResponse {
    fn success(
        conversation_id: String,
        content: String,
        reasoning: Option<String>,
        actions: Vec<ActionStep>,
    ) -> Self {
        Self {
            conversation_id: Some(conversation_id),
            content: Some(content),
            reasoning,
            error: None,
            actions,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            conversation_id: None,
            content: None,
            reasoning: None,
            error: Some(message.into()),
            actions: Vec::new(),
        }
    }
}

/// JSON-lines loop: one request object per stdin line, one response object
/// per stdout line. Model transport faults end the affected request, not
/// the loop.
pub async fn run<P>(agent: Arc<Agent<P>>) -> Result<(), StdioError>
where
    P: ModelProvider + 'static,
{
    let stdin = BufReader::new(io::stdin());
    let mut lines = stdin.lines();
    let mut stdout = io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        debug!("Received STDIO line");

        let request = match serde_json::from_str::<StdioChatRequest>(&line) {
            Ok(request) => request,
            Err(parse_error) => {
                error!(%parse_error, "Failed to parse STDIO input line");
                write_response(
                    &mut stdout,
                    StdioChatResponse::failure(format!("invalid JSON request: {parse_error}")),
                )
                .await?;
                continue;
            }
        };

        if request.prompt.trim().is_empty() {
            write_response(&mut stdout, StdioChatResponse::failure("prompt cannot be empty"))
                .await?;
            continue;
        }

        info!("Processing STDIO chat request");
        let options = ChatOptions {
            conversation_id: request.conversation_id,
            system_prompt: request.system_prompt,
            model: request.model,
            project: request.project,
            profile: request.profile,
        };
        match agent.chat(request.prompt, options).await {
            Ok(outcome) => {
                write_response(
                    &mut stdout,
                    StdioChatResponse::success(
                        outcome.conversation_id,
                        outcome.content,
                        outcome.reasoning,
                        outcome.actions,
                    ),
                )
                .await?;
            }
            Err(chat_error) => {
                error!(%chat_error, "STDIO chat request failed");
                write_response(
                    &mut stdout,
                    StdioChatResponse::failure(chat_error.to_string()),
                )
                .await?;
            }
        }
    }

    stdout.flush().await?;
    Ok(())
}

async fn write_response(
    stdout: &mut io::Stdout,
    response: StdioChatResponse,
) -> Result<(), StdioError> {
    let mut payload = serde_json::to_vec(&response)?;
    payload.push(b'\n');
    stdout.write_all(&payload).await?;
    stdout.flush().await?;
    Ok(())
}
