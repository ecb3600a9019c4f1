use std::collections::VecDeque;

use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::errors::AgentError;
use super::instructions;
use super::models::{ActionStep, AgentConfig, ChatOptions, ChatOutcome};
use super::runtime::{ActionRequest, ActionRuntime, parser};
use crate::application::history::ConversationStore;
use crate::application::tooling::ToolRegistry;
use crate::domain::types::Turn;
use crate::infrastructure::model::{ModelProvider, ModelRequest, StreamFragment};

/// Conversation orchestrator: composes turns, streams the model reply and
/// drives the action-injection loop until a reply carries no markers.
pub struct Agent<P: ModelProvider> {
    provider: P,
    runtime: ActionRuntime,
    store: Mutex<ConversationStore>,
    config: AgentConfig,
}

/// The turn loop alternates between waiting on the model and draining
/// action markers out of the reply it produced.
enum TurnState {
    AwaitingModel { prompt: String },
    ProcessingActions { content: String },
}

struct RoundReply {
    content: String,
    reasoning: Option<String>,
}

impl<P: ModelProvider> Agent<P> {
    pub fn new(provider: P, registry: ToolRegistry, config: AgentConfig) -> Self {
        Self {
            provider,
            runtime: ActionRuntime::new(registry),
            store: Mutex::new(ConversationStore::default()),
            config,
        }
    }

    /// Runs one user message through the engine. Returns once the model
    /// produces a reply with no action markers left to process; every
    /// intermediate round has appended its own exchange to history by then.
    pub async fn chat(
        &self,
        message: String,
        options: ChatOptions,
    ) -> Result<ChatOutcome, AgentError> {
        let conversation_id = match options.conversation_id {
            Some(id) => id,
            None => self
                .store
                .lock()
                .await
                .create(options.project, options.profile),
        };
        let model = options.model.unwrap_or_else(|| self.config.model.clone());
        let augmentation = options
            .system_prompt
            .or_else(|| self.config.system_prompt.clone());
        let system_prompt =
            instructions::compose_system_prompt(self.runtime.registry(), augmentation.as_deref());

        info!(conversation = %conversation_id, model = %model, "Chat turn started");

        let mut pending: VecDeque<ActionRequest> = VecDeque::new();
        let mut actions: Vec<ActionStep> = Vec::new();
        let mut rounds = 0usize;
        let mut reasoning = None;
        let mut state = TurnState::AwaitingModel { prompt: message };

        loop {
            match state {
                TurnState::AwaitingModel { prompt } => {
                    let reply = self
                        .round_trip(&conversation_id, &model, &system_prompt, prompt)
                        .await?;
                    reasoning = reply.reasoning;
                    state = TurnState::ProcessingActions {
                        content: reply.content,
                    };
                }
                TurnState::ProcessingActions { content } => {
                    let found: Vec<ActionRequest> = parser::scan(&content).collect();
                    if found.is_empty() && pending.is_empty() {
                        info!(conversation = %conversation_id, rounds, "Chat turn finished");
                        return Ok(ChatOutcome {
                            conversation_id,
                            content: parser::strip_markers(&content),
                            reasoning,
                            actions,
                        });
                    }

                    // Depth-first: markers from the newest reply run before
                    // the remainder of any earlier reply.
                    for request in found.into_iter().rev() {
                        pending.push_front(request);
                    }
                    let request = pending.pop_front().expect("pending action after scan");

                    rounds += 1;
                    if rounds > self.config.max_action_rounds {
                        warn!(
                            conversation = %conversation_id,
                            limit = self.config.max_action_rounds,
                            "Action limit exceeded"
                        );
                        return Err(AgentError::ActionLimitExceeded(
                            self.config.max_action_rounds,
                        ));
                    }

                    let outcome = self.runtime.dispatch(&request);
                    actions.push(ActionStep {
                        tool: outcome.tool.clone(),
                        arguments: outcome.arguments.clone(),
                        success: outcome.success,
                        output: outcome.body.clone(),
                    });
                    let injection = self.runtime.render(&outcome);
                    debug!(
                        conversation = %conversation_id,
                        action = %outcome.tool,
                        "Injecting action outcome"
                    );
                    state = TurnState::AwaitingModel { prompt: injection };
                }
            }
        }
    }

    /// Snapshot of a conversation's turns, for inspection by callers.
    pub async fn conversation_turns(&self, id: &str) -> Option<Vec<Turn>> {
        let store = self.store.lock().await;
        store.get(id).map(|conversation| conversation.turns().to_vec())
    }

    /// One model round: compose [system + history + user], stream the
    /// reply, then append the exchange. The stored assistant turn is
    /// marker-free; reasoning is accumulated separately and never stored.
    async fn round_trip(
        &self,
        conversation_id: &str,
        model: &str,
        system_prompt: &str,
        prompt: String,
    ) -> Result<RoundReply, AgentError> {
        let history = {
            let mut store = self.store.lock().await;
            store.ensure(conversation_id).turns().to_vec()
        };
        debug!(
            conversation = conversation_id,
            prior_turns = history.len(),
            "Submitting turn to model"
        );

        let mut turns = Vec::with_capacity(history.len() + 2);
        turns.push(Turn::system(system_prompt));
        turns.extend(history);
        turns.push(Turn::user(prompt.clone()));

        let mut stream = self
            .provider
            .stream_chat(ModelRequest {
                model: model.to_string(),
                turns,
                temperature: self.config.temperature,
                max_tokens: self.config.max_tokens,
            })
            .await?;

        let mut content = String::new();
        let mut reasoning = String::new();
        while let Some(fragment) = stream.next().await {
            match fragment {
                Ok(StreamFragment::Content(chunk)) => content.push_str(&chunk),
                Ok(StreamFragment::Reasoning(chunk)) => reasoning.push_str(&chunk),
                Err(error) => {
                    warn!(
                        conversation = conversation_id,
                        partial_chars = content.len(),
                        "Model stream interrupted"
                    );
                    return Err(error.into());
                }
            }
        }
        debug!(
            conversation = conversation_id,
            content_chars = content.len(),
            reasoning_chars = reasoning.len(),
            "Model reply accumulated"
        );

        {
            let mut store = self.store.lock().await;
            store.append_exchange(
                conversation_id,
                Turn::user(prompt),
                Turn::assistant(parser::strip_markers(&content)),
            );
        }

        Ok(RoundReply {
            content,
            reasoning: (!reasoning.is_empty()).then_some(reasoning),
        })
    }
}
