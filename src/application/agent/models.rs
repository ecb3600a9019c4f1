use serde::Serialize;

const DEFAULT_MODEL: &str = "deepseek-reasoner";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2000;
const DEFAULT_MAX_ACTION_ROUNDS: usize = 8;

/// Engine-level settings, fixed at construction time.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Default system-prompt augmentation appended after the tool
    /// catalogue; a per-request augmentation takes precedence.
    pub system_prompt: Option<String>,
    /// Upper bound on dispatched actions per top-level chat call. Converts
    /// an endless tool chain into an error instead of unbounded recursion.
    pub max_action_rounds: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: None,
            max_action_rounds: DEFAULT_MAX_ACTION_ROUNDS,
        }
    }
}

/// Caller-tunable knobs for one chat request.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub conversation_id: Option<String>,
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    pub project: Option<String>,
    pub profile: Option<String>,
}

/// One dispatched action, in the order the model requested it.
#[derive(Debug, Clone, Serialize)]
pub struct ActionStep {
    pub tool: String,
    pub arguments: String,
    pub success: bool,
    pub output: String,
}

#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub conversation_id: String,
    /// Final marker-free reply text.
    pub content: String,
    /// Reasoning emitted while producing the final reply. Surfaced once,
    /// never written to history.
    pub reasoning: Option<String>,
    pub actions: Vec<ActionStep>,
}
