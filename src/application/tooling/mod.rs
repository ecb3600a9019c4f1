mod bash;
mod catalog;
mod editor;
mod registry;

pub use bash::BashTool;
pub use editor::StrReplaceEditor;
pub use registry::{RegistryError, ToolRegistry};

use thiserror::Error;

/// A callable capability the model can request through an action marker.
///
/// The call contract is synchronous and string-in/string-out: decoding the
/// raw argument payload is the tool's own responsibility (see
/// `agent::runtime::arguments` for the shared grammar). A returned string
/// starting with `Error` and a raised `ToolFault` are treated identically
/// by the dispatcher.
pub trait Tool: Send + Sync {
    /// Stable identifier used inside `<sysAction>` markers.
    fn name(&self) -> &str;

    /// Full usage text, shown verbatim to the model. The first line doubles
    /// as the one-line catalogue summary.
    fn description(&self) -> &str;

    fn call(&self, raw_args: &str) -> Result<String, ToolFault>;
}

/// A recoverable failure raised by a tool. Surfaced to the model as an
/// error block; never fatal to the conversation.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ToolFault {
    message: String,
}

impl ToolFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ToolFault {
    fn from(source: std::io::Error) -> Self {
        Self::new(source.to_string())
    }
}
