//! Reflexive catalogue tools: the registry describing itself to the model.

use std::sync::Weak;

use super::registry::{SharedTools, TOOL_HELP_NAME, TOOL_INDEX_NAME};
use super::{Tool, ToolFault};
use crate::application::agent::runtime::arguments;

const TOOL_INDEX_DESCRIPTION: &str = r#"List all available tools.

Example:
    <sysAction>view_tools()</sysAction>

Notes:
    - Shows tool names and brief descriptions
    - Use get_tool_info for detailed documentation"#;

const TOOL_HELP_DESCRIPTION: &str = r#"Get detailed documentation for a specific tool.

Arguments:
    tool_name: str - Name of the tool to get info about

Example:
    <sysAction>get_tool_info("bash")</sysAction>

Notes:
    - Shows full documentation including examples
    - Use view_tools to see list of available tools"#;

/// Lists every registered tool except the catalogue pair.
pub(super) struct ToolIndex {
    shared: Weak<SharedTools>,
}

impl ToolIndex {
    pub(super) fn new(shared: Weak<SharedTools>) -> Self {
        Self { shared }
    }
}

impl Tool for ToolIndex {
    fn name(&self) -> &str {
        TOOL_INDEX_NAME
    }

    fn description(&self) -> &str {
        TOOL_INDEX_DESCRIPTION
    }

    fn call(&self, _raw_args: &str) -> Result<String, ToolFault> {
        let shared = self
            .shared
            .upgrade()
            .ok_or_else(|| ToolFault::new("tool registry is no longer alive"))?;

        let mut listing = String::from("Available Tools:\n\n");
        for (name, summary) in shared.summaries() {
            listing.push_str(&format!("{name} - {summary}\n"));
        }
        Ok(listing)
    }
}

/// Returns the full usage text for one named tool.
pub(super) struct ToolHelp {
    shared: Weak<SharedTools>,
}

impl ToolHelp {
    pub(super) fn new(shared: Weak<SharedTools>) -> Self {
        Self { shared }
    }
}

impl Tool for ToolHelp {
    fn name(&self) -> &str {
        TOOL_HELP_NAME
    }

    fn description(&self) -> &str {
        TOOL_HELP_DESCRIPTION
    }

    fn call(&self, raw_args: &str) -> Result<String, ToolFault> {
        let shared = self
            .shared
            .upgrade()
            .ok_or_else(|| ToolFault::new("tool registry is no longer alive"))?;

        let name = arguments::positional(raw_args);
        if name.is_empty() {
            return Ok("Error: tool_name argument is required".to_string());
        }
        match shared.describe(name) {
            Some(documentation) => Ok(format!("Documentation for {name}:\n\n{documentation}")),
            None => Ok(format!("Error: Tool '{name}' not found")),
        }
    }
}
