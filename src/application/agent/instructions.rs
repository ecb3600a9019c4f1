use crate::application::tooling::ToolRegistry;

const BASE_PROMPT: &str = "You are a helpful AI assistant with access to system tools.";

const PROTOCOL_NOTES: &str = r#"To use a tool, emit a marker in your reply:
    <sysAction>tool_name(arguments)</sysAction>

Quote a single positional argument: <sysAction>bash("ls -la")</sysAction>
Tools taking several parameters use key="value" pairs:
    <sysAction>str_replace_editor(command="view", path="/path/to/file")</sysAction>

Call view_tools() to list tools and get_tool_info("name") for full usage of one tool.

Important Notes:
- One tool action at a time, wait for results
- Results come back in <sysActionResults> blocks, failures in <sysActionError> blocks
- Make sure paths are absolute (start with /)"#;

/// Builds the system turn: base instructions, the live tool catalogue, the
/// marker protocol, and any caller-supplied augmentation at the end.
pub fn compose_system_prompt(registry: &ToolRegistry, augmentation: Option<&str>) -> String {
    let mut prompt = String::from(BASE_PROMPT);

    prompt.push_str("\n\nAvailable Tools:\n\n");
    for (index, (name, summary)) in registry.list().iter().enumerate() {
        prompt.push_str(&format!("{}. {name} - {summary}\n", index + 1));
    }

    prompt.push('\n');
    prompt.push_str(PROTOCOL_NOTES);

    if let Some(extra) = augmentation {
        let extra = extra.trim();
        if !extra.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(extra);
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::tooling::{Tool, ToolFault};

    struct PingTool;

    impl Tool for PingTool {
        fn name(&self) -> &str {
            "ping"
        }

        fn description(&self) -> &str {
            "Reply with pong.\n\nTakes no arguments."
        }

        fn call(&self, _raw_args: &str) -> Result<String, ToolFault> {
            Ok("pong".to_string())
        }
    }

    #[test]
    fn catalogue_lists_registered_tools_with_summaries() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(PingTool)).expect("register");

        let prompt = compose_system_prompt(&registry, None);
        assert!(prompt.contains("1. ping - Reply with pong."));
        assert!(!prompt.contains("Takes no arguments."));
        assert!(prompt.contains("<sysAction>tool_name(arguments)</sysAction>"));
    }

    #[test]
    fn augmentation_lands_at_the_end() {
        let registry = ToolRegistry::new();
        let prompt = compose_system_prompt(&registry, Some("Be concise but thorough."));
        assert!(prompt.ends_with("Be concise but thorough."));

        let untouched = compose_system_prompt(&registry, Some("   "));
        assert!(untouched.ends_with(")"));
    }
}
