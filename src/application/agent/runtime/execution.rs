use tracing::{debug, info, warn};

use super::{ActionRequest, ActionRuntime};

/// Normalized result of dispatching one action request. Feeds the next
/// synthetic turn and the caller-visible step record; never stored on its
/// own.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub tool: String,
    pub arguments: String,
    pub body: String,
    pub success: bool,
}

impl ActionRuntime {
    /// Resolves and invokes the named tool. Unknown names, `Error`-prefixed
    /// results and raised faults all fold into a failure outcome, so a bad
    /// action can never abort the conversation.
    pub fn dispatch(&self, request: &ActionRequest) -> ActionOutcome {
        let Some(tool) = self.registry.resolve(&request.name) else {
            warn!(action = %request.name, "Unknown action requested by model");
            return ActionOutcome {
                tool: request.name.clone(),
                arguments: request.raw_args.clone(),
                body: format!("Unknown action: {}", request.name),
                success: false,
            };
        };

        debug!(action = %request.name, "Dispatching action");
        let (body, success) = match tool.call(&request.raw_args) {
            Ok(result) if result.starts_with("Error") => (result, false),
            Ok(result) => (result, true),
            Err(fault) => (fault.to_string(), false),
        };
        info!(action = %request.name, success, "Action executed");

        ActionOutcome {
            tool: request.name.clone(),
            arguments: request.raw_args.clone(),
            body,
            success,
        }
    }

    /// Renders an outcome into the result block injected back into the
    /// conversation. Success and failure wrap in distinct marker pairs;
    /// both echo the original call so the model can match results to
    /// requests.
    pub fn render(&self, outcome: &ActionOutcome) -> String {
        let call = format!("{}({})", outcome.tool, outcome.arguments);
        if outcome.success {
            format!(
                "<sysActionResults>\n{call}\n\n[RESULT]:\n\n{}\n</sysActionResults>",
                outcome.body
            )
        } else {
            format!(
                "<sysActionError>\n{call}\n\n[ERROR]:\n\n{}\n</sysActionError>",
                outcome.body
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::parser;
    use super::*;
    use crate::application::tooling::{Tool, ToolFault, ToolRegistry};

    struct UpperTool;

    impl Tool for UpperTool {
        fn name(&self) -> &str {
            "upper"
        }

        fn description(&self) -> &str {
            "Uppercase the given text."
        }

        fn call(&self, raw_args: &str) -> Result<String, ToolFault> {
            Ok(super::super::arguments::positional(raw_args).to_uppercase())
        }
    }

    struct ErrorStringTool;

    impl Tool for ErrorStringTool {
        fn name(&self) -> &str {
            "errs"
        }

        fn description(&self) -> &str {
            "Always reports failure through the Error convention."
        }

        fn call(&self, _raw_args: &str) -> Result<String, ToolFault> {
            Ok("Error: boom".to_string())
        }
    }

    struct FaultingTool;

    impl Tool for FaultingTool {
        fn name(&self) -> &str {
            "faults"
        }

        fn description(&self) -> &str {
            "Always raises a fault."
        }

        fn call(&self, _raw_args: &str) -> Result<String, ToolFault> {
            Err(ToolFault::new("Error: boom"))
        }
    }

    fn runtime() -> ActionRuntime {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(UpperTool)).expect("register upper");
        registry.register(Arc::new(ErrorStringTool)).expect("register errs");
        registry.register(Arc::new(FaultingTool)).expect("register faults");
        ActionRuntime::new(registry)
    }

    fn request(text: &str) -> ActionRequest {
        parser::scan(text).next().expect("one marker")
    }

    #[test]
    fn success_wraps_in_result_block_and_echoes_call() {
        let runtime = runtime();
        let outcome = runtime.dispatch(&request(r#"<sysAction>upper("hi")</sysAction>"#));
        assert!(outcome.success);
        assert_eq!(outcome.body, "HI");

        let block = runtime.render(&outcome);
        assert!(block.starts_with("<sysActionResults>\nupper(\"hi\")\n\n[RESULT]:\n\n"));
        assert!(block.ends_with("</sysActionResults>"));
        assert!(block.contains("HI"));
    }

    #[test]
    fn unknown_action_fails_without_invoking_anything() {
        let runtime = runtime();
        let outcome = runtime.dispatch(&request("<sysAction>bogus()</sysAction>"));
        assert!(!outcome.success);
        assert_eq!(outcome.body, "Unknown action: bogus");

        let block = runtime.render(&outcome);
        assert!(block.starts_with("<sysActionError>"));
        assert!(block.contains("Unknown action: bogus"));
    }

    #[test]
    fn error_string_and_raised_fault_render_identically() {
        let runtime = runtime();
        let via_string = runtime.dispatch(&request("<sysAction>errs()</sysAction>"));
        let via_fault = runtime.dispatch(&request("<sysAction>faults()</sysAction>"));

        assert!(!via_string.success);
        assert!(!via_fault.success);

        let string_block = runtime.render(&via_string).replace("errs", "tool");
        let fault_block = runtime.render(&via_fault).replace("faults", "tool");
        assert_eq!(string_block, fault_block);
        assert!(string_block.contains("[ERROR]:"));
    }
}
