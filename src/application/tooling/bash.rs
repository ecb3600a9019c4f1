use std::process::Command;

use tracing::debug;

use super::{Tool, ToolFault};
use crate::application::agent::runtime::arguments;

const DESCRIPTION: &str = r#"Execute a bash command and return its output.

Arguments:
    command: str - The bash command to execute

Example:
    <sysAction>bash("ls -la")</sysAction>

Notes:
    - Command output and errors are returned as text
    - Commands run in the current working directory
    - One command at a time, wait for result before next command"#;

/// Shell command runner. A nonzero exit reports through the `Error` string
/// convention; a failure to spawn the shell at all raises a fault.
pub struct BashTool;

impl BashTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for BashTool {
    fn name(&self) -> &str {
        "bash"
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn call(&self, raw_args: &str) -> Result<String, ToolFault> {
        let command = arguments::positional(raw_args);
        debug!(%command, "Running shell command");
        let output = Command::new("sh").arg("-c").arg(command).output()?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Ok(format!(
                "Error: {}",
                String::from_utf8_lossy(&output.stderr)
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_on_success() {
        let output = BashTool::new().call(r#""echo hello""#).expect("spawns");
        assert_eq!(output, "hello\n");
    }

    #[test]
    fn nonzero_exit_reports_error_string() {
        let output = BashTool::new()
            .call(r#""echo oops >&2; exit 3""#)
            .expect("spawns");
        assert!(output.starts_with("Error"));
        assert!(output.contains("oops"));
    }
}
