use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::{Tool, ToolFault};
use crate::application::agent::runtime::arguments;

const DESCRIPTION: &str = r#"Edit files with various commands.

Commands:
1. view - View file contents
   Required: path
   Optional: view_range=[start,end]
   Example: <sysAction>str_replace_editor(command="view", path="/path/to/file")</sysAction>

2. create - Create new file
   Required: path, file_text
   Example: <sysAction>str_replace_editor(command="create", path="/path/to/file", file_text="content")</sysAction>

3. str_replace - Replace text in file
   Required: path, old_str, new_str
   Example: <sysAction>str_replace_editor(command="str_replace", path="/path/to/file", old_str="old", new_str="new")</sysAction>

4. insert - Insert text at line
   Required: path, insert_line, new_str
   Example: <sysAction>str_replace_editor(command="insert", path="/path/to/file", insert_line=5, new_str="new line")</sysAction>

5. undo_edit - Revert the last str_replace or insert on a file
   Required: path
   Example: <sysAction>str_replace_editor(command="undo_edit", path="/path/to/file")</sysAction>

Notes:
- All paths must be absolute (start with /)
- str_replace requires EXACT match of old_str
- One command at a time
- Wait for results before next command"#;

type Params = BTreeMap<String, String>;

/// File editing tool. User-level problems (missing parameters, missing
/// files, no match) report through the `Error` string convention;
/// filesystem faults raise.
pub struct StrReplaceEditor {
    // Pre-edit contents per path, most recent last.
    undo_stack: Mutex<HashMap<PathBuf, Vec<String>>>,
}

impl StrReplaceEditor {
    pub fn new() -> Self {
        Self {
            undo_stack: Mutex::new(HashMap::new()),
        }
    }

    fn view(&self, params: &Params) -> Result<String, ToolFault> {
        let Some(path) = params.get("path") else {
            return Ok("Error: path parameter is required".to_string());
        };
        let path = Path::new(path);
        if !path.exists() {
            return Ok(format!("Error: {} does not exist", path.display()));
        }
        if !path.is_file() {
            let mut entries = Vec::new();
            collect_visible(path, &mut entries)?;
            return Ok(entries.join("\n"));
        }

        let content = fs::read_to_string(path)?;
        let Some(range) = params.get("view_range") else {
            return Ok(content);
        };
        let Ok(bounds) = serde_json::from_str::<Vec<usize>>(range) else {
            return Ok("Error: Invalid view_range format".to_string());
        };
        let (start, end) = match bounds[..] {
            [start, end] if start >= 1 && start <= end => (start, end),
            _ => return Ok("Error: Invalid view_range format".to_string()),
        };
        let lines: Vec<&str> = content.lines().collect();
        let end = end.min(lines.len());
        let start = (start - 1).min(end);
        Ok(lines[start..end].join("\n"))
    }

    fn create(&self, params: &Params) -> Result<String, ToolFault> {
        let (Some(path), Some(file_text)) = (params.get("path"), params.get("file_text")) else {
            return Ok("Error: path and file_text parameters are required".to_string());
        };
        let path = Path::new(path);
        if path.exists() {
            return Ok(format!("Error: {} already exists", path.display()));
        }
        fs::write(path, file_text)?;
        debug!(path = %path.display(), "Created file");
        Ok(format!("Created {}", path.display()))
    }

    fn str_replace(&self, params: &Params) -> Result<String, ToolFault> {
        let (Some(path), Some(old_str), Some(new_str)) = (
            params.get("path"),
            params.get("old_str"),
            params.get("new_str"),
        ) else {
            return Ok("Error: path, old_str, and new_str parameters are required".to_string());
        };
        let path = Path::new(path);
        if !path.exists() {
            return Ok(format!("Error: {} does not exist", path.display()));
        }
        let content = fs::read_to_string(path)?;
        if !content.contains(old_str.as_str()) {
            return Ok("Error: old_str not found exactly as specified".to_string());
        }
        self.snapshot(path, &content);
        fs::write(path, content.replace(old_str.as_str(), new_str))?;
        debug!(path = %path.display(), "Replaced file content");
        Ok(format!("Replaced content in {}", path.display()))
    }

    fn insert(&self, params: &Params) -> Result<String, ToolFault> {
        let (Some(path), Some(insert_line), Some(new_str)) = (
            params.get("path"),
            params.get("insert_line"),
            params.get("new_str"),
        ) else {
            return Ok("Error: path, insert_line, and new_str parameters are required".to_string());
        };
        let path = Path::new(path);
        if !path.exists() {
            return Ok(format!("Error: {} does not exist", path.display()));
        }
        let Ok(insert_line) = insert_line.parse::<usize>() else {
            return Ok("Error: insert_line must be an integer".to_string());
        };
        let content = fs::read_to_string(path)?;
        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        if insert_line > lines.len() {
            return Ok(format!(
                "Error: insert_line must be between 0 and {}",
                lines.len()
            ));
        }
        self.snapshot(path, &content);
        lines.insert(insert_line, new_str.clone());
        fs::write(path, lines.join("\n"))?;
        debug!(path = %path.display(), line = insert_line, "Inserted file content");
        Ok(format!(
            "Inserted content at line {insert_line} in {}",
            path.display()
        ))
    }

    fn undo_edit(&self, params: &Params) -> Result<String, ToolFault> {
        let Some(path) = params.get("path") else {
            return Ok("Error: path parameter is required".to_string());
        };
        let path = Path::new(path);
        let previous = {
            let mut stack = self.undo_stack.lock().expect("undo stack lock");
            stack.get_mut(path).and_then(Vec::pop)
        };
        let Some(previous) = previous else {
            return Ok(format!("Error: no edits to undo for {}", path.display()));
        };
        fs::write(path, previous)?;
        debug!(path = %path.display(), "Reverted last edit");
        Ok(format!("Reverted last edit to {}", path.display()))
    }

    fn snapshot(&self, path: &Path, content: &str) {
        let mut stack = self.undo_stack.lock().expect("undo stack lock");
        stack
            .entry(path.to_path_buf())
            .or_default()
            .push(content.to_string());
    }
}

impl Tool for StrReplaceEditor {
    fn name(&self) -> &str {
        "str_replace_editor"
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn call(&self, raw_args: &str) -> Result<String, ToolFault> {
        let params = match arguments::parse_named(raw_args) {
            Ok(params) => params,
            Err(error) => return Ok(format!("Error: {error}")),
        };
        let Some(command) = params.get("command") else {
            return Ok("Error: command parameter is required".to_string());
        };
        match command.as_str() {
            "view" => self.view(&params),
            "create" => self.create(&params),
            "str_replace" => self.str_replace(&params),
            "insert" => self.insert(&params),
            "undo_edit" => self.undo_edit(&params),
            other => Ok(format!("Error: Unknown command {other}")),
        }
    }
}

/// Recursive directory listing, hidden entries skipped.
fn collect_visible(dir: &Path, entries: &mut Vec<String>) -> Result<(), ToolFault> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('.'));
        if hidden {
            continue;
        }
        entries.push(path.display().to_string());
        if path.is_dir() {
            collect_visible(&path, entries)?;
        }
    }
    Ok(())
}
