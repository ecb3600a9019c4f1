use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::debug;

use super::catalog::{ToolHelp, ToolIndex};
use super::{BashTool, StrReplaceEditor, Tool};

pub(super) const TOOL_INDEX_NAME: &str = "view_tools";
pub(super) const TOOL_HELP_NAME: &str = "get_tool_info";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a tool named '{0}' is already registered")]
    Duplicate(String),
    #[error("tool name '{0}' is not a valid action identifier")]
    InvalidName(String),
}

#[derive(Default)]
struct ToolTable {
    order: Vec<String>,
    by_name: HashMap<String, Arc<dyn Tool>>,
}

/// Shared view of the registered tools, also held (weakly) by the
/// catalogue tools so they can describe their siblings.
pub(super) struct SharedTools {
    table: RwLock<ToolTable>,
}

impl SharedTools {
    /// Registration-ordered (name, first description line) pairs. The two
    /// catalogue tools are left out of their own listing.
    pub(super) fn summaries(&self) -> Vec<(String, String)> {
        let table = self.table.read().expect("tool table lock");
        table
            .order
            .iter()
            .filter(|name| name.as_str() != TOOL_INDEX_NAME && name.as_str() != TOOL_HELP_NAME)
            .filter_map(|name| {
                table.by_name.get(name).map(|tool| {
                    let summary = tool.description().lines().next().unwrap_or("").to_string();
                    (name.clone(), summary)
                })
            })
            .collect()
    }

    pub(super) fn describe(&self, name: &str) -> Option<String> {
        let table = self.table.read().expect("tool table lock");
        table.by_name.get(name).map(|tool| tool.description().to_string())
    }
}

/// Name-keyed map of every capability the model may invoke. Dispatch looks
/// tools up by name, never by identity, and only in this closed map.
#[derive(Clone)]
pub struct ToolRegistry {
    shared: Arc<SharedTools>,
}

impl ToolRegistry {
    /// Creates a registry holding only the two reflexive catalogue tools,
    /// which go through the same registration path as everything else.
    pub fn new() -> Self {
        let shared = Arc::new(SharedTools {
            table: RwLock::new(ToolTable::default()),
        });
        let registry = Self { shared };
        registry
            .register(Arc::new(ToolIndex::new(Arc::downgrade(&registry.shared))))
            .expect("fresh registry accepts the catalogue tools");
        registry
            .register(Arc::new(ToolHelp::new(Arc::downgrade(&registry.shared))))
            .expect("fresh registry accepts the catalogue tools");
        registry
    }

    /// Registry preloaded with the bundled `bash` and `str_replace_editor`
    /// tools.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let registry = Self::new();
        registry.register(Arc::new(BashTool::new()))?;
        registry.register(Arc::new(StrReplaceEditor::new()))?;
        Ok(registry)
    }

    /// Adds a tool under its declared name. Duplicate names are rejected,
    /// so a later registration can never silently shadow an existing
    /// capability; names must stay within what a marker can express.
    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(RegistryError::InvalidName(name));
        }

        let mut table = self.shared.table.write().expect("tool table lock");
        if table.by_name.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        debug!(tool = %name, "Registered tool");
        table.order.push(name.clone());
        table.by_name.insert(name, tool);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let table = self.shared.table.read().expect("tool table lock");
        table.by_name.get(name).cloned()
    }

    /// Registration-ordered (name, one-line summary) pairs for the
    /// catalogue, excluding the catalogue tools themselves.
    pub fn list(&self) -> Vec<(String, String)> {
        self.shared.summaries()
    }

    /// Full usage text for any registered tool, catalogue tools included.
    pub fn describe(&self, name: &str) -> Option<String> {
        self.shared.describe(name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::ToolFault;
    use super::*;

    struct NamedTool {
        name: &'static str,
        description: &'static str,
    }

    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            self.description
        }

        fn call(&self, _raw_args: &str) -> Result<String, ToolFault> {
            Ok("ok".to_string())
        }
    }

    fn named(name: &'static str, description: &'static str) -> Arc<dyn Tool> {
        Arc::new(NamedTool { name, description })
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let registry = ToolRegistry::new();
        registry.register(named("probe", "First.")).expect("register");
        let err = registry.register(named("probe", "Second.")).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(name) if name == "probe"));
        // The original registration stays in place.
        assert_eq!(registry.describe("probe").as_deref(), Some("First."));
    }

    #[test]
    fn non_identifier_names_are_rejected() {
        let registry = ToolRegistry::new();
        let err = registry.register(named("bad name", "Spaces.")).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName(_)));
        let err = registry.register(named("", "Empty.")).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName(_)));
    }

    #[test]
    fn list_preserves_registration_order_and_hides_catalogue_tools() {
        let registry = ToolRegistry::new();
        registry
            .register(named("zeta", "Last letter first.\nMore detail."))
            .expect("register");
        registry.register(named("alpha", "First letter second.")).expect("register");

        let listed = registry.list();
        let names: Vec<_> = listed.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(listed[0].1, "Last letter first.");
    }

    #[test]
    fn describe_covers_catalogue_tools_too() {
        let registry = ToolRegistry::new();
        assert!(registry.describe(TOOL_INDEX_NAME).is_some());
        assert!(registry.describe(TOOL_HELP_NAME).is_some());
        assert!(registry.describe("missing").is_none());
    }

    #[test]
    fn view_tools_lists_siblings_but_not_itself() {
        let registry = ToolRegistry::with_builtins().expect("builtins");
        let index = registry.resolve(TOOL_INDEX_NAME).expect("view_tools registered");
        let listing = index.call("").expect("listing succeeds");
        assert!(listing.contains("bash"));
        assert!(listing.contains("str_replace_editor"));
        assert!(!listing.contains(TOOL_INDEX_NAME));
        assert!(!listing.contains(TOOL_HELP_NAME));
    }

    #[test]
    fn get_tool_info_returns_full_documentation() {
        let registry = ToolRegistry::with_builtins().expect("builtins");
        let help = registry.resolve(TOOL_HELP_NAME).expect("get_tool_info registered");

        let doc = help.call(r#""bash""#).expect("lookup succeeds");
        assert!(doc.starts_with("Documentation for bash:"));
        assert!(doc.contains("Execute a bash command"));

        let missing = help.call(r#""missing""#).expect("lookup returns error string");
        assert!(missing.starts_with("Error"));
    }
}
