//! Tool aggregation across static registrations, plugin callbacks, and the
//! local tool set.
//!
//! Registration happens while plugins are wired at startup; afterwards
//! [`ToolManagerPlugin::get_tools`] is called concurrently by request
//! handlers. Callbacks run outside the lock, so a provider may be slow or
//! fail without blocking other readers.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use mcphost_core::error::AppError;
use mcphost_plugin::{HookInfo, PluginError, PluginManager};

use crate::local::local_tools;
use crate::tool::Tool;

/// Hook through which plugins contribute tool providers.
pub const TOOLS_HOOK: &str = "host.tools.get_tools";

/// A plugin-supplied tool provider, called on every listing.
pub type ToolCallback = Arc<dyn Fn() -> Result<Vec<Arc<dyn Tool>>, AppError> + Send + Sync>;

/// Collects tools from every contributor into one list.
#[derive(Default)]
pub struct ToolManagerPlugin {
    /// Statically registered tools
    tools: RwLock<Vec<Arc<dyn Tool>>>,
    /// Provider callbacks with the name of the plugin that registered them
    callbacks: RwLock<Vec<(ToolCallback, String)>>,
    /// Local tool set, when set up
    local_tools: RwLock<Option<Vec<Arc<dyn Tool>>>>,
}

impl ToolManagerPlugin {
    /// Create an empty tool manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register static tools
    pub fn register_tools(&self, tools: Vec<Arc<dyn Tool>>) {
        info!(count = tools.len(), "Registered static tools");
        self.tools.write().extend(tools);
    }

    /// Register a tool provider callback
    pub fn register_callback(&self, callback: ToolCallback, plugin_name: &str) -> bool {
        self.callbacks
            .write()
            .push((callback, plugin_name.to_string()));
        info!(plugin = %plugin_name, "Registered tool callback");
        true
    }

    /// Register a provider delivered through a hook.
    ///
    /// Rejects the callback when `hook_name` is not [`TOOLS_HOOK`].
    pub fn register_plugin(&self, callback: ToolCallback, hook_name: &str, plugin_name: &str) -> bool {
        if hook_name != TOOLS_HOOK {
            warn!(hook = %hook_name, plugin = %plugin_name, "Unknown hook name for tool provider");
            return false;
        }
        self.register_callback(callback, plugin_name)
    }

    /// Set up the local tool set
    pub fn setup_local_tools(&self) {
        let tools = local_tools();
        info!(count = tools.len(), "Local tools initialized");
        *self.local_tools.write() = Some(tools);
    }

    /// Whether the local tool set is available
    pub fn has_local_tools(&self) -> bool {
        self.local_tools.read().is_some()
    }

    /// Build the hook declaration that feeds this manager.
    pub fn hook_info(self: &Arc<Self>, hook_name: &str) -> HookInfo<ToolCallback> {
        let manager = Arc::clone(self);
        HookInfo::new(
            hook_name,
            move |callback: ToolCallback, hook: &str, plugin: &str| {
                let accepted = manager.register_plugin(callback, hook, plugin);
                async move { accepted }
            },
        )
    }

    /// Declare [`TOOLS_HOOK`] on the plugin manager.
    pub fn register_hook(self: &Arc<Self>, plugins: &mut PluginManager) -> Result<(), PluginError> {
        plugins.register_hookable(self.hook_info(TOOLS_HOOK))
    }

    /// Get every tool: static tools, then each provider's tools, then the
    /// local set when requested.
    ///
    /// A provider that fails or panics is logged and skipped.
    pub fn get_tools(&self, include_local: bool) -> Vec<Arc<dyn Tool>> {
        let mut tools = self.tools.read().clone();

        let callbacks = self.callbacks.read().clone();
        for (callback, plugin_name) in &callbacks {
            match panic::catch_unwind(AssertUnwindSafe(|| callback())) {
                Ok(Ok(provided)) => {
                    debug!(plugin = %plugin_name, count = provided.len(), "Got tools from callback");
                    tools.extend(provided);
                }
                Ok(Err(e)) => {
                    error!(plugin = %plugin_name, error = %e, "Error getting tools from callback");
                }
                Err(_) => {
                    error!(plugin = %plugin_name, "Tool callback panicked");
                }
            }
        }

        if include_local && let Some(local) = self.local_tools.read().as_ref() {
            tools.extend(local.iter().cloned());
        }

        tools
    }

    /// Find a tool by name
    pub fn find_tool(&self, name: &str, include_local: bool) -> Option<Arc<dyn Tool>> {
        self.get_tools(include_local)
            .into_iter()
            .find(|tool| tool.name() == name)
    }

    /// Number of static and provider tools, excluding the local set
    pub fn tool_count(&self) -> usize {
        self.get_tools(false).len()
    }

    /// Number of registered provider callbacks
    pub fn callback_count(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Remove static tools and provider callbacks. The local set is kept.
    pub fn clear(&self) {
        self.tools.write().clear();
        self.callbacks.write().clear();
    }
}

impl std::fmt::Debug for ToolManagerPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plugins: Vec<String> = self
            .callbacks
            .read()
            .iter()
            .map(|(_, plugin)| plugin.clone())
            .collect();
        f.debug_struct("ToolManagerPlugin")
            .field("tools", &self.tools.read().len())
            .field("callbacks", &plugins)
            .field("local_tools", &self.has_local_tools())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;

    #[derive(Debug)]
    struct Named(&'static str);

    #[async_trait]
    impl Tool for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test tool"
        }

        async fn call(&self, args: Value) -> Result<Value, AppError> {
            Ok(args)
        }
    }

    fn provider(names: &'static [&'static str]) -> ToolCallback {
        Arc::new(move || -> Result<Vec<Arc<dyn Tool>>, AppError> {
            Ok(names
                .iter()
                .map(|name| Arc::new(Named(name)) as Arc<dyn Tool>)
                .collect())
        })
    }

    fn names(tools: &[Arc<dyn Tool>]) -> Vec<String> {
        tools.iter().map(|t| t.name().to_string()).collect()
    }

    #[test]
    fn test_get_tools_order() {
        let manager = ToolManagerPlugin::new();
        manager.register_tools(vec![Arc::new(Named("static")) as Arc<dyn Tool>]);
        manager.register_callback(provider(&["a1", "a2"]), "a");
        manager.register_callback(provider(&["b1"]), "b");
        manager.setup_local_tools();

        assert_eq!(names(&manager.get_tools(false)), vec!["static", "a1", "a2", "b1"]);
        assert_eq!(
            names(&manager.get_tools(true)),
            vec!["static", "a1", "a2", "b1", "echo"]
        );
    }

    #[test]
    fn test_failing_callback_is_skipped() {
        let manager = ToolManagerPlugin::new();
        manager.register_callback(provider(&["first"]), "good1");
        manager.register_callback(
            Arc::new(|| -> Result<Vec<Arc<dyn Tool>>, AppError> {
                Err(AppError::tool("provider offline"))
            }),
            "broken",
        );
        manager.register_callback(
            Arc::new(|| -> Result<Vec<Arc<dyn Tool>>, AppError> { panic!("provider bug") }),
            "panicky",
        );
        manager.register_callback(provider(&["last"]), "good2");

        assert_eq!(names(&manager.get_tools(false)), vec!["first", "last"]);
        assert_eq!(manager.tool_count(), 2);
    }

    #[test]
    fn test_local_tools_only_when_set_up() {
        let manager = ToolManagerPlugin::new();
        assert!(manager.get_tools(true).is_empty());
        manager.setup_local_tools();
        assert!(manager.find_tool("echo", true).is_some());
        assert!(manager.find_tool("echo", false).is_none());
    }

    #[test]
    fn test_register_plugin_rejects_wrong_hook() {
        let manager = ToolManagerPlugin::new();
        assert!(!manager.register_plugin(provider(&["x"]), "host.tools.other", "p"));
        assert_eq!(manager.callback_count(), 0);
        assert!(manager.register_plugin(provider(&["x"]), TOOLS_HOOK, "p"));
        assert_eq!(manager.callback_count(), 1);
    }

    #[test]
    fn test_clear_keeps_local_tools() {
        let manager = ToolManagerPlugin::new();
        manager.register_tools(vec![Arc::new(Named("static")) as Arc<dyn Tool>]);
        manager.register_callback(provider(&["a"]), "a");
        manager.setup_local_tools();

        manager.clear();
        assert_eq!(manager.tool_count(), 0);
        assert_eq!(names(&manager.get_tools(true)), vec!["echo"]);
    }
}
