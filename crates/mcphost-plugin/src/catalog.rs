//! Plugin catalog: the configured plugin definitions, in registration order.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::PluginError;

/// Declarative definition of a plugin, as read from configuration.
///
/// ```json
/// {
///   "name": "tagger",
///   "module": "plugin_request_tag",
///   "config": {"tag": "blue"},
///   "ctx_manager": "plugin_request_tag::RequestTagPlugin",
///   "static_callbacks": "plugin_request_tag::static_callbacks"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDef {
    /// Unique plugin name. Also used as the router mount prefix.
    pub name: String,
    /// Module the plugin lives in.
    pub module: String,
    /// Opaque configuration handed verbatim to the context constructor.
    #[serde(default = "empty_config")]
    pub config: serde_json::Value,
    /// Reference to the context object constructor (`module::Symbol`).
    pub ctx_manager: String,
    /// Reference to the static callback function (`module::symbol`).
    #[serde(default)]
    pub static_callbacks: Option<String>,
}

fn empty_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Append-only set of plugin definitions.
#[derive(Debug, Default)]
pub struct PluginCatalog {
    /// Definitions in registration order.
    plugins: Vec<PluginDef>,
}

impl PluginCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition.
    ///
    /// Fails with [`PluginError::PluginAlreadyRegistered`] if a definition
    /// with the same name exists.
    pub fn register_plugin(&mut self, plugin: PluginDef) -> Result<(), PluginError> {
        if self.contains(&plugin.name) {
            return Err(PluginError::PluginAlreadyRegistered(plugin.name));
        }

        info!(
            plugin = %plugin.name,
            module = %plugin.module,
            static_callbacks = plugin.static_callbacks.is_some(),
            "Plugin registered"
        );
        self.plugins.push(plugin);
        Ok(())
    }

    /// Gets a definition by name.
    pub fn get(&self, name: &str) -> Option<&PluginDef> {
        self.plugins.iter().find(|p| p.name == name)
    }

    /// Checks whether a definition with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PluginDef> {
        self.plugins.iter()
    }

    /// Returns the number of definitions.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns `true` when the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Loads the plugin definition list from a JSON file.
///
/// `None` means no plugins are configured.
pub fn load_plugins_config(path: Option<&Path>) -> Result<Vec<PluginDef>, PluginError> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let raw = std::fs::read_to_string(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to read plugins config");
        PluginError::Config(format!("cannot read '{}': {e}", path.display()))
    })?;

    let plugins: Vec<PluginDef> = serde_json::from_str(&raw).map_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to parse plugins config");
        PluginError::Config(format!("cannot parse '{}': {e}", path.display()))
    })?;

    info!(path = %path.display(), count = plugins.len(), "Plugins config loaded");
    Ok(plugins)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str) -> PluginDef {
        PluginDef {
            name: name.to_string(),
            module: "tests".to_string(),
            config: empty_config(),
            ctx_manager: "tests::Ctx".to_string(),
            static_callbacks: None,
        }
    }

    #[test]
    fn test_duplicate_plugin_rejected() {
        let mut catalog = PluginCatalog::new();
        catalog.register_plugin(def("p1")).expect("first");

        let err = catalog.register_plugin(def("p1")).expect_err("duplicate");
        assert!(matches!(err, PluginError::PluginAlreadyRegistered(ref name) if name == "p1"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_iteration_keeps_registration_order() {
        let mut catalog = PluginCatalog::new();
        for name in ["c", "a", "b"] {
            catalog.register_plugin(def(name)).expect("register");
        }
        let names: Vec<&str> = catalog.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_load_plugins_config_none_is_empty() {
        assert!(load_plugins_config(None).expect("empty").is_empty());
    }

    #[test]
    fn test_load_plugins_config_from_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("plugins.json");
        std::fs::write(
            &path,
            r#"[
                {
                    "name": "tagger",
                    "module": "plugin_request_tag",
                    "config": {"tag": "blue"},
                    "ctx_manager": "plugin_request_tag::RequestTagPlugin",
                    "static_callbacks": "plugin_request_tag::static_callbacks"
                },
                {
                    "name": "bare",
                    "module": "bare",
                    "ctx_manager": "bare::Ctx"
                }
            ]"#,
        )
        .expect("write");

        let plugins = load_plugins_config(Some(&path)).expect("load");
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[0].config["tag"], "blue");
        assert_eq!(
            plugins[0].static_callbacks.as_deref(),
            Some("plugin_request_tag::static_callbacks")
        );
        assert!(plugins[1].config.as_object().is_some_and(|m| m.is_empty()));
        assert!(plugins[1].static_callbacks.is_none());
    }

    #[test]
    fn test_load_plugins_config_malformed() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("plugins.json");
        std::fs::write(&path, "{\"name\": 1}").expect("write");

        let err = load_plugins_config(Some(&path)).expect_err("malformed");
        assert!(matches!(err, PluginError::Config(_)));
    }
}
