//! Plugin system configuration.

use serde::{Deserialize, Serialize};

/// Plugin system configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Path to the JSON file listing plugin definitions.
    ///
    /// When unset the host starts without plugins.
    #[serde(default)]
    pub config_path: Option<String>,
}
