//! Plugin context objects: the live, resource-scoped side of a plugin.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::callbacks::Callbacks;

/// Facts about the host handed to every plugin constructor.
///
/// Plugins read these values from here rather than from process-wide
/// state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    /// Externally reachable base URL of the host, without trailing slash.
    pub base_url: String,
}

impl HostInfo {
    /// Creates host info for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Returns the public URL of a plugin's mounted router.
    pub fn plugin_url(&self, mount_prefix: &str, plugin_name: &str) -> String {
        format!("{}{}/{}", self.base_url, mount_prefix, plugin_name)
    }
}

/// A constructed plugin whose resources live between [`enter`] and
/// [`exit`].
///
/// The plugin manager enters each context once, asks the live instance
/// for its [`Callbacks`], and exits it exactly once during teardown, in
/// reverse order of entry.
///
/// [`enter`]: PluginContext::enter
/// [`exit`]: PluginContext::exit
#[async_trait]
pub trait PluginContext: Send + Sync {
    /// Acquires the plugin's resources (connections, tasks, handles).
    async fn enter(&mut self) -> Result<(), String> {
        Ok(())
    }

    /// Releases the resources acquired by [`enter`](PluginContext::enter).
    async fn exit(&mut self) -> Result<(), String> {
        Ok(())
    }

    /// Returns a fresh set of callbacks to wire into hooks.
    fn callbacks(&self) -> Callbacks;
}
