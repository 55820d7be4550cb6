//! Plugin router mounting.
//!
//! Routers arrive through the `host.routers` hook during the static pass,
//! before the listener opens, and are nested under `/{plugin_name}` right
//! away. A router that cannot be mounted is rejected while no plugin is
//! live yet.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use axum::Router;
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use mcphost_plugin::{HookInfo, PluginError, PluginManager};

/// Hook through which plugins contribute routers.
pub const ROUTERS_HOOK: &str = "host.routers";

/// Builds a plugin's router.
pub type RouterCallback = Arc<dyn Fn() -> Router + Send + Sync>;

#[derive(Default)]
struct Mounted {
    router: Router,
    plugins: Vec<String>,
}

/// Mounts plugin routers under their plugin names.
#[derive(Default)]
pub struct RouterMount {
    mounted: RwLock<Mounted>,
}

impl RouterMount {
    /// Create an empty mount
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the plugin's router and nest it under `/{plugin_name}`.
    ///
    /// Returns `false` when the name is not a single literal path segment,
    /// or when building or nesting the router fails.
    pub fn static_register_plugin(&self, callback: RouterCallback, plugin_name: &str) -> bool {
        if !is_mountable(plugin_name) {
            warn!(plugin = %plugin_name, "Plugin name cannot be used as a path segment, router not mounted");
            return false;
        }

        let prefix = format!("/{plugin_name}");
        let mut mounted = self.mounted.write();
        let current = mounted.router.clone();
        let nested = panic::catch_unwind(AssertUnwindSafe(|| current.nest(&prefix, callback())));

        match nested {
            Ok(router) => {
                mounted.router = router;
                mounted.plugins.push(plugin_name.to_string());
                info!(plugin = %plugin_name, prefix = %prefix, "Mounted plugin router");
                true
            }
            Err(_) => {
                error!(plugin = %plugin_name, prefix = %prefix, "Failed to mount plugin router");
                false
            }
        }
    }

    /// Dynamic pass counterpart. Routers are only mounted statically.
    pub fn register_plugin(&self, _callback: RouterCallback, plugin_name: &str) -> bool {
        debug!(plugin = %plugin_name, "Ignoring router outside the static pass");
        true
    }

    /// Declare [`ROUTERS_HOOK`] on the plugin manager.
    pub fn register_hook(self: &Arc<Self>, plugins: &mut PluginManager) -> Result<(), PluginError> {
        let dynamic = Arc::clone(self);
        let mount = Arc::clone(self);
        plugins.register_hookable(
            HookInfo::new(
                ROUTERS_HOOK,
                move |callback: RouterCallback, _hook: &str, plugin: &str| {
                    let accepted = dynamic.register_plugin(callback, plugin);
                    async move { accepted }
                },
            )
            .with_static_register(move |callback: RouterCallback, _hook: &str, plugin: &str| {
                mount.static_register_plugin(callback, plugin)
            }),
        )
    }

    /// Plugins with a mounted router, in mount order
    pub fn plugin_names(&self) -> Vec<String> {
        self.mounted.read().plugins.clone()
    }

    /// Router with every mounted plugin router.
    pub fn router(&self) -> Router {
        self.mounted.read().router.clone()
    }
}

/// Whether `name` can be nested as one literal path segment.
fn is_mountable(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with([':', '*'])
        && !name.contains(['/', '{', '}'])
}

impl std::fmt::Debug for RouterMount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterMount")
            .field("plugins", &self.plugin_names())
            .finish()
    }
}
