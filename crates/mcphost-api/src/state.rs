//! Application state shared across all handlers and middleware.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use mcphost_core::config::AppConfig;
use mcphost_plugin::{PluginManager, PluginStatus, RegistryState};
use mcphost_tools::ToolManagerPlugin;

use crate::hooks::{MiddlewareChain, RouterMount};

/// Plugin registry diagnostics captured once plugins are entered.
#[derive(Debug, Clone)]
pub struct PluginSnapshot {
    /// Registry state at capture time
    pub state: RegistryState,
    /// Per-plugin status, in registration order
    pub statuses: Vec<PluginStatus>,
    /// Hook name → plugins wired into it
    pub hooks: BTreeMap<String, Vec<String>>,
}

impl PluginSnapshot {
    /// Capture the manager's current diagnostics.
    pub fn capture(manager: &PluginManager) -> Self {
        let hooks = manager
            .hooks()
            .names()
            .into_iter()
            .map(|hook| {
                let plugins = manager.hooked_plugins(&hook).to_vec();
                (hook, plugins)
            })
            .collect();

        Self {
            state: manager.state(),
            statuses: manager.statuses(),
            hooks,
        }
    }
}

/// Application state.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Plugin diagnostics
    pub plugins: Arc<PluginSnapshot>,
    /// Plugin middleware chain
    pub middlewares: Arc<MiddlewareChain>,
    /// Plugin routers
    pub routers: Arc<RouterMount>,
    /// Tool aggregation
    pub tools: Arc<ToolManagerPlugin>,
    /// Server start time
    pub started_at: Instant,
}
