//! Plugin manager: wires plugin callbacks into hooks and owns plugin
//! lifetimes.
//!
//! Lifecycle: `Configuring → Entered → Closed`.
//!
//! - While `Configuring`, subsystems declare hooks and configuration
//!   registers plugin definitions.
//! - [`PluginManager::static_pass`] feeds every plugin's static callbacks
//!   to their hooks. It needs no plugin instance and runs before the host
//!   opens its listener.
//! - [`PluginManager::enter`] constructs and enters each plugin in
//!   registration order, pushing it onto a release stack, then wires the
//!   live instance's callbacks. Any fatal failure releases what was
//!   already entered, newest first, and closes the manager.
//! - [`PluginManager::exit`] releases the stack newest first, logging and
//!   skipping individual release failures.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::callbacks::Callbacks;
use crate::catalog::{PluginCatalog, PluginDef};
use crate::context::{HostInfo, PluginContext};
use crate::error::PluginError;
use crate::hooks::info::{Delivery, HookInfo};
use crate::hooks::table::HookTable;
use crate::loader::PluginLoader;

/// Lifecycle state of the plugin manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryState {
    /// Hooks and plugins may be registered.
    Configuring,
    /// Plugins are live; configuration is frozen.
    Entered,
    /// Terminal. Plugins are released; diagnostics remain readable.
    Closed,
}

impl fmt::Display for RegistryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuring => write!(f, "configuring"),
            Self::Entered => write!(f, "entered"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Lifecycle state of a single plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    /// Registered, not yet entered.
    Configured,
    /// Entered and wired.
    Active,
    /// Released after being active.
    Released,
    /// Failed to load or wire.
    Failed,
}

/// Diagnostic record for one plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginStatus {
    /// Plugin name.
    pub name: String,
    /// Module the plugin came from.
    pub module: String,
    /// Current state.
    pub state: PluginState,
    /// Hooks that accepted one of this plugin's callbacks, in wiring order.
    pub hooks: Vec<String>,
    /// Callback entries a hook declined, as `label@hook`.
    pub rejected: Vec<String>,
    /// When the plugin's context was entered.
    pub entered_at: Option<DateTime<Utc>>,
    /// Last error observed for this plugin.
    pub error: Option<String>,
}

impl PluginStatus {
    fn new(plugin: &PluginDef) -> Self {
        Self {
            name: plugin.name.clone(),
            module: plugin.module.clone(),
            state: PluginState::Configured,
            hooks: Vec::new(),
            rejected: Vec::new(),
            entered_at: None,
            error: None,
        }
    }
}

/// Which registration capability a pass uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Static,
    Dynamic,
}

/// An entered plugin context awaiting release.
struct LivePlugin {
    name: String,
    context: Box<dyn PluginContext>,
}

/// Orchestrates hook declaration, plugin registration, and the scoped
/// plugin lifecycle.
pub struct PluginManager {
    /// Declared hooks.
    hooks: HookTable,
    /// Configured plugins.
    catalog: PluginCatalog,
    /// Resolves definition references to constructors.
    loader: PluginLoader,
    /// Host facts passed to constructors.
    host: HostInfo,
    /// Entered contexts, oldest first.
    live: Vec<LivePlugin>,
    /// Plugin name → diagnostics.
    statuses: HashMap<String, PluginStatus>,
    /// Hook name → plugins wired into it, in wiring order.
    hooked_plugins: HashMap<String, Vec<String>>,
    /// Lifecycle state.
    state: RegistryState,
    /// Whether the static pass has run.
    static_done: bool,
}

impl PluginManager {
    /// Creates a manager resolving plugins through `loader`.
    pub fn new(loader: PluginLoader, host: HostInfo) -> Self {
        Self {
            hooks: HookTable::new(),
            catalog: PluginCatalog::new(),
            loader,
            host,
            live: Vec::new(),
            statuses: HashMap::new(),
            hooked_plugins: HashMap::new(),
            state: RegistryState::Configuring,
            static_done: false,
        }
    }

    /// Declares a hook plugins can attach to.
    pub fn register_hookable<C>(&mut self, hook_info: HookInfo<C>) -> Result<(), PluginError>
    where
        C: Any + Send + Sync,
    {
        self.require(RegistryState::Configuring)?;
        self.hooks.register_hookable(hook_info)
    }

    /// Registers a plugin definition.
    ///
    /// Nothing is resolved or constructed here; that happens during the
    /// static and dynamic passes.
    pub fn register_plugin(&mut self, plugin: PluginDef) -> Result<(), PluginError> {
        self.require(RegistryState::Configuring)?;
        let status = PluginStatus::new(&plugin);
        self.catalog.register_plugin(plugin)?;
        self.statuses.insert(status.name.clone(), status);
        Ok(())
    }

    /// Runs the static pass.
    ///
    /// For every plugin naming a static-callback function, calls it and
    /// delivers each entry through its hook's static register (or the
    /// dynamic one when the hook has no static register). One-shot; a
    /// fatal error closes the manager.
    pub async fn static_pass(&mut self) -> Result<(), PluginError> {
        self.require(RegistryState::Configuring)?;
        if self.static_done {
            return Err(PluginError::InvalidState {
                expected: RegistryState::Configuring,
                actual: self.state,
            });
        }
        self.static_done = true;

        let plugins: Vec<PluginDef> = self.catalog.iter().cloned().collect();
        for plugin in &plugins {
            if let Err(e) = self.static_wire(plugin).await {
                error!(plugin = %plugin.name, error = %e, "Static pass failed");
                self.mark_failed(&plugin.name, &e);
                self.state = RegistryState::Closed;
                return Err(e);
            }
        }

        info!(plugins = plugins.len(), "Static plugin pass complete");
        Ok(())
    }

    /// Enters every plugin and wires its callbacks.
    ///
    /// Runs the static pass first if it has not run yet. On a fatal error
    /// every already entered plugin is released, newest first, the
    /// manager becomes `Closed`, and the error is returned.
    pub async fn enter(&mut self) -> Result<(), PluginError> {
        self.require(RegistryState::Configuring)?;
        if !self.static_done {
            self.static_pass().await?;
        }

        let plugins: Vec<PluginDef> = self.catalog.iter().cloned().collect();
        for plugin in &plugins {
            if let Err(e) = self.enter_plugin(plugin).await {
                error!(plugin = %plugin.name, error = %e, "Plugin failed to enter, unwinding");
                self.mark_failed(&plugin.name, &e);
                self.release_all().await;
                self.state = RegistryState::Closed;
                return Err(e);
            }
        }

        self.state = RegistryState::Entered;
        info!(plugins = self.live.len(), "All plugins entered");
        Ok(())
    }

    /// Releases every entered plugin, newest first, and closes the manager.
    ///
    /// Release failures are logged and recorded; they never stop the
    /// remaining releases.
    pub async fn exit(&mut self) -> Result<(), PluginError> {
        self.require(RegistryState::Entered)?;
        self.release_all().await;
        self.state = RegistryState::Closed;
        info!("Plugin manager closed");
        Ok(())
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> RegistryState {
        self.state
    }

    /// Returns the declared hooks.
    pub fn hooks(&self) -> &HookTable {
        &self.hooks
    }

    /// Returns the configured plugins.
    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }

    /// Returns the host info handed to constructors.
    pub fn host(&self) -> &HostInfo {
        &self.host
    }

    /// Returns the number of currently entered plugins.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Returns the plugins wired into a hook, in wiring order.
    pub fn hooked_plugins(&self, hook_name: &str) -> &[String] {
        self.hooked_plugins
            .get(hook_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns a plugin's diagnostics.
    pub fn status(&self, plugin_name: &str) -> Option<&PluginStatus> {
        self.statuses.get(plugin_name)
    }

    /// Returns diagnostics for every plugin in registration order.
    pub fn statuses(&self) -> Vec<PluginStatus> {
        self.catalog
            .iter()
            .filter_map(|plugin| self.statuses.get(&plugin.name).cloned())
            .collect()
    }

    fn require(&self, expected: RegistryState) -> Result<(), PluginError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(PluginError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }

    async fn static_wire(&mut self, plugin: &PluginDef) -> Result<(), PluginError> {
        let Some(static_callbacks) = self.loader.resolve_static_callbacks(plugin)? else {
            return Ok(());
        };

        let callbacks = static_callbacks();
        debug!(plugin = %plugin.name, count = callbacks.len(), "Wiring static callbacks");
        self.wire(&plugin.name, callbacks, Pass::Static).await
    }

    async fn enter_plugin(&mut self, plugin: &PluginDef) -> Result<(), PluginError> {
        let factory = self.loader.resolve_ctx_manager(plugin)?;
        let mut context = factory(&plugin.config, &self.host)
            .map_err(|e| PluginError::load(&plugin.name, format!("constructor failed: {e}")))?;

        context
            .enter()
            .await
            .map_err(|e| PluginError::load(&plugin.name, format!("enter failed: {e}")))?;

        let callbacks = context.callbacks();
        self.live.push(LivePlugin {
            name: plugin.name.clone(),
            context,
        });
        if let Some(status) = self.statuses.get_mut(&plugin.name) {
            status.state = PluginState::Active;
            status.entered_at = Some(Utc::now());
        }
        info!(plugin = %plugin.name, callbacks = callbacks.len(), "Plugin entered");

        self.wire(&plugin.name, callbacks, Pass::Dynamic).await
    }

    async fn wire(
        &mut self,
        plugin_name: &str,
        callbacks: Callbacks,
        pass: Pass,
    ) -> Result<(), PluginError> {
        for (label, entry) in callbacks {
            let hook = self.hooks.resolve(&entry.hook_name).inspect_err(|_| {
                warn!(
                    plugin = %plugin_name,
                    hook = %entry.hook_name,
                    label = %label,
                    "Hook point not registered"
                );
            })?;

            let delivery = match pass {
                Pass::Static => hook.static_register(&label, entry.callback, plugin_name).await?,
                Pass::Dynamic => hook.register(&label, entry.callback, plugin_name).await?,
            };

            let status = self.statuses.get_mut(plugin_name);
            match delivery {
                Delivery::Accepted => {
                    debug!(plugin = %plugin_name, hook = %entry.hook_name, label = %label, ?pass, "Callback wired");
                    self.hooked_plugins
                        .entry(entry.hook_name.clone())
                        .or_default()
                        .push(plugin_name.to_string());
                    if let Some(status) = status {
                        status.hooks.push(entry.hook_name);
                    }
                }
                Delivery::Rejected => {
                    warn!(plugin = %plugin_name, hook = %entry.hook_name, label = %label, ?pass, "Hook rejected callback");
                    if let Some(status) = status {
                        status.rejected.push(format!("{label}@{}", entry.hook_name));
                    }
                }
            }
        }
        Ok(())
    }

    async fn release_all(&mut self) {
        while let Some(mut live) = self.live.pop() {
            let result = live.context.exit().await;
            let status = self.statuses.get_mut(&live.name);
            match result {
                Ok(()) => {
                    info!(plugin = %live.name, "Plugin released");
                    if let Some(status) = status.filter(|s| s.state == PluginState::Active) {
                        status.state = PluginState::Released;
                    }
                }
                Err(e) => {
                    error!(plugin = %live.name, error = %e, "Plugin release failed");
                    if let Some(status) = status {
                        if status.state == PluginState::Active {
                            status.state = PluginState::Released;
                        }
                        status.error = Some(format!("exit failed: {e}"));
                    }
                }
            }
        }
    }

    fn mark_failed(&mut self, plugin_name: &str, err: &PluginError) {
        if let Some(status) = self.statuses.get_mut(plugin_name) {
            status.state = PluginState::Failed;
            status.error = Some(err.to_string());
        }
    }
}

impl fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let live: Vec<&str> = self.live.iter().map(|p| p.name.as_str()).collect();
        f.debug_struct("PluginManager")
            .field("state", &self.state)
            .field("hooks", &self.hooks.names())
            .field("plugins", &self.catalog.len())
            .field("live", &live)
            .finish()
    }
}

impl Drop for PluginManager {
    fn drop(&mut self) {
        if !self.live.is_empty() {
            let leaked: Vec<&str> = self.live.iter().map(|p| p.name.as_str()).collect();
            warn!(plugins = ?leaked, "Plugin manager dropped without exit, plugins not released");
        }
    }
}
