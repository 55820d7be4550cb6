//! Plugin loader: resolves configuration references to compiled-in
//! constructors.
//!
//! Plugins are linked into the host binary and export a static
//! [`PluginModule`] descriptor listing their context constructors and
//! static-callback functions by symbol name. The host registers every
//! descriptor with a [`PluginLoader`] at process start, before any
//! configuration is read. Plugin definitions then refer to symbols as
//! `"module::Symbol"`.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::callbacks::Callbacks;
use crate::catalog::PluginDef;
use crate::context::{HostInfo, PluginContext};
use crate::error::PluginError;

/// Constructor for a plugin context object.
///
/// Receives the definition's opaque configuration and the host info.
pub type ContextFactory =
    fn(&serde_json::Value, &HostInfo) -> Result<Box<dyn PluginContext>, String>;

/// Zero-argument function returning a plugin's eagerly available callbacks.
pub type StaticCallbacksFn = fn() -> Callbacks;

/// Static descriptor exported by a plugin crate.
#[derive(Clone, Copy)]
pub struct PluginModule {
    /// Module name referenced by `PluginDef::module`.
    pub name: &'static str,
    /// Context constructors by symbol name.
    pub ctx_managers: &'static [(&'static str, ContextFactory)],
    /// Static-callback functions by symbol name.
    pub static_callbacks: &'static [(&'static str, StaticCallbacksFn)],
}

impl fmt::Debug for PluginModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx: Vec<&str> = self.ctx_managers.iter().map(|(name, _)| *name).collect();
        let statics: Vec<&str> = self.static_callbacks.iter().map(|(name, _)| *name).collect();
        f.debug_struct("PluginModule")
            .field("name", &self.name)
            .field("ctx_managers", &ctx)
            .field("static_callbacks", &statics)
            .finish()
    }
}

/// Lookup table from module names to their descriptors.
#[derive(Debug, Default)]
pub struct PluginLoader {
    /// Module name → descriptor.
    modules: HashMap<&'static str, PluginModule>,
}

impl PluginLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module descriptor, builder style.
    pub fn with_module(mut self, module: PluginModule) -> Self {
        self.register_module(module);
        self
    }

    /// Registers a module descriptor. A later descriptor with the same
    /// name replaces the earlier one.
    pub fn register_module(&mut self, module: PluginModule) {
        if self.modules.insert(module.name, module).is_some() {
            warn!(module = module.name, "Plugin module registered twice, keeping the latest");
        } else {
            debug!(module = module.name, "Plugin module registered");
        }
    }

    /// Returns whether a module with this name is known.
    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Resolves the context constructor a definition refers to.
    pub fn resolve_ctx_manager(&self, plugin: &PluginDef) -> Result<ContextFactory, PluginError> {
        self.resolve_symbol(plugin, &plugin.ctx_manager, |m| m.ctx_managers)
    }

    /// Resolves the static-callback function a definition refers to, if
    /// it names one.
    pub fn resolve_static_callbacks(
        &self,
        plugin: &PluginDef,
    ) -> Result<Option<StaticCallbacksFn>, PluginError> {
        plugin
            .static_callbacks
            .as_deref()
            .map(|reference| self.resolve_symbol(plugin, reference, |m| m.static_callbacks))
            .transpose()
    }

    fn resolve_symbol<T: Copy + 'static>(
        &self,
        plugin: &PluginDef,
        reference: &str,
        exports: impl Fn(&PluginModule) -> &'static [(&'static str, T)],
    ) -> Result<T, PluginError> {
        if !self.has_module(&plugin.module) {
            return Err(PluginError::load(
                &plugin.name,
                format!("unknown module '{}'", plugin.module),
            ));
        }

        let (module_name, symbol) = reference.rsplit_once("::").ok_or_else(|| {
            PluginError::load(
                &plugin.name,
                format!("reference '{reference}' is not of the form 'module::symbol'"),
            )
        })?;

        let module = self.modules.get(module_name).ok_or_else(|| {
            PluginError::load(&plugin.name, format!("unknown module '{module_name}'"))
        })?;

        exports(module)
            .iter()
            .find(|(name, _)| *name == symbol)
            .map(|(_, export)| *export)
            .ok_or_else(|| {
                PluginError::load(
                    &plugin.name,
                    format!("module '{module_name}' has no export '{symbol}'"),
                )
            })
    }
}
