//! Hook table: unique hook names mapped to their registration capability.

use std::any::Any;
use std::collections::HashMap;

use tracing::info;

use super::info::{Hook, HookInfo};
use crate::error::PluginError;

/// Table of declared hooks, keyed by unique name.
#[derive(Debug, Default)]
pub struct HookTable {
    /// Hook name → declared hook.
    hooks: HashMap<String, Hook>,
}

impl HookTable {
    /// Creates an empty hook table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a hook.
    ///
    /// Fails with [`PluginError::HookNameAlreadyRegistered`] if the name is
    /// taken; the existing hook is left untouched.
    pub fn register_hookable<C>(&mut self, hook_info: HookInfo<C>) -> Result<(), PluginError>
    where
        C: Any + Send + Sync,
    {
        let name = hook_info.hook_name().to_string();
        if self.hooks.contains_key(&name) {
            return Err(PluginError::HookNameAlreadyRegistered(name));
        }

        let hook = hook_info.into_hook();
        info!(
            hook = %name,
            callback_type = hook.callback_type(),
            static_register = hook.has_static_register(),
            "Hook registered"
        );
        self.hooks.insert(name, hook);
        Ok(())
    }

    /// Looks up a hook by name.
    pub fn resolve(&self, hook_name: &str) -> Result<&Hook, PluginError> {
        self.hooks.get(hook_name).ok_or_else(|| PluginError::HookNotFound {
            hook: hook_name.to_string(),
        })
    }

    /// Returns whether a hook with this name exists.
    pub fn contains(&self, hook_name: &str) -> bool {
        self.hooks.contains_key(hook_name)
    }

    /// Returns the number of declared hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns `true` when no hooks are declared.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Returns all declared hook names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.hooks.keys().cloned().collect();
        names.sort();
        names
    }
}
