//! Plugin registry error taxonomy.

use thiserror::Error;

use mcphost_core::error::{AppError, ErrorKind};

use crate::manager::RegistryState;

/// Errors raised while declaring hooks, registering plugins, or moving the
/// plugin manager through its lifecycle.
///
/// Every variant is fatal for the operation that produced it. Soft
/// rejections by a hook consumer are not errors; they are recorded in the
/// plugin's status instead.
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    /// A hook with the same name was already declared.
    #[error("Hook '{0}' already registered")]
    HookNameAlreadyRegistered(String),

    /// A plugin definition with the same name was already registered.
    #[error("Plugin '{0}' already registered")]
    PluginAlreadyRegistered(String),

    /// A callback targets a hook nobody declared.
    #[error("Hook '{hook}' not registered")]
    HookNotFound {
        /// The unresolved hook name.
        hook: String,
    },

    /// The plugin's module, constructor, or scoped resource could not be
    /// resolved or acquired.
    #[error("Failed to load plugin '{plugin}': {reason}")]
    PluginLoad {
        /// Plugin name.
        plugin: String,
        /// What went wrong.
        reason: String,
    },

    /// A callback's concrete type differs from the one its hook declared.
    #[error(
        "Callback '{label}' from plugin '{plugin}' for hook '{hook}' has type {found}, expected {expected}"
    )]
    CallbackTypeMismatch {
        /// Target hook name.
        hook: String,
        /// Plugin that produced the callback.
        plugin: String,
        /// Local label of the callback entry.
        label: String,
        /// Type the hook accepts.
        expected: &'static str,
        /// Type the plugin supplied.
        found: &'static str,
    },

    /// The operation is not permitted in the registry's current state.
    #[error("Plugin registry is {actual}, operation requires {expected}")]
    InvalidState {
        /// State the operation needs.
        expected: RegistryState,
        /// State the registry is in.
        actual: RegistryState,
    },

    /// The plugin definition list could not be read or parsed.
    #[error("Invalid plugin configuration: {0}")]
    Config(String),
}

impl PluginError {
    /// Creates a load error for the given plugin.
    pub fn load(plugin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PluginLoad {
            plugin: plugin.into(),
            reason: reason.into(),
        }
    }
}

impl From<PluginError> for AppError {
    fn from(err: PluginError) -> Self {
        let kind = match &err {
            PluginError::Config(_) => ErrorKind::Configuration,
            PluginError::InvalidState { .. } => ErrorKind::Conflict,
            _ => ErrorKind::Plugin,
        };
        let message = err.to_string();
        AppError::with_source(kind, message, err)
    }
}
