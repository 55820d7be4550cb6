//! # mcphost-plugin
//!
//! Plugin framework for mcphost. Provides:
//!
//! - Hook table with uniquely named, typed extension points
//! - Plugin catalog loaded from declarative configuration
//! - Compile-time constructor table resolving configuration references
//! - Plugin manager with a static pass, a scoped dynamic pass, and
//!   reverse-order teardown

pub mod callbacks;
pub mod catalog;
pub mod context;
pub mod error;
pub mod hooks;
pub mod loader;
pub mod manager;
pub mod prelude;

pub use callbacks::{Callback, CallbackEntry, Callbacks};
pub use catalog::{PluginCatalog, PluginDef, load_plugins_config};
pub use context::{HostInfo, PluginContext};
pub use error::PluginError;
pub use hooks::{Hook, HookInfo, HookTable};
pub use loader::{ContextFactory, PluginLoader, PluginModule, StaticCallbacksFn};
pub use manager::{PluginManager, PluginState, PluginStatus, RegistryState};
