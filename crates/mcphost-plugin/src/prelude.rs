//! Prelude for plugin authors.

pub use async_trait::async_trait;

pub use crate::callbacks::{Callback, Callbacks};
pub use crate::context::{HostInfo, PluginContext};
pub use crate::loader::{ContextFactory, PluginModule, StaticCallbacksFn};
