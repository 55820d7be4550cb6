//! Request tag plugin for mcphost.
//!
//! Exercises every host hook:
//! - `host.routers`: a router with a greeting, mounted during the static pass
//! - `host.middlewares`: stamps a tag on each request and echoes it in a
//!   response header
//! - `host.tools.get_tools`: a `request_tag` tool reporting the tag
//!
//! Plugin definition:
//!
//! ```json
//! {
//!   "name": "request_tag",
//!   "module": "plugin_request_tag",
//!   "config": {"tag": "blue"},
//!   "ctx_manager": "plugin_request_tag::RequestTagPlugin",
//!   "static_callbacks": "plugin_request_tag::static_callbacks"
//! }
//! ```

pub mod config;
pub mod hooks;
pub mod plugin;
pub mod routes;

use mcphost_plugin::{ContextFactory, PluginModule, StaticCallbacksFn};

pub use config::RequestTagConfig;
pub use plugin::RequestTagPlugin;

/// Module descriptor registered with the host's plugin loader.
pub static MODULE: PluginModule = PluginModule {
    name: "plugin_request_tag",
    ctx_managers: &[(
        "RequestTagPlugin",
        RequestTagPlugin::factory as ContextFactory,
    )],
    static_callbacks: &[(
        "static_callbacks",
        routes::static_callbacks as StaticCallbacksFn,
    )],
};
