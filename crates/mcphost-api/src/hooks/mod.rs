//! Host hook consumers for the HTTP layer.

pub mod middleware;
pub mod router;

pub use middleware::{
    MIDDLEWARES_HOOK, MiddlewareCallback, MiddlewareChain, PluginNext, middleware,
};
pub use router::{ROUTERS_HOOK, RouterCallback, RouterMount};
