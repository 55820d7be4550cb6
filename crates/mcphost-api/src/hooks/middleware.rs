//! Plugin middleware chain.
//!
//! Plugins contribute request middlewares through the `host.middlewares`
//! hook. Every request walks them in registration order: the first
//! registered middleware is the outermost wrapper, and the last one hands
//! the request to the router.

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use tracing::{debug, info};

use mcphost_plugin::{HookInfo, PluginError, PluginManager};

/// Hook through which plugins contribute middlewares.
pub const MIDDLEWARES_HOOK: &str = "host.middlewares";

/// A plugin middleware. Receives the request and the rest of the chain.
pub type MiddlewareCallback =
    Arc<dyn Fn(Request, PluginNext) -> BoxFuture<'static, Response> + Send + Sync>;

type Terminal = Box<dyn FnOnce(Request) -> BoxFuture<'static, Response> + Send>;

#[derive(Clone)]
struct MiddlewareEntry {
    callback: MiddlewareCallback,
    plugin_name: String,
}

/// The remainder of the chain after the current middleware.
///
/// Consumed by [`run`](PluginNext::run); a middleware that never calls it
/// short-circuits the request.
pub struct PluginNext {
    entries: Arc<[MiddlewareEntry]>,
    index: usize,
    terminal: Terminal,
}

impl PluginNext {
    /// Pass the request to the next middleware, or to the router at the
    /// end of the chain.
    pub fn run(self, request: Request) -> BoxFuture<'static, Response> {
        match self.entries.get(self.index) {
            Some(entry) => {
                let callback = Arc::clone(&entry.callback);
                let next = PluginNext {
                    entries: Arc::clone(&self.entries),
                    index: self.index + 1,
                    terminal: self.terminal,
                };
                callback(request, next)
            }
            None => (self.terminal)(request),
        }
    }
}

/// Ordered plugin middlewares.
///
/// Registration replaces the entry list; a dispatch in flight keeps the
/// list it started with.
#[derive(Default)]
pub struct MiddlewareChain {
    entries: RwLock<Arc<[MiddlewareEntry]>>,
}

impl MiddlewareChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware. Always accepted.
    pub fn register_plugin(&self, callback: MiddlewareCallback, plugin_name: &str) -> bool {
        let mut entries = self.entries.write();
        let mut updated = entries.to_vec();
        updated.push(MiddlewareEntry {
            callback,
            plugin_name: plugin_name.to_string(),
        });
        *entries = updated.into();
        info!(plugin = %plugin_name, position = entries.len(), "Registered plugin middleware");
        true
    }

    /// Declare [`MIDDLEWARES_HOOK`] on the plugin manager.
    pub fn register_hook(self: &Arc<Self>, plugins: &mut PluginManager) -> Result<(), PluginError> {
        let chain = Arc::clone(self);
        plugins.register_hookable(HookInfo::new(
            MIDDLEWARES_HOOK,
            move |callback: MiddlewareCallback, _hook: &str, plugin: &str| {
                let accepted = chain.register_plugin(callback, plugin);
                async move { accepted }
            },
        ))
    }

    /// Number of registered middlewares
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no middleware is registered
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Plugins in chain order
    pub fn plugin_names(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .map(|entry| entry.plugin_name.clone())
            .collect()
    }

    /// Run `request` through every middleware, then `terminal`.
    pub async fn dispatch<F, Fut>(&self, request: Request, terminal: F) -> Response
    where
        F: FnOnce(Request) -> Fut + Send + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let entries = Arc::clone(&self.entries.read());
        debug!(middlewares = entries.len(), "Dispatching through plugin middlewares");
        let next = PluginNext {
            entries,
            index: 0,
            terminal: Box::new(move |request: Request| -> BoxFuture<'static, Response> {
                Box::pin(terminal(request))
            }),
        };
        next.run(request).await
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("plugins", &self.plugin_names())
            .finish()
    }
}

/// Wrap an async function as a [`MiddlewareCallback`].
pub fn middleware<F, Fut>(f: F) -> MiddlewareCallback
where
    F: Fn(Request, PluginNext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |request: Request, next: PluginNext| -> BoxFuture<'static, Response> {
        Box::pin(f(request, next))
    })
}

/// Axum middleware running the plugin chain in front of the router.
pub async fn plugin_middleware(
    State(chain): State<Arc<MiddlewareChain>>,
    request: Request,
    next: Next,
) -> Response {
    chain.dispatch(request, move |request| next.run(request)).await
}
