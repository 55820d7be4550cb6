//! Application builder and server lifecycle.
//!
//! Startup order matters: plugin routers arrive during the static pass, so
//! it runs before the listener is bound, while plugin contexts are entered
//! only once the listener exists. Plugins are always released after the
//! server stops, even when serving fails.

use std::future::IntoFuture;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use mcphost_core::config::AppConfig;
use mcphost_core::error::AppError;
use mcphost_plugin::{
    HostInfo, PluginDef, PluginError, PluginLoader, PluginManager, load_plugins_config,
};
use mcphost_tools::ToolManagerPlugin;

use crate::hooks::middleware::plugin_middleware;
use crate::hooks::{MiddlewareChain, RouterMount};
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::{PLUGIN_MOUNT_PREFIX, build_router};
use crate::state::{AppState, PluginSnapshot};

/// The plugin manager together with the host's hook consumers.
#[derive(Debug)]
pub struct Host {
    /// Plugin manager
    pub manager: PluginManager,
    /// Consumer of `host.middlewares`
    pub middlewares: Arc<MiddlewareChain>,
    /// Consumer of `host.routers`
    pub routers: Arc<RouterMount>,
    /// Consumer of `host.tools.get_tools`
    pub tools: Arc<ToolManagerPlugin>,
}

impl Host {
    /// Create a plugin manager and declare the host hooks on it.
    pub fn new(loader: PluginLoader, host_info: HostInfo) -> Result<Self, PluginError> {
        let mut manager = PluginManager::new(loader, host_info);
        let middlewares = Arc::new(MiddlewareChain::new());
        let routers = Arc::new(RouterMount::new());
        let tools = Arc::new(ToolManagerPlugin::new());

        middlewares.register_hook(&mut manager)?;
        routers.register_hook(&mut manager)?;
        tools.register_hook(&mut manager)?;

        Ok(Self {
            manager,
            middlewares,
            routers,
            tools,
        })
    }

    /// Register plugin definitions in order.
    pub fn register_plugins(
        &mut self,
        plugins: impl IntoIterator<Item = PluginDef>,
    ) -> Result<(), PluginError> {
        plugins
            .into_iter()
            .try_for_each(|plugin| self.manager.register_plugin(plugin))
    }

    /// Build handler state from the current plugin diagnostics.
    pub fn app_state(&self, config: Arc<AppConfig>) -> AppState {
        AppState {
            config,
            plugins: Arc::new(PluginSnapshot::capture(&self.manager)),
            middlewares: Arc::clone(&self.middlewares),
            routers: Arc::clone(&self.routers),
            tools: Arc::clone(&self.tools),
            started_at: Instant::now(),
        }
    }
}

/// Builds the complete Axum application with host routes, plugin routers,
/// and the middleware stack.
pub fn build_app(state: AppState) -> Router {
    let middlewares = Arc::clone(&state.middlewares);
    let routers = Arc::clone(&state.routers);
    let cors = build_cors_layer(&state.config.server.cors);

    let mut app = build_router(state);
    if !routers.plugin_names().is_empty() {
        app = app.nest(PLUGIN_MOUNT_PREFIX, routers.router());
    }

    app.layer(axum_middleware::from_fn_with_state(
        middlewares,
        plugin_middleware,
    ))
    .layer(axum_middleware::from_fn(request_logging))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
}

/// Runs the host until a shutdown signal arrives.
pub async fn run_server(config: AppConfig, loader: PluginLoader) -> Result<(), AppError> {
    info!("Starting mcphost server...");

    // ── Step 1: Declare hooks ────────────────────────────────────
    let host_info = HostInfo::new(config.server.base_url());
    let mut host = Host::new(loader, host_info)?;
    host.tools.setup_local_tools();

    // ── Step 2: Register plugins ─────────────────────────────────
    let plugins = load_plugins_config(config.plugins.config_path.as_deref().map(Path::new))?;
    host.register_plugins(plugins)?;

    // ── Step 3: Static pass (routers) ────────────────────────────
    host.manager.static_pass().await?;

    // ── Step 4: Bind listener ────────────────────────────────────
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    // ── Step 5: Enter plugins ────────────────────────────────────
    host.manager.enter().await?;

    // ── Step 6: Serve ────────────────────────────────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let app = build_app(host.app_state(Arc::new(config)));
    info!(addr = %addr, "mcphost server listening");

    let served = serve(listener, app, grace).await;

    // ── Step 7: Release plugins ──────────────────────────────────
    if let Err(e) = host.manager.exit().await {
        error!(error = %e, "Failed to release plugins");
    }

    served?;
    info!("mcphost server shut down gracefully");
    Ok(())
}

async fn serve(
    listener: tokio::net::TcpListener,
    app: Router,
    grace: Duration,
) -> Result<(), AppError> {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_tx.send(true);
        })
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))
        }
        _ = async {
            let _ = shutdown_rx.wait_for(|stopping| *stopping).await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out, dropping connections");
            Ok(())
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
