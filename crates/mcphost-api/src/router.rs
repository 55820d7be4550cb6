//! Route definitions for the host HTTP API.
//!
//! Host routes live under `/api`; plugin routers are mounted under
//! [`PLUGIN_MOUNT_PREFIX`].

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Path prefix under which plugin routers are mounted.
pub const PLUGIN_MOUNT_PREFIX: &str = "/plugins";

/// Build the host API router.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(plugin_routes())
        .merge(tool_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

fn plugin_routes() -> Router<AppState> {
    Router::new().route("/plugins", get(handlers::plugins::list_plugins))
}

fn tool_routes() -> Router<AppState> {
    Router::new()
        .route("/tools", get(handlers::tools::list_tools))
        .route("/tools/{name}/call", post(handlers::tools::call_tool))
}
