//! Plugin diagnostics handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, PluginsResponse};
use crate::state::AppState;

/// GET /api/plugins
pub async fn list_plugins(State(state): State<AppState>) -> Json<ApiResponse<PluginsResponse>> {
    let snapshot = &state.plugins;
    Json(ApiResponse::ok(PluginsResponse {
        state: snapshot.state,
        plugins: snapshot.statuses.clone(),
        hooks: snapshot.hooks.clone(),
        routers: state.routers.plugin_names(),
        middlewares: state.middlewares.plugin_names(),
    }))
}
