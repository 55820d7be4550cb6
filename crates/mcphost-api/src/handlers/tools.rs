//! Tool listing and invocation handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::info;

use mcphost_core::error::AppError;
use mcphost_tools::ToolInfo;

use crate::dto::request::{CallToolRequest, ToolQuery};
use crate::dto::response::{ApiResponse, CallToolResponse, ToolsResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/tools
pub async fn list_tools(
    State(state): State<AppState>,
    Query(query): Query<ToolQuery>,
) -> Json<ApiResponse<ToolsResponse>> {
    let tools: Vec<ToolInfo> = state
        .tools
        .get_tools(query.include_local)
        .iter()
        .map(|tool| ToolInfo::of(tool.as_ref()))
        .collect();

    Json(ApiResponse::ok(ToolsResponse {
        total: tools.len(),
        tools,
    }))
}

/// POST /api/tools/{name}/call
pub async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<CallToolRequest>,
) -> ApiResult<Json<ApiResponse<CallToolResponse>>> {
    let tool = state
        .tools
        .find_tool(&name, true)
        .ok_or_else(|| AppError::not_found(format!("Tool '{name}' not found")))?;

    info!(tool = %name, "Calling tool");
    let result = tool.call(body.arguments).await?;

    Ok(Json(ApiResponse::ok(CallToolResponse { tool: name, result })))
}
