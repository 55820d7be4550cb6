//! Router mounted under the plugin's name during the static pass.

use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{Value, json};

use mcphost_api::hooks::{ROUTERS_HOOK, RouterCallback};
use mcphost_plugin::prelude::*;

use crate::hooks::RequestTag;

/// Static callbacks: the plugin router.
pub fn static_callbacks() -> Callbacks {
    let build: RouterCallback = Arc::new(router);
    Callbacks::new().with("router", ROUTERS_HOOK, Callback::new(build))
}

fn router() -> Router {
    Router::new()
        .route("/", get(greeting))
        .route("/tag", get(current_tag))
}

async fn greeting() -> Json<Value> {
    Json(json!({ "plugin": "request_tag", "message": "Hello from the request tag plugin" }))
}

async fn current_tag(tag: Option<Extension<RequestTag>>) -> Json<Value> {
    Json(json!({ "tag": tag.map(|Extension(RequestTag(tag))| tag) }))
}
