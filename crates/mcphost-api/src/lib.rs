//! # mcphost-api
//!
//! HTTP layer for mcphost built on Axum.
//!
//! Provides the host API endpoints, the plugin hook consumers for the HTTP
//! layer (middleware chain and router mounting), error mapping, and the
//! server lifecycle that drives the plugin manager.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod hooks;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{Host, build_app, run_server};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
