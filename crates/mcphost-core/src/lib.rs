//! # mcphost-core
//!
//! Core crate for the mcphost server. Contains configuration schemas,
//! the unified error system, and the result alias shared by every other
//! crate in the workspace.
//!
//! This crate has **no** internal dependencies on other mcphost crates.

pub mod config;
pub mod error;
pub mod result;

pub use config::AppConfig;
pub use error::AppError;
pub use result::AppResult;
