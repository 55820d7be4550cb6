//! Tools for mcphost.
//!
//! This crate provides:
//! - The [`Tool`] trait implemented by anything the agent layer can call
//! - [`ToolManagerPlugin`], which collects tools contributed by plugins
//!   through the `host.tools.get_tools` hook
//! - A fixed set of local tools

pub mod local;
pub mod manager;
pub mod tool;

pub use manager::{TOOLS_HOOK, ToolCallback, ToolManagerPlugin};
pub use tool::{Tool, ToolInfo};
