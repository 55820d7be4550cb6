//! HTTP handlers.

pub mod health;
pub mod plugins;
pub mod tools;
