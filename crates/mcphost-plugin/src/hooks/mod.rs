//! Hook system: typed hook declarations and the table that owns them.

pub mod info;
pub mod table;

pub use info::{Hook, HookInfo, RegisterFn, StaticRegisterFn};
pub use table::HookTable;
