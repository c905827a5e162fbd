//! Shared helpers for the contentgen crates
//!
//! This crate holds the pieces every emitter has to agree on: how identifiers
//! are cased, where inputs and outputs live on disk, and how generated files
//! are persisted.

pub mod layout;
pub mod naming;
pub mod persist;

// Re-export commonly used items
pub use naming::{camel_case, param_case, pascal_case};
pub use persist::{PersistError, Saved, backup_path, save_as};
