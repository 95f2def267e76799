//! Symbol tables for one physical file
//!
//! Three append-only tables (types, funcs, vars) addressed by dense local ids,
//! with relationship fields that point back into the same tables.

pub mod entity;
pub mod file;
pub mod ids;

pub use entity::ANONYMOUS_NAME;
pub use file::IndexFile;
pub use ids::{FuncId, FuncRef, TypeId, VarId};
