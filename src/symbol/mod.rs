//! Symbol primitives shared by the index model
//!
//! Locations, kind tags and USR hashes. Everything here is an immutable value type.

pub mod kind;
pub mod location;
pub mod usr;

pub use kind::{EntityClass, SymbolKind};
pub use location::{FileLocation, Range};
pub use usr::Usr;
