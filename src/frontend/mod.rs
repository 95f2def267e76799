//! External front-end interface
//!
//! The AST walk itself happens outside this crate; a `FrontEnd` turns a
//! translation unit into the ordered event stream the indexer consumes.

pub mod dump;
pub mod events;

use std::path::Path;

pub use dump::JsonDumpFrontEnd;
pub use events::{CallEvent, DeclEvent, IndexEvent, RefEvent, TranslationUnit};

use crate::error::IndexError;

pub trait FrontEnd: Send + Sync {
    /// Walk the translation unit identified by `path`
    fn parse(&self, path: &Path) -> Result<TranslationUnit, IndexError>;
}


#[cfg(test)]
pub use test_frontend::InMemoryFrontEnd;
