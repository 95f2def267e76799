//! I/O layer - file identity and content access for the indexing core
//!
//! - **File system**: identity (device/inode or canonical path) and reads behind a trait
//! - **Contents**: the run-wide read-once content cache

pub mod contents;
pub mod file_system;

pub use contents::FileContentsCache;
pub use file_system::{FileIdentity, FileSystemTrait, RealFileSystem};

#[cfg(test)]
pub use file_system::TestFileSystem;
