//! File system abstraction layer
//!
//! Provides the file identity and content reads the indexing core needs, behind a
//! trait so tests can run against an in-memory file system.

use std::path::{Path, PathBuf};

// ============================================================================
// File Identity
// ============================================================================

/// Opaque identity of a physical file
///
/// Two different paths naming the same on-disk file (symlinks, `..` segments)
/// compare equal. Device/inode when the platform provides it, otherwise the
/// canonical path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileIdentity {
    Inode { device: u64, inode: u64 },
    Path(PathBuf),
}

// ============================================================================
// File System Trait
// ============================================================================

/// Trait for file system operations
pub trait FileSystemTrait: Clone + Send + Sync {
    /// Unique identity of the file; fails when the file cannot be stat'ed
    fn unique_id(&self, path: &Path) -> Result<FileIdentity, std::io::Error>;

    /// Canonical path naming the file's index, the input path if it cannot be resolved
    fn canonicalize(&self, path: &Path) -> PathBuf;

    /// Read file contents as UTF-8 text
    fn read_to_string(&self, path: &Path) -> Result<String, std::io::Error>;
}

// ============================================================================
// Real File System Implementation
// ============================================================================

/// Real file system implementation using std::fs
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystemTrait for RealFileSystem {
    #[cfg(unix)]
    fn unique_id(&self, path: &Path) -> Result<FileIdentity, std::io::Error> {
        use std::os::unix::fs::MetadataExt;

        let metadata = std::fs::metadata(path)?;
        Ok(FileIdentity::Inode {
            device: metadata.dev(),
            inode: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    fn unique_id(&self, path: &Path) -> Result<FileIdentity, std::io::Error> {
        Ok(FileIdentity::Path(std::fs::canonicalize(path)?))
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }

    fn read_to_string(&self, path: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(path)
    }
}

// ============================================================================
// Test File System Implementation
// ============================================================================


#[cfg(test)]
pub use test_filesystem::TestFileSystem;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_real_identity_follows_links() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let header = temp_dir.path().join("shared.h");
        fs::write(&header, "struct Shared {};")?;
        let nested = temp_dir.path().join("sub");
        fs::create_dir(&nested)?;
        let dotted = nested.join("..").join("shared.h");

        let fs = RealFileSystem;
        assert_eq!(fs.unique_id(&header)?, fs.unique_id(&dotted)?);
        assert_eq!(fs.canonicalize(&dotted), fs.canonicalize(&header));
        assert_eq!(fs.read_to_string(&dotted)?, "struct Shared {};");
        Ok(())
    }

    #[test]
    fn test_real_identity_fails_for_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.h");
        assert!(RealFileSystem.unique_id(&missing).is_err());
        assert_eq!(RealFileSystem.canonicalize(&missing), missing);
    }

    #[test]
    fn test_in_memory_links_share_identity() {
        let fs = TestFileSystem::with_files([("/src/a.h", "int a;"), ("/src/b.h", "int b;")]);
        fs.add_link("/include/a.h", "/src/a.h");

        let a = fs.unique_id(Path::new("/src/a.h")).unwrap();
        assert_eq!(fs.unique_id(Path::new("/include/a.h")).unwrap(), a);
        assert_ne!(fs.unique_id(Path::new("/src/b.h")).unwrap(), a);
        assert_eq!(
            fs.canonicalize(Path::new("/include/a.h")),
            PathBuf::from("/src/a.h")
        );
        assert_eq!(fs.read_to_string(Path::new("/include/a.h")).unwrap(), "int a;");
        assert_eq!(fs.read_count("/src/a.h"), 1);
    }

    #[test]
    fn test_in_memory_hard_link_keeps_its_own_name() {
        let fs = TestFileSystem::with_files([("/src/a.h", "int a;")]);
        fs.add_hard_link("/include/a.h", "/src/a.h");

        assert_eq!(
            fs.unique_id(Path::new("/include/a.h")).unwrap(),
            fs.unique_id(Path::new("/src/a.h")).unwrap()
        );
        assert_eq!(
            fs.canonicalize(Path::new("/include/a.h")),
            PathBuf::from("/include/a.h")
        );
    }
}
