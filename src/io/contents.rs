//! Shared read-once file content cache
//!
//! Every indexing job reads headers through the same cache so a file shared by
//! many translation units hits the disk once per run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use super::file_system::FileSystemTrait;

/// Contents of one file as read by the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    pub path: PathBuf,
    pub content: Arc<str>,
}

/// Path-keyed, read-through content cache shared by all jobs of a run
#[derive(Debug, Default)]
pub struct FileContentsCache {
    entries: Mutex<HashMap<PathBuf, FileContents>>,
}

impl FileContentsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached contents of `path`, reading them on first request
    ///
    /// The read happens outside the lock; when two jobs race on the same file the
    /// first insert wins and both observe it. Missing files are not cached.
    pub fn get_or_read<F: FileSystemTrait>(&self, fs: &F, path: &Path) -> Option<Arc<str>> {
        if let Some(hit) = self.lookup(path) {
            trace!("Content cache hit for {}", path.display());
            return Some(hit);
        }

        let content: Arc<str> = match fs.read_to_string(path) {
            Ok(content) => content.into(),
            Err(e) => {
                debug!("Could not read {}: {}", path.display(), e);
                return None;
            }
        };

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries
            .entry(path.to_path_buf())
            .or_insert_with(|| FileContents {
                path: path.to_path_buf(),
                content,
            });
        Some(Arc::clone(&entry.content))
    }

    pub fn lookup(&self, path: &Path) -> Option<Arc<str>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(path).map(|entry| Arc::clone(&entry.content))
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::file_system::TestFileSystem;

    #[test]
    fn test_reads_once() {
        let fs = TestFileSystem::with_files([("/src/shared.h", "struct S {};")]);
        let cache = FileContentsCache::new();

        let first = cache.get_or_read(&fs, Path::new("/src/shared.h")).unwrap();
        let second = cache.get_or_read(&fs, Path::new("/src/shared.h")).unwrap();

        assert_eq!(&*first, "struct S {};");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fs.read_count("/src/shared.h"), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_file_is_not_cached() {
        let fs = TestFileSystem::new();
        let cache = FileContentsCache::new();

        assert!(cache.get_or_read(&fs, Path::new("/src/gone.h")).is_none());
        assert!(cache.is_empty());

        fs.set_file_content("/src/gone.h", "int back;");
        assert_eq!(
            cache.get_or_read(&fs, Path::new("/src/gone.h")).as_deref(),
            Some("int back;")
        );
    }

    #[test]
    fn test_concurrent_readers_share_one_entry() {
        let fs = TestFileSystem::with_files([("/src/common.h", "#pragma once")]);
        let cache = Arc::new(FileContentsCache::new());

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let cache = Arc::clone(&cache);
                let fs = fs.clone();
                scope.spawn(move || {
                    let content = cache.get_or_read(&fs, Path::new("/src/common.h"));
                    assert_eq!(content.as_deref(), Some("#pragma once"));
                });
            }
        });

        assert_eq!(cache.len(), 1);
    }
}
