//! Per-job file consumer
//!
//! Maps each physical file an indexing job touches to the `IndexFile` the job
//! should record into. The first job to claim a file owns it; later jobs get a
//! placeholder, and can materialize a local-only copy through `force_local` when
//! they need a table for the file anyway.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error};

use super::coordinator::OwnershipCoordinator;
use crate::error::IndexError;
use crate::index::IndexFile;
use crate::io::{FileContentsCache, FileIdentity, FileSystemTrait};

/// Answer to "which index do I record this file's entities into?"
#[derive(Debug)]
pub enum FileOwnership<'a> {
    /// This job owns the file
    Owned {
        index: &'a mut IndexFile,
        is_first_owner: bool,
    },
    /// Another job owns the file; this is a job-private copy that is never emitted
    LocalOnly(&'a mut IndexFile),
    /// Another job owns the file and no local copy exists
    NotOwned,
    /// The file's identity could not be determined; skip it
    Error(IndexError),
}

impl<'a> FileOwnership<'a> {
    /// Index to record into, if any
    pub fn into_index(self) -> Option<&'a mut IndexFile> {
        match self {
            FileOwnership::Owned { index, .. } | FileOwnership::LocalOnly(index) => Some(index),
            FileOwnership::NotOwned | FileOwnership::Error(_) => None,
        }
    }

    #[cfg(test)]
    pub fn is_first_owner(&self) -> bool {
        matches!(
            self,
            FileOwnership::Owned {
                is_first_owner: true,
                ..
            }
        )
    }
}

/// Local cache slot. `index == None` is the placeholder for a file owned elsewhere.
#[derive(Debug)]
struct LocalEntry {
    index: Option<IndexFile>,
    owner: bool,
}

impl LocalEntry {
    fn ownership(&mut self, is_first_owner: bool) -> FileOwnership<'_> {
        match (&mut self.index, self.owner) {
            (Some(index), true) => FileOwnership::Owned {
                index,
                is_first_owner,
            },
            (Some(index), false) => FileOwnership::LocalOnly(index),
            (None, _) => FileOwnership::NotOwned,
        }
    }
}

pub struct FileConsumer<F: FileSystemTrait> {
    shared: Arc<OwnershipCoordinator>,
    contents: Arc<FileContentsCache>,
    fs: F,
    /// Translation unit this job is parsing, for diagnostics
    parse_file: PathBuf,
    local: HashMap<FileIdentity, LocalEntry>,
}

impl<F: FileSystemTrait> FileConsumer<F> {
    pub fn new(
        shared: Arc<OwnershipCoordinator>,
        contents: Arc<FileContentsCache>,
        fs: F,
        parse_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            shared,
            contents,
            fs,
            parse_file: parse_file.into(),
            local: HashMap::new(),
        }
    }

    /// Resolve `path` to the index this job should write into
    pub fn resolve(&mut self, path: &Path) -> FileOwnership<'_> {
        let id = match self.identity(path) {
            Ok(id) => id,
            Err(e) => return FileOwnership::Error(e),
        };

        match self.local.entry(id) {
            Entry::Occupied(entry) => entry.into_mut().ownership(false),
            Entry::Vacant(slot) => {
                // Claims go by identity; the canonical path only names the index.
                let canonical = self.fs.canonicalize(path);
                if self.shared.claim(slot.key()) {
                    debug!(
                        "{} takes ownership of {}",
                        self.parse_file.display(),
                        canonical.display()
                    );
                    let contents = self.contents.get_or_read(&self.fs, &canonical);
                    slot.insert(LocalEntry {
                        index: Some(IndexFile::new(canonical, contents)),
                        owner: true,
                    })
                    .ownership(true)
                } else {
                    debug!(
                        "{} is already owned; {} keeps a placeholder",
                        canonical.display(),
                        self.parse_file.display()
                    );
                    slot.insert(LocalEntry {
                        index: None,
                        owner: false,
                    })
                    .ownership(false)
                }
            }
        }
    }

    /// Index for `path` even when another job owns it
    ///
    /// A file owned elsewhere gets a local-only copy that is kept out of the
    /// claim set and out of `take_owned_indexes`.
    pub fn force_local(&mut self, path: &Path) -> Result<&mut IndexFile, IndexError> {
        if let FileOwnership::Error(e) = self.resolve(path) {
            return Err(e);
        }

        let id = self.identity(path)?;
        let canonical = self.fs.canonicalize(path);
        let entry = self.local.entry(id).or_insert(LocalEntry {
            index: None,
            owner: false,
        });
        let index = entry.index.get_or_insert_with(|| {
            debug!(
                "{} creates a local-only index for {}",
                self.parse_file.display(),
                canonical.display()
            );
            let contents = self.contents.get_or_read(&self.fs, &canonical);
            IndexFile::new(canonical.clone(), contents)
        });
        Ok(index)
    }

    /// Whether this job is the authoritative owner of `path`
    #[cfg(test)]
    pub fn owns(&self, path: &Path) -> bool {
        self.fs
            .unique_id(path)
            .ok()
            .and_then(|id| self.local.get(&id))
            .is_some_and(|entry| entry.owner)
    }

    /// Hand back every index this job owns, sorted by path
    ///
    /// Placeholders and local-only copies are dropped. Claims stay in place: the
    /// returned indexes are the authoritative ones for their files.
    pub fn take_owned_indexes(&mut self) -> Vec<IndexFile> {
        let mut owned: Vec<IndexFile> = self
            .local
            .drain()
            .filter(|(_, entry)| entry.owner)
            .filter_map(|(_, entry)| entry.index)
            .collect();
        owned.sort_by(|a, b| a.path.cmp(&b.path));
        owned
    }

    /// Give up every claim this job still holds, discarding its partial indexes
    pub fn release_claims(&mut self) {
        for (id, entry) in self.local.drain() {
            if let (true, Some(index)) = (entry.owner, &entry.index) {
                debug!(
                    "{} releases {}",
                    self.parse_file.display(),
                    index.path.display()
                );
                self.shared.release(&id);
            }
        }
    }

    fn identity(&self, path: &Path) -> Result<FileIdentity, IndexError> {
        self.fs.unique_id(path).map_err(|source| {
            self.emit_error(path, &source);
            IndexError::FileIdentity {
                file: path.to_path_buf(),
                parse_file: self.parse_file.clone(),
                source,
            }
        })
    }

    fn emit_error(&self, path: &Path, source: &std::io::Error) {
        // The front end occasionally hands out files without a name; stay quiet for those.
        if !path.as_os_str().is_empty() {
            error!(
                "Could not get unique file id for {} when parsing {}: {}",
                path.display(),
                self.parse_file.display(),
                source
            );
        }
    }
}

impl<F: FileSystemTrait> Drop for FileConsumer<F> {
    fn drop(&mut self) {
        // Only a job that never handed its indexes back still holds entries here.
        self.release_claims();
    }
}
