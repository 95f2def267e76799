//! Run-wide file ownership coordinator
//!
//! Arbitrates which indexing job produces the authoritative index for each
//! physical file. Constructed once per indexing run and shared by handle.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use tracing::trace;

use crate::io::FileIdentity;

/// Set of claimed file identities behind a single short-held lock
///
/// Keys are device/inode pairs where the platform has them, so every name a
/// physical file goes by (symlinks, hard links) maps to one claim.
#[derive(Debug, Default)]
pub struct OwnershipCoordinator {
    claimed: Mutex<HashSet<FileIdentity>>,
}

impl OwnershipCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `file`; returns true when the caller became its owner
    pub fn claim(&self, file: &FileIdentity) -> bool {
        let inserted = self.lock().insert(file.clone());
        trace!("claim {:?} -> {}", file, inserted);
        inserted
    }

    /// Drop a claim so another job can take the file; unknown files are ignored
    pub fn release(&self, file: &FileIdentity) {
        if self.lock().remove(file) {
            trace!("released {:?}", file);
        }
    }

    #[cfg(test)]
    pub fn is_claimed(&self, file: &FileIdentity) -> bool {
        self.lock().contains(file)
    }

    #[cfg(test)]
    pub fn claimed_count(&self) -> usize {
        self.lock().len()
    }

    // The set has no invariants a panicking holder could break.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<FileIdentity>> {
        self.claimed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
