//! Parallel indexing driver
//!
//! Runs one blocking job per translation unit on the tokio blocking pool, at
//! most `jobs` at a time, and merges whatever the successful jobs own.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{Level, debug, error, info};

use crate::consumer::{FileConsumer, OwnershipCoordinator};
use crate::database::SymbolDatabase;
use crate::error::IndexError;
use crate::frontend::FrontEnd;
use crate::indexer::{IndexStats, JobOutput, run_job};
use crate::io::{FileContentsCache, FileSystemTrait};
use crate::log_timing;

/// Per-run bookkeeping
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Inputs whose job finished
    pub indexed: Vec<PathBuf>,
    /// Inputs whose job failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
    pub stats: IndexStats,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Index every input and merge the owned results
///
/// A failing job is logged and reported in the summary; it never aborts the
/// run. Two jobs reporting the same file is fatal.
pub async fn index_all<F>(
    inputs: Vec<PathBuf>,
    front_end: Arc<dyn FrontEnd>,
    fs: F,
    jobs: usize,
) -> Result<(SymbolDatabase, RunSummary), IndexError>
where
    F: FileSystemTrait + 'static,
{
    let start = Instant::now();
    let permits = Arc::new(Semaphore::new(jobs.max(1)));
    let shared = Arc::new(OwnershipCoordinator::new());
    let contents = Arc::new(FileContentsCache::new());
    info!("Indexing {} translation units with {} jobs", inputs.len(), jobs);

    let mut handles = Vec::with_capacity(inputs.len());
    for input in inputs {
        let permit = Arc::clone(&permits)
            .acquire_owned()
            .await
            .map_err(|e| IndexError::JobFailed {
                translation_unit: input.clone(),
                reason: e.to_string(),
            })?;
        let front_end = Arc::clone(&front_end);
        let shared = Arc::clone(&shared);
        let contents = Arc::clone(&contents);
        let fs = fs.clone();
        let job_input = input.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let tu = front_end.parse(&job_input)?;
            // Diagnostics name the translation unit, not the dump it came from.
            let consumer = FileConsumer::new(shared, contents, fs, tu.path.clone());
            run_job(&tu, consumer)
        });
        handles.push((input, handle));
    }

    let mut summary = RunSummary::default();
    let mut indexes = Vec::new();
    for (input, handle) in handles {
        let result = handle.await.unwrap_or_else(|e| {
            Err(IndexError::JobFailed {
                translation_unit: input.clone(),
                reason: e.to_string(),
            })
        });
        match result {
            Ok(JobOutput {
                translation_unit,
                indexes: owned,
                stats,
            }) => {
                debug!(
                    "{} produced {} owned indexes for {}",
                    input.display(),
                    owned.len(),
                    translation_unit.display()
                );
                summary.stats.events += stats.events;
                summary.stats.recorded += stats.recorded;
                summary.stats.skipped += stats.skipped;
                summary.indexed.push(input);
                indexes.extend(owned);
            }
            Err(e) => {
                error!("Indexing {} failed: {}", input.display(), e);
                summary.failed.push((input, e.to_string()));
            }
        }
    }

    let database = SymbolDatabase::merge(indexes)?;
    info!(
        "Indexed {} translation units ({} failed) into {} files",
        summary.indexed.len(),
        summary.failed.len(),
        database.len()
    );
    log_timing!(Level::INFO, "index_all", start.elapsed());
    Ok((database, summary))
}
