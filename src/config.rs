//! Indexer run configuration
//!
//! Built from the environment, then overridden by command-line flags, then
//! validated before any job starts.

use std::path::PathBuf;

use crate::error::ConfigError;

// ============================================================================
// Configuration Constants
// ============================================================================

pub const JOBS_ENV: &str = "XREF_JOBS";
pub const OUTPUT_DIR_ENV: &str = "XREF_OUTPUT_DIR";

/// Output directory when neither the environment nor the command line name one
pub const DEFAULT_OUTPUT_DIR: &str = "xref-index";

/// Upper bound on concurrent jobs; each job holds a full translation unit in memory
pub const MAX_JOBS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    /// Number of translation units indexed concurrently
    pub jobs: usize,
    /// Directory scanned for translation-unit dumps
    pub input_dir: PathBuf,
    /// Directory the merged per-file indexes are written to
    pub output_dir: PathBuf,
    /// Pretty-print emitted JSON
    pub pretty: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            pretty: false,
        }
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl IndexerConfig {
    /// Create IndexerConfig from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(JOBS_ENV) {
            config.jobs = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv {
                    var: JOBS_ENV,
                    value,
                })?;
        }
        if let Some(dir) = lookup(OUTPUT_DIR_ENV) {
            config.output_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Override values from CLI arguments
    pub fn with_overrides(
        mut self,
        input_dir: Option<PathBuf>,
        output_dir: Option<PathBuf>,
        jobs: Option<usize>,
        pretty: bool,
    ) -> Self {
        if let Some(input_dir) = input_dir {
            self.input_dir = input_dir;
        }
        if let Some(output_dir) = output_dir {
            self.output_dir = output_dir;
        }
        if let Some(jobs) = jobs {
            self.jobs = jobs;
        }
        self.pretty |= pretty;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs == 0 || self.jobs > MAX_JOBS {
            return Err(ConfigError::InvalidJobs(self.jobs));
        }
        if !self.input_dir.is_dir() {
            return Err(ConfigError::InputNotFound {
                path: self.input_dir.clone(),
            });
        }
        Ok(())
    }
}
