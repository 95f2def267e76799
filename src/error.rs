//! Error types for the indexing core
//!
//! Per-file failures are recovered by the job that hits them; consistency
//! failures abort aggregation.

use std::path::PathBuf;

use thiserror::Error;

use crate::symbol::EntityClass;

#[derive(Debug, Error)]
pub enum IndexError {
    /// The unique identity of a referenced file could not be determined
    #[error("Could not get unique file id for {file} when parsing {parse_file}")]
    FileIdentity {
        file: PathBuf,
        parse_file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two jobs both reported an owned index for the same physical file
    #[error("File {path} is owned by more than one indexing job")]
    DuplicateOwnership { path: PathBuf },

    /// A relationship field points outside its own index
    #[error("Unresolved reference in {file}: {table}[{from}] refers to missing {target}[{id}]")]
    UnresolvedReference {
        file: PathBuf,
        table: EntityClass,
        from: usize,
        target: EntityClass,
        id: usize,
    },

    /// Local IDs in a table are not the contiguous range 0..n
    #[error("Local ids in {file} {table} are not dense")]
    NonDenseIds { file: PathBuf, table: EntityClass },

    #[error("Front end failed on {path}: {reason}")]
    FrontEnd { path: PathBuf, reason: String },

    #[error("Indexing job for {translation_unit} failed: {reason}")]
    JobFailed {
        translation_unit: PathBuf,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid job count: {0} (must be at least 1)")]
    InvalidJobs(usize),

    #[error("Input directory does not exist: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}
