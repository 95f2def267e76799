//! Cross-job file ownership
//!
//! One `OwnershipCoordinator` per run, one `FileConsumer` per indexing job.

pub mod coordinator;
pub mod file_consumer;

pub use coordinator::OwnershipCoordinator;
pub use file_consumer::FileConsumer;
