//! Trait seams between the engine and its infrastructure.

pub mod run_repository;
pub mod source_reader;

pub use run_repository::{RunRepository, StoreError, StoredRun};
pub use source_reader::{LogSelector, SourceError, SourceReader};
