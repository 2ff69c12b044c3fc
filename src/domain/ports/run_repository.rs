//! Port for the durable result cache.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::models::{
    Hardware, LogReference, PlotReference, SanityModelResult, TaskResult, TestRun,
};

/// Persistence errors. Unlike source errors these are reported to the
/// caller: a half-written cache row is worse than a cache miss.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    MigrationFailed(#[from] sqlx::migrate::MigrateError),

    #[error("UUID parse error: {0}")]
    UuidParse(#[from] uuid::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("inconsistent counts for run {0}")]
    InconsistentCounts(uuid::Uuid),
}

/// A stored run together with all of its child rows.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRun {
    pub run: TestRun,
    pub task_results: BTreeMap<String, TaskResult>,
    pub sanity_results: Vec<SanityModelResult>,
    pub log_references: Vec<LogReference>,
    pub plot_references: Vec<PlotReference>,
}

/// Repository port for the per-day result cache.
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// Idempotent upsert of one day's full record.
    ///
    /// The run row is upserted on (run_date, hardware) and every child row
    /// is fully replaced, all inside one transaction.
    async fn upsert_run(&self, stored: &StoredRun) -> Result<(), StoreError>;

    /// Point query by natural key.
    async fn get_run(
        &self,
        date: NaiveDate,
        hardware: Hardware,
    ) -> Result<Option<StoredRun>, StoreError>;

    /// Runs for one platform since a date, ascending by date.
    async fn list_runs(
        &self,
        hardware: Hardware,
        since: NaiveDate,
    ) -> Result<Vec<TestRun>, StoreError>;

    /// Dates with a cached run for one platform, ascending.
    async fn list_dates(&self, hardware: Hardware) -> Result<Vec<NaiveDate>, StoreError>;

    /// Explicit maintenance deletion; child rows cascade.
    async fn delete_run(&self, date: NaiveDate, hardware: Hardware) -> Result<bool, StoreError>;
}
