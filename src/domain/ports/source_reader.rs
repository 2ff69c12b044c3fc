//! Port for log sources.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::models::Hardware;

/// Errors a source can hit while resolving a log.
///
/// All of these are non-fatal to aggregation: the resolver treats them the
/// same as a miss and falls through to the next source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected listing payload: {0}")]
    Payload(String),

    #[error("store error: {0}")]
    Store(String),
}

/// Logical identity of the log a caller wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSelector {
    /// A benchmark/integration timing-summary log under `online/`.
    TimingSummary {
        /// Candidate model directories, tried in order
        model_dirs: Vec<String>,
        /// Run-directory suffix, matched at an exact `_` boundary
        mode_suffix: String,
    },
    /// A named cron log under `cron/cron_log/{hw}/{date}/`.
    CronLog { file_name: String },
    /// The multi-model sanity-check timing summary.
    SanityCheck,
}

impl LogSelector {
    pub fn timing_summary(model_dirs: &[&str], mode_suffix: &str) -> Self {
        Self::TimingSummary {
            model_dirs: model_dirs.iter().map(ToString::to_string).collect(),
            mode_suffix: mode_suffix.to_string(),
        }
    }

    pub fn cron_log(file_name: &str) -> Self {
        Self::CronLog {
            file_name: file_name.to_string(),
        }
    }
}

/// One layered log source: local filesystem, remote mirror, or cache.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Name for logging and fallback diagnostics.
    fn name(&self) -> &'static str;

    /// Resolve a logical log identity to raw text.
    ///
    /// `Ok(None)` means the source is reachable but has no such log;
    /// `Err` means the source itself misbehaved. The resolver treats both
    /// as a miss.
    async fn find_log(
        &self,
        hardware: Hardware,
        date: NaiveDate,
        selector: &LogSelector,
    ) -> Result<Option<String>, SourceError>;

    /// Dates this source has any data for, sorted ascending.
    async fn list_dates(&self, hardware: Hardware) -> Result<Vec<NaiveDate>, SourceError>;
}
