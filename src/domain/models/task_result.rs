//! Per-task and per-model result types.

use serde::{Deserialize, Serialize};

use super::status::TaskStatus;

/// Longest error detail retained on a task result.
pub const MAX_ERROR_LEN: usize = 100;

/// Raw output of the log classifier for one log, before source bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub status: TaskStatus,
    /// Human-readable runtime, e.g. "1h 5m" or "30m"
    pub runtime: Option<String>,
    /// Short error detail, already truncated
    pub error: Option<String>,
    /// GSM8K accuracy in [0, 1], benchmark logs only
    pub accuracy: Option<f64>,
}

impl ClassificationResult {
    pub fn unknown() -> Self {
        Self {
            status: TaskStatus::Unknown,
            runtime: None,
            error: None,
            accuracy: None,
        }
    }
}

/// Consolidated result for one catalog task on one (date, hardware).
///
/// `exists` distinguishes "log present but inconclusive" from "no log was
/// found in any source"; `exists == false` implies status Unknown or NotRun.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub status: TaskStatus,
    pub exists: bool,
    pub runtime: Option<String>,
    pub error: Option<String>,
    pub accuracy: Option<f64>,
}

impl TaskResult {
    /// Result for a task whose log was found and classified.
    pub fn from_classification(c: ClassificationResult) -> Self {
        Self {
            status: c.status,
            exists: true,
            runtime: c.runtime,
            error: c.error.map(|e| truncate_error(&e)),
            accuracy: c.accuracy,
        }
    }

    /// Result for a task with no log in any configured source.
    pub fn absent() -> Self {
        Self {
            status: TaskStatus::NotRun,
            exists: false,
            runtime: None,
            error: None,
            accuracy: None,
        }
    }

    /// Result for a task whose log shows an unmet infrastructure
    /// precondition (e.g. the Docker image was never available).
    pub fn precondition_not_met(reason: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::NotRun,
            exists: false,
            runtime: None,
            error: Some(truncate_error(&reason.into())),
            accuracy: None,
        }
    }

    /// Check the `exists == false => status in {Unknown, NotRun}` invariant.
    pub fn is_consistent(&self) -> bool {
        self.exists || matches!(self.status, TaskStatus::Unknown | TaskStatus::NotRun)
    }
}

/// Truncate an error detail to [`MAX_ERROR_LEN`] on a char boundary.
pub fn truncate_error(error: &str) -> String {
    error.chars().take(MAX_ERROR_LEN).collect()
}

/// One model's outcome from the per-model sanity-check log.
///
/// Model names form an open-ended set, distinct from the fixed task catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanityModelResult {
    pub model_name: String,
    pub status: TaskStatus,
    pub accuracy: f64,
}
