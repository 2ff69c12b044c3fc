//! Status enums for individual tasks and whole runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Outcome of a single nightly task, as decided by log classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Log shows the task completed successfully
    Pass,
    /// Log shows an explicit failure
    Fail,
    /// Log present but inconclusive
    Unknown,
    /// Task never ran (missing log or unmet infrastructure precondition)
    NotRun,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Unknown => "unknown",
            Self::NotRun => "not_run",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pass" | "passed" => Ok(Self::Pass),
            "fail" | "failed" => Ok(Self::Fail),
            "unknown" => Ok(Self::Unknown),
            "not_run" | "not-run" => Ok(Self::NotRun),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// Derived status of one whole (date, hardware) run.
///
/// Precedence: any fail => Failed; else any unknown/not-run => Partial;
/// else any pass => Passed; else Unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Passed,
    Failed,
    Partial,
    Unknown,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Partial => "partial",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            "partial" => Ok(Self::Partial),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown overall status: {other}")),
        }
    }
}
