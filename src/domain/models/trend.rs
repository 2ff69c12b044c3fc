//! Time-series shapes for dashboard consumers.
//!
//! All vectors inside a [`TimeSeries`] are equal-length and index-aligned
//! with `dates`; a task missing on some date gets an explicit placeholder
//! rather than a shorter series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::status::{OverallStatus, TaskStatus};

/// Per-benchmark sub-series, date-aligned with the parent series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSeries {
    /// Status per date; `Unknown` when the task did not appear at all
    pub status: Vec<TaskStatus>,
    /// Accuracy in percent, `None` when not extracted
    pub accuracy_pct: Vec<Option<f64>>,
    /// Runtime in minutes, `None` when not extracted
    pub runtime_minutes: Vec<Option<f64>>,
}

/// Historical trends over a date range, oldest to newest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub dates: Vec<NaiveDate>,
    pub overall_status: Vec<OverallStatus>,
    pub passed: Vec<i64>,
    pub failed: Vec<i64>,
    pub total: Vec<i64>,
    /// Percent of attempted tasks that passed; 0 when nothing was attempted
    pub pass_rate: Vec<f64>,
    pub benchmarks: BTreeMap<String, BenchmarkSeries>,
}

impl TimeSeries {
    /// Every column has exactly one entry per date.
    pub fn is_aligned(&self) -> bool {
        let n = self.dates.len();
        self.overall_status.len() == n
            && self.passed.len() == n
            && self.failed.len() == n
            && self.total.len() == n
            && self.pass_rate.len() == n
            && self.benchmarks.values().all(|b| {
                b.status.len() == n && b.accuracy_pct.len() == n && b.runtime_minutes.len() == n
            })
    }
}

/// Parse a classifier runtime string ("1h 5m", "30m") into minutes.
pub fn runtime_to_minutes(runtime: &str) -> Option<f64> {
    let mut minutes = 0.0;
    let mut matched = false;
    for part in runtime.split_whitespace() {
        if let Some(h) = part.strip_suffix('h') {
            minutes += h.parse::<f64>().ok()? * 60.0;
            matched = true;
        } else if let Some(m) = part.strip_suffix('m') {
            minutes += m.parse::<f64>().ok()?;
            matched = true;
        } else {
            return None;
        }
    }
    matched.then_some(minutes)
}
