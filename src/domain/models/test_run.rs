//! The consolidated per-day record and its summary statistics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::hardware::Hardware;
use super::status::{OverallStatus, TaskStatus};
use super::task_result::{SanityModelResult, TaskResult};

/// One nightly run record for a (run_date, hardware) pair.
///
/// At most one exists per pair; the store enforces this with a unique
/// constraint and upserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRun {
    pub id: Uuid,
    pub run_date: NaiveDate,
    pub hardware: Hardware,
    pub docker_image: Option<String>,
    pub overall_status: OverallStatus,
    pub total_tasks: i64,
    pub passed_tasks: i64,
    pub failed_tasks: i64,
    pub unknown_tasks: i64,
    pub not_run_tasks: i64,
    /// Best-effort start timestamp extracted from logs
    pub run_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TestRun {
    pub fn new(run_date: NaiveDate, hardware: Hardware, stats: &SummaryStats) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            run_date,
            hardware,
            docker_image: None,
            overall_status: stats.overall_status,
            total_tasks: stats.total_tasks,
            passed_tasks: stats.passed,
            failed_tasks: stats.failed,
            unknown_tasks: stats.unknown,
            not_run_tasks: stats.not_run,
            run_timestamp: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check the `total == passed + failed + unknown + not_run` invariant.
    pub fn counts_consistent(&self) -> bool {
        self.total_tasks
            == self.passed_tasks + self.failed_tasks + self.unknown_tasks + self.not_run_tasks
    }
}

/// Summary statistics over one day's task and sanity results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub overall_status: OverallStatus,
    pub total_tasks: i64,
    pub passed: i64,
    pub failed: i64,
    pub unknown: i64,
    pub not_run: i64,
}

impl SummaryStats {
    /// Fold task results and per-model sanity results into one count set.
    ///
    /// Each sanity model counts as one task; the container entry named by
    /// `exclude_task` is skipped so the container and its children are never
    /// double-counted.
    pub fn compute<'a, I>(
        task_results: I,
        sanity_results: &[SanityModelResult],
        exclude_task: &str,
    ) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a TaskResult)>,
    {
        let mut passed = 0;
        let mut failed = 0;
        let mut unknown = 0;
        let mut not_run = 0;

        for (name, result) in task_results {
            if name == exclude_task {
                continue;
            }
            match result.status {
                TaskStatus::Pass => passed += 1,
                TaskStatus::Fail => failed += 1,
                TaskStatus::Unknown => unknown += 1,
                TaskStatus::NotRun => not_run += 1,
            }
        }
        for model in sanity_results {
            match model.status {
                TaskStatus::Pass => passed += 1,
                TaskStatus::Fail => failed += 1,
                TaskStatus::Unknown | TaskStatus::NotRun => unknown += 1,
            }
        }

        let overall_status = if failed > 0 {
            OverallStatus::Failed
        } else if unknown > 0 || not_run > 0 {
            OverallStatus::Partial
        } else if passed > 0 {
            OverallStatus::Passed
        } else {
            OverallStatus::Unknown
        };

        Self {
            overall_status,
            total_tasks: passed + failed + unknown + not_run,
            passed,
            failed,
            unknown,
            not_run,
        }
    }
}

/// Pointer to a raw log artifact; never authoritative data itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogReference {
    pub kind: String,
    pub local_path: Option<String>,
    pub remote_url: Option<String>,
}

/// Pointer to a rendered plot artifact for dashboard consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotReference {
    pub kind: String,
    pub local_path: Option<String>,
    pub remote_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result(status: TaskStatus) -> TaskResult {
        TaskResult {
            status,
            exists: status != TaskStatus::NotRun,
            runtime: None,
            error: None,
            accuracy: None,
        }
    }

    #[test]
    fn test_counts_always_sum_to_total() {
        let mut tasks = BTreeMap::new();
        tasks.insert("a".to_string(), result(TaskStatus::Pass));
        tasks.insert("b".to_string(), result(TaskStatus::Fail));
        tasks.insert("c".to_string(), result(TaskStatus::Unknown));
        tasks.insert("d".to_string(), result(TaskStatus::NotRun));

        let stats = SummaryStats::compute(&tasks, &[], "Sanity Check");
        assert_eq!(
            stats.total_tasks,
            stats.passed + stats.failed + stats.unknown + stats.not_run
        );
        assert_eq!(stats.total_tasks, 4);
    }

    #[test]
    fn test_container_task_excluded_and_models_folded_in() {
        let mut tasks = BTreeMap::new();
        tasks.insert("Unit Tests".to_string(), result(TaskStatus::Pass));
        tasks.insert("Sanity Check".to_string(), result(TaskStatus::Pass));

        let models = vec![
            SanityModelResult {
                model_name: "llama".to_string(),
                status: TaskStatus::Pass,
                accuracy: 0.9,
            },
            SanityModelResult {
                model_name: "qwen".to_string(),
                status: TaskStatus::Fail,
                accuracy: 0.2,
            },
        ];

        let stats = SummaryStats::compute(&tasks, &models, "Sanity Check");
        // "Sanity Check" itself not counted; its two models are.
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.passed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.overall_status, OverallStatus::Failed);
    }

    #[test]
    fn test_overall_status_precedence() {
        let mut all_pass = BTreeMap::new();
        all_pass.insert("a".to_string(), result(TaskStatus::Pass));
        let stats = SummaryStats::compute(&all_pass, &[], "Sanity Check");
        assert_eq!(stats.overall_status, OverallStatus::Passed);

        let mut with_unknown = all_pass.clone();
        with_unknown.insert("b".to_string(), result(TaskStatus::Unknown));
        let stats = SummaryStats::compute(&with_unknown, &[], "Sanity Check");
        assert_eq!(stats.overall_status, OverallStatus::Partial);

        let mut with_fail = with_unknown.clone();
        with_fail.insert("c".to_string(), result(TaskStatus::Fail));
        let stats = SummaryStats::compute(&with_fail, &[], "Sanity Check");
        assert_eq!(stats.overall_status, OverallStatus::Failed);

        let empty: BTreeMap<String, TaskResult> = BTreeMap::new();
        let stats = SummaryStats::compute(&empty, &[], "Sanity Check");
        assert_eq!(stats.overall_status, OverallStatus::Unknown);
    }

    #[test]
    fn test_test_run_invariant_helper() {
        let stats = SummaryStats {
            overall_status: OverallStatus::Passed,
            total_tasks: 2,
            passed: 2,
            failed: 0,
            unknown: 0,
            not_run: 0,
        };
        let run = TestRun::new(
            NaiveDate::from_ymd_opt(2025, 8, 29).unwrap(),
            Hardware::Mi30x,
            &stats,
        );
        assert!(run.counts_consistent());
    }
}
