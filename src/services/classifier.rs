//! Log status classification.
//!
//! Turns raw nightly log text into a [`ClassificationResult`]. Pure and
//! deterministic: no I/O, never panics on malformed input, and anything
//! that matches no known pattern resolves to `Unknown` rather than an error.
//!
//! Branch order within each family is load-bearing. A timing-summary log
//! that prints a valid-looking accuracy after a crash must still classify
//! as `fail`, so error markers are checked before the accuracy branch. The
//! cron family is strictly first-match-wins, which means an early pass
//! marker can shadow a later fail marker in the same log; that matches the
//! behaviour of the nightly scripts these logs come from.

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use tracing::debug;

use crate::domain::models::{truncate_error, ClassificationResult, TaskStatus};

/// Which classification family applies to a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// Benchmark / integration-test timing summary
    TimingSummary,
    /// Generic cron log (validation checks, fallback logs)
    CronLog,
}

/// Marker printed at the start of a benchmark run.
const START_MARKER: &str = "Script started at:";

/// A short log without these tokens is assumed truncated or crashed.
const SHORT_LOG_LINES: usize = 20;

/// Phrasings the nightly scripts emit when the Docker image never became
/// available. These are infrastructure preconditions, not task failures.
const IMAGE_UNAVAILABLE_MARKERS: [&str; 5] = [
    "Image not available",
    "Docker image not found",
    "manifest unknown",
    "pull access denied",
    "Failed to pull image",
];

/// Classifies raw log text, with all patterns compiled once up front.
pub struct LogStatusClassifier {
    accuracy: Regex,
    runtime: Regex,
    missing_images: Regex,
    docker_image: Regex,
    start_timestamp: Regex,
    error_details: Vec<Regex>,
}

impl Default for LogStatusClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStatusClassifier {
    pub fn new() -> Self {
        Self {
            accuracy: Regex::new(r"GSM8K accuracy:\s*([0-9]*\.?[0-9]+)").unwrap(),
            runtime: Regex::new(
                r"Total execution time:\s*([0-9]+(?:\.[0-9]+)?)\s*seconds\s*\(([0-9]+(?:\.[0-9]+)?)\s*minutes\)",
            )
            .unwrap(),
            missing_images: Regex::new(r"Missing images:\s*([0-9]+)").unwrap(),
            docker_image: Regex::new(r"(?m)^(?:Using image|Image):\s*(\S+)").unwrap(),
            start_timestamp: Regex::new(r"Script started at:\s*(.+)").unwrap(),
            // Fallback order for fail detail extraction; first capture wins.
            error_details: vec![
                Regex::new(r"Error: (.+)").unwrap(),
                Regex::new(r"FAILED\s*\((.+?)\)").unwrap(),
                Regex::new(r"RuntimeError: (.+)").unwrap(),
                Regex::new(r"bash: (.+)").unwrap(),
            ],
        }
    }

    /// Classify one log. Always returns a result.
    pub fn classify(&self, kind: LogKind, text: &str) -> ClassificationResult {
        match kind {
            LogKind::TimingSummary => self.classify_timing_summary(text),
            LogKind::CronLog => self.classify_cron_log(text),
        }
    }

    fn classify_timing_summary(&self, text: &str) -> ClassificationResult {
        // Accuracy and runtime extraction are independent of the status
        // decision; a failed run may still carry both.
        let accuracy = self
            .accuracy
            .captures(text)
            .and_then(|c| c[1].parse::<f64>().ok());
        let runtime = self.extract_runtime(text);

        let has_completion = has_completion_marker(text);

        // A run that announced itself but never printed a completion marker
        // died mid-flight.
        if text.contains(START_MARKER) && !has_completion {
            return ClassificationResult {
                status: TaskStatus::Fail,
                runtime,
                error: Some("Test did not complete".to_string()),
                accuracy,
            };
        }

        // Truncated or crashed before producing anything recognizable.
        if text.lines().count() < SHORT_LOG_LINES
            && !text.contains("GSM8K")
            && !text.contains("Total execution time")
        {
            return ClassificationResult {
                status: TaskStatus::Fail,
                runtime,
                error: Some("Test failed or did not complete".to_string()),
                accuracy,
            };
        }

        let runtime_errors = text.matches("RuntimeError").count();
        if runtime_errors > 0 {
            return ClassificationResult {
                status: TaskStatus::Fail,
                runtime,
                error: Some(format!("{runtime_errors} RuntimeError(s) in log")),
                accuracy,
            };
        }

        if text.contains("Server error status: FAIL") {
            return ClassificationResult {
                status: TaskStatus::Fail,
                runtime,
                error: Some("Server error status: FAIL".to_string()),
                accuracy,
            };
        }

        if accuracy.is_some() {
            return ClassificationResult {
                status: TaskStatus::Pass,
                runtime,
                error: None,
                accuracy,
            };
        }

        debug!(has_completion, "timing-summary log inconclusive");
        ClassificationResult {
            status: TaskStatus::Unknown,
            runtime,
            error: None,
            accuracy,
        }
    }

    fn classify_cron_log(&self, text: &str) -> ClassificationResult {
        if text.contains("command not found") {
            return ClassificationResult {
                status: TaskStatus::Fail,
                runtime: None,
                error: self.extract_error_detail(text),
                accuracy: None,
            };
        }

        // Image never became available: the task was not attempted and must
        // not count as one.
        if let Some(marker) = IMAGE_UNAVAILABLE_MARKERS
            .iter()
            .find(|m| text.contains(*m))
        {
            return ClassificationResult {
                status: TaskStatus::NotRun,
                runtime: None,
                error: Some((*marker).to_string()),
                accuracy: None,
            };
        }

        if text.contains("Result: PASSED")
            || text.contains("Models passed:")
            || (text.contains("Overall:") && text.contains("models passed (100"))
            || text.contains('✅')
            || text.contains("Total execution time:")
        {
            return ClassificationResult {
                status: TaskStatus::Pass,
                runtime: self.extract_runtime(text),
                error: None,
                accuracy: None,
            };
        }

        if text.contains("test FAILED")
            || text.contains("Result: FAILED")
            || (text.contains("FAIL") && text.contains("[test]"))
        {
            return ClassificationResult {
                status: TaskStatus::Fail,
                runtime: None,
                error: self.extract_error_detail(text),
                accuracy: None,
            };
        }

        ClassificationResult::unknown()
    }

    /// Runtime from "Total execution time: <secs> seconds (<mins> minutes)",
    /// rendered as "<h>h <m>m" or "<m>m".
    fn extract_runtime(&self, text: &str) -> Option<String> {
        let captures = self.runtime.captures(text)?;
        let minutes = captures[2].parse::<f64>().ok()?;
        let total = minutes.round() as i64;
        if total >= 60 {
            Some(format!("{}h {}m", total / 60, total % 60))
        } else {
            Some(format!("{total}m"))
        }
    }

    /// First matching error detail, truncated to the storage bound.
    fn extract_error_detail(&self, text: &str) -> Option<String> {
        for pattern in &self.error_details {
            if let Some(captures) = pattern.captures(text) {
                let detail = captures[1].lines().next().unwrap_or("").trim();
                return Some(truncate_error(detail));
            }
        }
        None
    }

    /// Count of missing Docker images from a docker-check log, if reported.
    pub fn missing_image_count(&self, text: &str) -> Option<usize> {
        self.missing_images
            .captures(text)
            .and_then(|c| c[1].parse::<usize>().ok())
    }

    /// Docker image name from a docker-check log, best effort.
    pub fn docker_image_name(&self, text: &str) -> Option<String> {
        self.docker_image
            .captures(text)
            .map(|c| c[1].to_string())
    }

    /// Run start timestamp, best effort across the formats the scripts use.
    pub fn run_timestamp(&self, text: &str) -> Option<DateTime<Utc>> {
        let raw = self.start_timestamp.captures(text)?;
        let raw = raw[1].trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

fn has_completion_marker(text: &str) -> bool {
    text.contains("Total execution time:")
        || (text.contains("End time:") && text.contains("Total duration:"))
        || text.contains("Server error status: PASS")
        || text.contains("Server error status: FAIL")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> LogStatusClassifier {
        LogStatusClassifier::new()
    }

    fn pad_lines(text: &str) -> String {
        // Push a log past the short-log heuristic without adding markers.
        format!("{}{}", "benchmark output line\n".repeat(25), text)
    }

    // Timing-summary family

    #[test]
    fn test_incomplete_run_fails_with_specific_error() {
        let result = classifier().classify(
            LogKind::TimingSummary,
            "Script started at: 2025-08-29 01:00:00\n",
        );
        assert_eq!(result.status, TaskStatus::Fail);
        assert_eq!(result.error.as_deref(), Some("Test did not complete"));
    }

    #[test]
    fn test_short_log_without_markers_fails() {
        let result = classifier().classify(LogKind::TimingSummary, "garbage\nmore garbage\n");
        assert_eq!(result.status, TaskStatus::Fail);
        assert_eq!(
            result.error.as_deref(),
            Some("Test failed or did not complete")
        );
    }

    #[test]
    fn test_accuracy_and_runtime_pass() {
        let text = pad_lines(
            "GSM8K accuracy: 0.93\nTotal execution time: 1800 seconds (30 minutes)\n",
        );
        let result = classifier().classify(LogKind::TimingSummary, &text);
        assert_eq!(result.status, TaskStatus::Pass);
        assert_eq!(result.accuracy, Some(0.93));
        assert_eq!(result.runtime.as_deref(), Some("30m"));
    }

    #[test]
    fn test_runtime_over_an_hour_formats_hours() {
        let text = pad_lines(
            "GSM8K accuracy: 0.9\nTotal execution time: 4500 seconds (75 minutes)\n",
        );
        let result = classifier().classify(LogKind::TimingSummary, &text);
        assert_eq!(result.runtime.as_deref(), Some("1h 15m"));
    }

    #[test]
    fn test_runtime_errors_dominate_accuracy() {
        // Error markers must win even when a plausible accuracy follows.
        let text = pad_lines(
            "RuntimeError: CUDA out of memory\nGSM8K accuracy: 0.91\nTotal execution time: 100 seconds (2 minutes)\n",
        );
        let result = classifier().classify(LogKind::TimingSummary, &text);
        assert_eq!(result.status, TaskStatus::Fail);
        assert!(result.error.unwrap().contains("1 RuntimeError"));
        assert_eq!(result.accuracy, Some(0.91));
    }

    #[test]
    fn test_server_error_status_fail() {
        let text = pad_lines("Server error status: FAIL\nTotal execution time: 60 seconds (1 minutes)\n");
        let result = classifier().classify(LogKind::TimingSummary, &text);
        assert_eq!(result.status, TaskStatus::Fail);
    }

    #[test]
    fn test_completed_without_accuracy_is_unknown() {
        let text = pad_lines("Total execution time: 600 seconds (10 minutes)\n");
        let result = classifier().classify(LogKind::TimingSummary, &text);
        assert_eq!(result.status, TaskStatus::Unknown);
        assert_eq!(result.runtime.as_deref(), Some("10m"));
    }

    #[test]
    fn test_end_time_with_duration_counts_as_completion() {
        let text = "Script started at: 2025-08-29 01:00:00\nEnd time: 2025-08-29 02:00:00\nTotal duration: 3600\n";
        let result = classifier().classify(LogKind::TimingSummary, text);
        // Completed, but short and markerless: the truncation heuristic fires.
        assert_ne!(result.error.as_deref(), Some("Test did not complete"));
    }

    // Cron-log family

    #[test]
    fn test_cron_command_not_found_fails() {
        let text = "bash: run_nightly.sh: command not found\n";
        let result = classifier().classify(LogKind::CronLog, text);
        assert_eq!(result.status, TaskStatus::Fail);
        assert_eq!(
            result.error.as_deref(),
            Some("run_nightly.sh: command not found")
        );
    }

    #[test]
    fn test_cron_image_unavailable_is_not_run() {
        for marker in IMAGE_UNAVAILABLE_MARKERS {
            let result = classifier().classify(LogKind::CronLog, marker);
            assert_eq!(result.status, TaskStatus::NotRun, "marker: {marker}");
        }
    }

    #[test]
    fn test_cron_pass_markers() {
        for text in [
            "Result: PASSED",
            "Models passed: 12/12",
            "Overall: 12 models passed (100%)",
            "all good ✅",
            "Total execution time: 60 seconds (1 minutes)",
        ] {
            let result = classifier().classify(LogKind::CronLog, text);
            assert_eq!(result.status, TaskStatus::Pass, "text: {text}");
        }
    }

    #[test]
    fn test_cron_fail_markers() {
        for text in [
            "unit test FAILED",
            "Result: FAILED",
            "[test] suite FAIL",
        ] {
            let result = classifier().classify(LogKind::CronLog, text);
            assert_eq!(result.status, TaskStatus::Fail, "text: {text}");
        }
    }

    #[test]
    fn test_cron_fail_marker_alone_is_not_enough() {
        // "FAIL" only counts alongside a "[test]" tag.
        let result = classifier().classify(LogKind::CronLog, "FAIL whale ascii art");
        assert_eq!(result.status, TaskStatus::Unknown);
    }

    #[test]
    fn test_cron_pass_marker_shadows_later_fail_marker() {
        // First-match-wins: the checkmark branch is evaluated before the
        // fail branches, so this log classifies as pass.
        let text = "step one ✅\nstep two: unit test FAILED\n";
        let result = classifier().classify(LogKind::CronLog, text);
        assert_eq!(result.status, TaskStatus::Pass);
    }

    #[test]
    fn test_cron_empty_log_is_unknown() {
        let result = classifier().classify(LogKind::CronLog, "");
        assert_eq!(result.status, TaskStatus::Unknown);
    }

    #[test]
    fn test_cron_error_detail_truncated() {
        let text = format!("Result: FAILED\nError: {}\n", "e".repeat(300));
        let result = classifier().classify(LogKind::CronLog, &text);
        assert_eq!(result.error.unwrap().len(), 100);
    }

    #[test]
    fn test_cron_error_detail_fallback_order() {
        // "Error:" wins over a later RuntimeError line.
        let text = "Result: FAILED\nRuntimeError: second\nError: first\n";
        let result = classifier().classify(LogKind::CronLog, text);
        assert_eq!(result.error.as_deref(), Some("first"));
    }

    // Docker-check helpers

    #[test]
    fn test_missing_image_count() {
        let c = classifier();
        assert_eq!(c.missing_image_count("Missing images: 2"), Some(2));
        assert_eq!(c.missing_image_count("Missing images: 0"), Some(0));
        assert_eq!(c.missing_image_count("all present"), None);
    }

    #[test]
    fn test_docker_image_name() {
        let c = classifier();
        assert_eq!(
            c.docker_image_name("Using image: rocm/nightly:2025-08-29"),
            Some("rocm/nightly:2025-08-29".to_string())
        );
    }

    #[test]
    fn test_run_timestamp_formats() {
        let c = classifier();
        assert!(c
            .run_timestamp("Script started at: 2025-08-29T01:00:00+00:00")
            .is_some());
        assert!(c
            .run_timestamp("Script started at: 2025-08-29 01:00:00")
            .is_some());
        assert!(c.run_timestamp("Script started at: whenever").is_none());
    }
}
