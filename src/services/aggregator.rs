//! Per-day task aggregation.
//!
//! Walks the fixed task catalog for one (date, hardware) pair, resolves
//! each task's log through the source fallback chain, classifies it, and
//! produces one consolidated result map plus summary statistics. One task's
//! trouble never aborts the rest of the day.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::domain::models::{
    task_catalog, Hardware, LogReference, SanityModelResult, SummaryStats, TaskResult, TaskStatus,
    TestRun, DOCKER_IMAGE_CHECK_TASK, SANITY_CHECK_TASK,
};
use crate::domain::ports::{LogSelector, StoredRun};
use crate::infrastructure::readers::{CachedReader, FallbackResolver};
use crate::services::classifier::{LogKind, LogStatusClassifier};
use crate::services::sanity::SanityAggregator;

/// Per-model sanity results plus where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SanityCheckOutcome {
    pub model_results: Vec<SanityModelResult>,
    pub log_file: String,
}

/// Aggregates one day's nightly results across all configured sources.
pub struct TaskResultAggregator {
    resolver: Arc<FallbackResolver>,
    cache: Option<CachedReader>,
    classifier: LogStatusClassifier,
    sanity: SanityAggregator,
}

impl TaskResultAggregator {
    pub fn new(resolver: Arc<FallbackResolver>, cache: Option<CachedReader>) -> Self {
        Self {
            resolver,
            cache,
            classifier: LogStatusClassifier::new(),
            sanity: SanityAggregator::new(),
        }
    }

    /// One consolidated result per catalog task.
    ///
    /// Consults the cache first when enabled; a hit returns the stored map
    /// without touching any log source.
    pub async fn collect(
        &self,
        date: NaiveDate,
        hardware: Hardware,
    ) -> BTreeMap<String, TaskResult> {
        if let Some(cache) = &self.cache {
            if let Some(stored) = cache.find_run(date, hardware).await {
                return stored.task_results;
            }
        }
        self.collect_fresh(date, hardware).await.task_results
    }

    /// Summary statistics over one day's results.
    ///
    /// Each sanity model counts as one task; the "Sanity Check" container
    /// entry is excluded so it and its children are never double-counted.
    pub fn summarize(
        &self,
        task_results: &BTreeMap<String, TaskResult>,
        sanity_results: &[SanityModelResult],
    ) -> SummaryStats {
        SummaryStats::compute(task_results, sanity_results, SANITY_CHECK_TASK)
    }

    /// Per-model sanity results for the day, if the sanity log exists.
    pub async fn parse_sanity_check_log(
        &self,
        date: NaiveDate,
        hardware: Hardware,
    ) -> Option<SanityCheckOutcome> {
        let text = self
            .resolver
            .find_log(hardware, date, &LogSelector::SanityCheck)
            .await?;
        Some(SanityCheckOutcome {
            model_results: self.sanity.parse(&text),
            log_file: format!("test/sanity_check_log/{}/{}", hardware.as_str(), date),
        })
    }

    /// Full day's record, ready for one transactional store write.
    pub async fn collect_run(&self, date: NaiveDate, hardware: Hardware) -> StoredRun {
        if let Some(cache) = &self.cache {
            if let Some(stored) = cache.find_run(date, hardware).await {
                return stored;
            }
        }
        self.collect_fresh(date, hardware).await
    }

    async fn collect_fresh(&self, date: NaiveDate, hardware: Hardware) -> StoredRun {
        let mut task_results = BTreeMap::new();
        let mut log_references = Vec::new();
        let mut docker_log: Option<String> = None;
        let mut run_timestamp: Option<DateTime<Utc>> = None;

        for task in task_catalog() {
            let mut found_log = None;

            let result = if task.uses_timing_summary() {
                let selector = LogSelector::timing_summary(task.model_dirs, task.mode_suffix);
                match self.resolver.find_log(hardware, date, &selector).await {
                    Some(text) => {
                        let mut c = self.classifier.classify(LogKind::TimingSummary, &text);
                        if !task.tracks_accuracy() {
                            c.accuracy = None;
                        }
                        if run_timestamp.is_none() {
                            run_timestamp = self.classifier.run_timestamp(&text);
                        }
                        found_log = Some(format!("online/{}", task.model_dirs[0]));
                        TaskResult::from_classification(c)
                    }
                    // Second-tier fallback: the named cron log, beneath the
                    // source-level fallback that already ran.
                    None => self.classify_cron(hardware, date, task.cron_log, &mut found_log).await,
                }
            } else {
                let result = self
                    .classify_cron(hardware, date, task.cron_log, &mut found_log)
                    .await;
                if task.name == DOCKER_IMAGE_CHECK_TASK {
                    docker_log = self
                        .resolver
                        .find_log(hardware, date, &LogSelector::cron_log(task.cron_log))
                        .await;
                }
                result
            };

            if let Some(location) = found_log {
                log_references.push(LogReference {
                    kind: task.name.to_string(),
                    local_path: Some(location),
                    remote_url: None,
                });
            }
            debug!(task = task.name, status = %result.status, "task classified");
            task_results.insert(task.name.to_string(), result);
        }

        // Infrastructure failure is not silent non-execution: when the
        // docker check says images were missing, absent tasks get that
        // specific reason instead of a generic absence.
        let docker_image = docker_log
            .as_deref()
            .and_then(|text| self.classifier.docker_image_name(text));
        if let Some(missing) = docker_log
            .as_deref()
            .and_then(|text| self.classifier.missing_image_count(text))
        {
            if missing > 0 {
                let reason = format!("{missing} Docker image(s) not available");
                for result in task_results.values_mut().filter(|r| !r.exists) {
                    result.error = Some(reason.clone());
                }
            }
        }

        let sanity_results = self
            .parse_sanity_check_log(date, hardware)
            .await
            .map(|outcome| outcome.model_results)
            .unwrap_or_default();

        let stats = self.summarize(&task_results, &sanity_results);
        let mut run = TestRun::new(date, hardware, &stats);
        run.docker_image = docker_image;
        run.run_timestamp = run_timestamp;

        info!(
            %date,
            %hardware,
            overall = %stats.overall_status,
            total = stats.total_tasks,
            "aggregation complete"
        );

        StoredRun {
            run,
            task_results,
            sanity_results,
            log_references,
            plot_references: Vec::new(),
        }
    }

    async fn classify_cron(
        &self,
        hardware: Hardware,
        date: NaiveDate,
        cron_log: &str,
        found_log: &mut Option<String>,
    ) -> TaskResult {
        let selector = LogSelector::cron_log(cron_log);
        match self.resolver.find_log(hardware, date, &selector).await {
            Some(text) => {
                *found_log = Some(format!(
                    "cron/cron_log/{}/{}/{}.log",
                    hardware.as_str(),
                    date,
                    cron_log
                ));
                let c = self.classifier.classify(LogKind::CronLog, &text);
                if c.status == TaskStatus::NotRun {
                    // Precondition not met: present log, unattempted task.
                    let reason = c
                        .error
                        .unwrap_or_else(|| "Docker image not available".to_string());
                    TaskResult::precondition_not_met(reason)
                } else {
                    TaskResult::from_classification(c)
                }
            }
            None => TaskResult::absent(),
        }
    }
}
