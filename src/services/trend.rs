//! Historical trend assembly for dashboards.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::models::{
    benchmark_tasks, runtime_to_minutes, BenchmarkSeries, Hardware, TaskStatus, TimeSeries,
};
use crate::infrastructure::readers::FallbackResolver;
use crate::services::aggregator::TaskResultAggregator;

/// Walks a date range and assembles date-aligned time series.
pub struct TrendEngine {
    aggregator: Arc<TaskResultAggregator>,
    resolver: Arc<FallbackResolver>,
}

impl TrendEngine {
    pub fn new(aggregator: Arc<TaskResultAggregator>, resolver: Arc<FallbackResolver>) -> Self {
        Self {
            aggregator,
            resolver,
        }
    }

    /// Available dates, newest first, capped at `max_days`.
    pub async fn get_available_dates(
        &self,
        hardware: Hardware,
        max_days: usize,
    ) -> Vec<NaiveDate> {
        let mut dates = self.resolver.list_dates(hardware).await;
        dates.reverse();
        dates.truncate(max_days);
        dates
    }

    /// Time series over up to `days` available dates, oldest to newest.
    ///
    /// Every tracked benchmark gets an entry per date; a task that did not
    /// appear on some date gets explicit `Unknown`/`None` placeholders so
    /// all series stay equal-length and date-aligned.
    pub async fn trend(&self, hardware: Hardware, days: usize) -> TimeSeries {
        let mut dates = self.resolver.list_dates(hardware).await;
        let skip = dates.len().saturating_sub(days);
        dates.drain(..skip);

        let mut series = TimeSeries::default();
        for task in benchmark_tasks() {
            series
                .benchmarks
                .insert(task.name.to_string(), BenchmarkSeries::default());
        }

        for date in dates {
            let task_results = self.aggregator.collect(date, hardware).await;
            let sanity = self
                .aggregator
                .parse_sanity_check_log(date, hardware)
                .await
                .map(|o| o.model_results)
                .unwrap_or_default();
            let stats = self.aggregator.summarize(&task_results, &sanity);

            series.dates.push(date);
            series.overall_status.push(stats.overall_status);
            series.passed.push(stats.passed);
            series.failed.push(stats.failed);
            series.total.push(stats.total_tasks);

            let attempted = stats.total_tasks - stats.not_run;
            let pass_rate = if attempted > 0 {
                stats.passed as f64 / attempted as f64 * 100.0
            } else {
                0.0
            };
            series.pass_rate.push(pass_rate);

            for task in benchmark_tasks() {
                let column = series
                    .benchmarks
                    .entry(task.name.to_string())
                    .or_default();
                match task_results.get(task.name) {
                    Some(result) => {
                        column.status.push(result.status);
                        column.accuracy_pct.push(result.accuracy.map(|a| a * 100.0));
                        column.runtime_minutes.push(
                            result.runtime.as_deref().and_then(runtime_to_minutes),
                        );
                    }
                    None => {
                        column.status.push(TaskStatus::Unknown);
                        column.accuracy_pct.push(None);
                        column.runtime_minutes.push(None);
                    }
                }
            }
        }

        info!(%hardware, points = series.dates.len(), "trend assembled");
        debug_assert!(series.is_aligned());
        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::OverallStatus;
    use crate::domain::ports::{LogSelector, SourceError, SourceReader};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Per-date cron fixtures; everything else is a miss.
    struct DatedSource {
        cron_by_date: HashMap<NaiveDate, HashMap<String, String>>,
    }

    #[async_trait]
    impl SourceReader for DatedSource {
        fn name(&self) -> &'static str {
            "dated"
        }

        async fn find_log(
            &self,
            _: Hardware,
            date: NaiveDate,
            selector: &LogSelector,
        ) -> Result<Option<String>, SourceError> {
            let LogSelector::CronLog { file_name } = selector else {
                return Ok(None);
            };
            Ok(self
                .cron_by_date
                .get(&date)
                .and_then(|logs| logs.get(file_name))
                .cloned())
        }

        async fn list_dates(&self, _: Hardware) -> Result<Vec<NaiveDate>, SourceError> {
            let mut dates: Vec<_> = self.cron_by_date.keys().copied().collect();
            dates.sort_unstable();
            Ok(dates)
        }
    }

    fn engine(source: DatedSource) -> TrendEngine {
        let resolver = Arc::new(FallbackResolver::new(vec![Arc::new(source)]));
        let aggregator = Arc::new(TaskResultAggregator::new(resolver.clone(), None));
        TrendEngine::new(aggregator, resolver)
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, day).unwrap()
    }

    fn fixtures(days: &[(u32, &[(&str, &str)])]) -> DatedSource {
        let mut cron_by_date = HashMap::new();
        for (day, logs) in days {
            let map: HashMap<String, String> = logs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect();
            cron_by_date.insert(d(*day), map);
        }
        DatedSource { cron_by_date }
    }

    #[tokio::test]
    async fn test_series_stay_aligned_with_gaps() {
        // Day 28 has a benchmark cron log; day 29 has nothing for it.
        let source = fixtures(&[
            (28, &[("deepseek_online", "Result: PASSED\n")]),
            (29, &[("unit_test", "Result: PASSED\n")]),
        ]);

        let series = engine(source).trend(Hardware::Mi30x, 10).await;
        assert_eq!(series.dates, vec![d(28), d(29)]);
        assert!(series.is_aligned());

        let deepseek = &series.benchmarks["DeepSeek Online"];
        assert_eq!(deepseek.status, vec![TaskStatus::Pass, TaskStatus::NotRun]);
        assert_eq!(deepseek.accuracy_pct, vec![None, None]);
    }

    #[tokio::test]
    async fn test_days_cap_keeps_newest() {
        let source = fixtures(&[
            (27, &[("unit_test", "Result: PASSED\n")]),
            (28, &[("unit_test", "Result: PASSED\n")]),
            (29, &[("unit_test", "Result: FAILED\n")]),
        ]);

        let series = engine(source).trend(Hardware::Mi30x, 2).await;
        assert_eq!(series.dates, vec![d(28), d(29)]);
        assert_eq!(
            series.overall_status,
            vec![OverallStatus::Partial, OverallStatus::Failed]
        );
    }

    #[tokio::test]
    async fn test_pass_rate_ignores_not_run() {
        let source = fixtures(&[(
            29,
            &[
                ("unit_test", "Result: PASSED\n"),
                ("pd_disagg", "Result: FAILED\n"),
            ],
        )]);

        let series = engine(source).trend(Hardware::Mi30x, 10).await;
        // Two attempted tasks, one passed: 50%, the 8 absent ones excluded.
        assert!((series.pass_rate[0] - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_history_yields_empty_series() {
        let series = engine(fixtures(&[])).trend(Hardware::Mi35x, 10).await;
        assert!(series.dates.is_empty());
        assert!(series.is_aligned());
        // Benchmark columns exist even with no dates.
        assert_eq!(series.benchmarks.len(), 3);
    }

    #[tokio::test]
    async fn test_available_dates_descending_and_capped() {
        let source = fixtures(&[(27, &[]), (28, &[]), (29, &[])]);
        let dates = engine(source)
            .get_available_dates(Hardware::Mi30x, 2)
            .await;
        assert_eq!(dates, vec![d(29), d(28)]);
    }
}
