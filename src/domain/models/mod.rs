//! Pure domain data types.

pub mod catalog;
pub mod config;
pub mod hardware;
pub mod status;
pub mod task_result;
pub mod test_run;
pub mod trend;

pub use catalog::{
    benchmark_tasks, find_task, task_catalog, TaskGroup, TaskSpec, DOCKER_IMAGE_CHECK_TASK,
    SANITY_CHECK_TASK,
};
pub use config::{
    CollectionConfig, CollectionMode, Config, DatabaseConfig, LoggingConfig, RemoteConfig,
};
pub use hardware::Hardware;
pub use status::{OverallStatus, TaskStatus};
pub use task_result::{
    truncate_error, ClassificationResult, SanityModelResult, TaskResult, MAX_ERROR_LEN,
};
pub use test_run::{LogReference, PlotReference, SummaryStats, TestRun};
pub use trend::{runtime_to_minutes, BenchmarkSeries, TimeSeries};
