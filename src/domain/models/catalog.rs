//! The fixed catalog of nightly tasks.
//!
//! Every aggregation enumerates exactly these entries; task names outside
//! this list never appear in a result map (per-model sanity results live in
//! their own open-ended set).

use serde::{Deserialize, Serialize};

/// Name of the container task whose per-model children are counted instead.
pub const SANITY_CHECK_TASK: &str = "Sanity Check";

/// Name of the validation task whose log drives the image-availability
/// override for absent tasks.
pub const DOCKER_IMAGE_CHECK_TASK: &str = "Docker Image Check";

/// Which of the three catalog partitions a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskGroup {
    /// Performance benchmarks with timing-summary logs
    Benchmark,
    /// Integration-test variants, also timing-summary based
    Integration,
    /// Validation checks, generic cron logs only
    Validation,
}

/// One catalog entry: where its logs live and how to classify them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: &'static str,
    pub group: TaskGroup,
    /// Candidate model directories under `online/`, tried in order.
    /// Empty for validation checks.
    pub model_dirs: &'static [&'static str],
    /// Mode suffix the run directory must end with (exact boundary match).
    pub mode_suffix: &'static str,
    /// Cron log filename (without extension): the fallback log for
    /// benchmark/integration tasks, the only log for validation checks.
    pub cron_log: &'static str,
}

impl TaskSpec {
    /// Whether this task is classified via the timing-summary family first.
    pub fn uses_timing_summary(&self) -> bool {
        matches!(self.group, TaskGroup::Benchmark | TaskGroup::Integration)
    }

    /// Whether accuracy is meaningful for this task.
    pub fn tracks_accuracy(&self) -> bool {
        self.group == TaskGroup::Benchmark
    }
}

/// The full fixed catalog, in display order.
pub fn task_catalog() -> &'static [TaskSpec] {
    &CATALOG
}

/// Benchmark entries only, for trend sub-series.
pub fn benchmark_tasks() -> impl Iterator<Item = &'static TaskSpec> {
    CATALOG.iter().filter(|t| t.group == TaskGroup::Benchmark)
}

/// Look up a catalog entry by name.
pub fn find_task(name: &str) -> Option<&'static TaskSpec> {
    CATALOG.iter().find(|t| t.name == name)
}

static CATALOG: [TaskSpec; 11] = [
    // Performance benchmarks
    TaskSpec {
        name: "DeepSeek Online",
        group: TaskGroup::Benchmark,
        model_dirs: &["deepseek-v3", "deepseek_v3"],
        mode_suffix: "online",
        cron_log: "deepseek_online",
    },
    TaskSpec {
        name: "Llama Online",
        group: TaskGroup::Benchmark,
        model_dirs: &["llama-70b", "llama_70b"],
        mode_suffix: "online",
        cron_log: "llama_online",
    },
    TaskSpec {
        name: "Qwen Online",
        group: TaskGroup::Benchmark,
        model_dirs: &["qwen-235b", "qwen_235b"],
        mode_suffix: "online",
        cron_log: "qwen_online",
    },
    // Integration-test variants
    TaskSpec {
        name: "DP Attention",
        group: TaskGroup::Integration,
        model_dirs: &["deepseek-v3", "deepseek_v3"],
        mode_suffix: "online_dp_attention",
        cron_log: "dp_attention",
    },
    TaskSpec {
        name: "Torch Compile",
        group: TaskGroup::Integration,
        model_dirs: &["llama-70b", "llama_70b"],
        mode_suffix: "online_torch_compile",
        cron_log: "torch_compile",
    },
    TaskSpec {
        name: "Two Batch Overlap",
        group: TaskGroup::Integration,
        model_dirs: &["deepseek-v3", "deepseek_v3"],
        mode_suffix: "online_tbo",
        cron_log: "two_batch_overlap",
    },
    TaskSpec {
        name: "MTP",
        group: TaskGroup::Integration,
        model_dirs: &["deepseek-v3", "deepseek_v3"],
        mode_suffix: "online_mtp",
        cron_log: "mtp",
    },
    // Validation checks (cron logs only)
    TaskSpec {
        name: "Unit Tests",
        group: TaskGroup::Validation,
        model_dirs: &[],
        mode_suffix: "",
        cron_log: "unit_test",
    },
    TaskSpec {
        name: "PD Disaggregation",
        group: TaskGroup::Validation,
        model_dirs: &[],
        mode_suffix: "",
        cron_log: "pd_disagg",
    },
    TaskSpec {
        name: DOCKER_IMAGE_CHECK_TASK,
        group: TaskGroup::Validation,
        model_dirs: &[],
        mode_suffix: "",
        cron_log: "docker_image_check",
    },
    TaskSpec {
        name: SANITY_CHECK_TASK,
        group: TaskGroup::Validation,
        model_dirs: &[],
        mode_suffix: "",
        cron_log: "sanity_check",
    },
];
