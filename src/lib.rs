//! Nightwatch - nightly CI result aggregator.
//!
//! Aggregates nightly CI results (benchmarks, integration tests, validation
//! checks, per-model accuracy sanity checks) for a GPU fleet into one
//! classified, queryable record per day, drawing on three layered sources:
//! local filesystem logs, a cached relational store, and a remote
//! Git-hosted log mirror.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): pure data types and port traits
//! - **Service Layer** (`services`): classification and aggregation logic
//! - **Infrastructure Layer** (`infrastructure`): log sources, the SQLite
//!   cache, and configuration loading
//! - **CLI Layer** (`cli`): command-line interface

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    ClassificationResult, CollectionMode, Config, Hardware, OverallStatus, SanityModelResult,
    SummaryStats, TaskResult, TaskStatus, TestRun, TimeSeries,
};
pub use domain::ports::{LogSelector, RunRepository, SourceReader, StoreError, StoredRun};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::readers::{FallbackResolver, LocalReader, RemoteReader};
pub use services::{LogKind, LogStatusClassifier, SanityAggregator, TaskResultAggregator, TrendEngine};
