//! The aggregation engine: classification, sanity parsing, per-day
//! aggregation, and trend assembly.

pub mod aggregator;
pub mod classifier;
pub mod sanity;
pub mod trend;

pub use aggregator::{SanityCheckOutcome, TaskResultAggregator};
pub use classifier::{LogKind, LogStatusClassifier};
pub use sanity::SanityAggregator;
pub use trend::TrendEngine;
