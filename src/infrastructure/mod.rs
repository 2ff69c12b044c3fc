//! Infrastructure layer: log sources, result cache, configuration.

pub mod config;
pub mod database;
pub mod readers;
