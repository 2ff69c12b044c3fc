//! Domain layer: pure data types and port traits.

pub mod models;
pub mod ports;
