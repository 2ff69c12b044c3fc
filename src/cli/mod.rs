//! Command-line interface.

pub mod commands;
pub mod context;
pub mod types;

pub use context::{resolve_hardware, EngineContext};
pub use types::{Cli, Commands};

/// Print an error and exit non-zero, honoring the global --json flag.
pub fn handle_error(err: anyhow::Error, json: bool) {
    if json {
        let output = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{output}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
