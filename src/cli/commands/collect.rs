//! `nightwatch collect` - aggregate one day and cache it.

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{presets, Cell, ContentArrangement, Table};

use crate::cli::types::CollectArgs;
use crate::cli::{resolve_hardware, EngineContext};
use crate::domain::models::Config;
use crate::domain::ports::StoredRun;

pub async fn execute(config: &Config, args: CollectArgs, json: bool) -> Result<()> {
    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());
    let hardware = resolve_hardware(config, args.hardware)?;
    let ctx = EngineContext::build(config).await?;

    let stored = ctx.aggregator.collect_run(date, hardware).await;

    if !args.no_store {
        ctx.store
            .upsert_run(&stored)
            .await
            .context("Failed to cache run")?;
    }

    if json {
        let output = serde_json::json!({
            "date": date,
            "hardware": hardware,
            "overall_status": stored.run.overall_status,
            "total_tasks": stored.run.total_tasks,
            "passed": stored.run.passed_tasks,
            "failed": stored.run.failed_tasks,
            "unknown": stored.run.unknown_tasks,
            "not_run": stored.run.not_run_tasks,
            "tasks": stored.task_results,
            "sanity": stored.sanity_results,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Run {date} on {hardware}: {}", stored.run.overall_status);
        println!("{}", task_table(&stored));
        if !stored.sanity_results.is_empty() {
            println!("{}", sanity_table(&stored));
        }
    }

    Ok(())
}

fn task_table(stored: &StoredRun) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Task", "Status", "Runtime", "Accuracy", "Error"]);
    for (name, result) in &stored.task_results {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(result.status),
            Cell::new(result.runtime.as_deref().unwrap_or("-")),
            Cell::new(
                result
                    .accuracy
                    .map_or_else(|| "-".to_string(), |a| format!("{a:.3}")),
            ),
            Cell::new(result.error.as_deref().unwrap_or("")),
        ]);
    }
    table
}

fn sanity_table(stored: &StoredRun) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Model", "Status", "Accuracy"]);
    for model in &stored.sanity_results {
        table.add_row(vec![
            Cell::new(&model.model_name),
            Cell::new(model.status),
            Cell::new(format!("{:.3}", model.accuracy)),
        ]);
    }
    table
}
