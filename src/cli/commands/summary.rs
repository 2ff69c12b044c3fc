//! `nightwatch summary` - one day's summary statistics.

use anyhow::Result;
use chrono::Utc;

use crate::cli::types::SummaryArgs;
use crate::cli::{resolve_hardware, EngineContext};
use crate::domain::models::Config;

pub async fn execute(config: &Config, args: SummaryArgs, json: bool) -> Result<()> {
    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());
    let hardware = resolve_hardware(config, args.hardware)?;
    let ctx = EngineContext::build(config).await?;

    let task_results = ctx.aggregator.collect(date, hardware).await;
    let sanity = ctx
        .aggregator
        .parse_sanity_check_log(date, hardware)
        .await
        .map(|o| o.model_results)
        .unwrap_or_default();
    let stats = ctx.aggregator.summarize(&task_results, &sanity);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Summary for {date} on {hardware}");
        println!("  Overall:  {}", stats.overall_status);
        println!("  Total:    {}", stats.total_tasks);
        println!("  Passed:   {}", stats.passed);
        println!("  Failed:   {}", stats.failed);
        println!("  Unknown:  {}", stats.unknown);
        println!("  Not run:  {}", stats.not_run);
    }

    Ok(())
}
