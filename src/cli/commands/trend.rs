//! `nightwatch trend` - historical time series.

use anyhow::Result;
use comfy_table::{presets, Cell, ContentArrangement, Table};

use crate::cli::types::TrendArgs;
use crate::cli::{resolve_hardware, EngineContext};
use crate::domain::models::Config;

pub async fn execute(config: &Config, args: TrendArgs, json: bool) -> Result<()> {
    let hardware = resolve_hardware(config, args.hardware)?;
    let ctx = EngineContext::build(config).await?;

    let series = ctx.trend.trend(hardware, args.days).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Date", "Overall", "Passed", "Failed", "Total", "Pass rate"]);
    for i in 0..series.dates.len() {
        table.add_row(vec![
            Cell::new(series.dates[i]),
            Cell::new(series.overall_status[i]),
            Cell::new(series.passed[i]),
            Cell::new(series.failed[i]),
            Cell::new(series.total[i]),
            Cell::new(format!("{:.1}%", series.pass_rate[i])),
        ]);
    }
    println!("Trends for {hardware} over the last {} day(s)", args.days);
    println!("{table}");

    Ok(())
}
