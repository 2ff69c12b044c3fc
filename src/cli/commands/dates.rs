//! `nightwatch dates` - available dates, newest first.

use anyhow::Result;

use crate::cli::types::DatesArgs;
use crate::cli::{resolve_hardware, EngineContext};
use crate::domain::models::Config;

pub async fn execute(config: &Config, args: DatesArgs, json: bool) -> Result<()> {
    let hardware = resolve_hardware(config, args.hardware)?;
    let ctx = EngineContext::build(config).await?;

    let dates = ctx
        .trend
        .get_available_dates(hardware, args.max_days)
        .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&dates)?);
    } else if dates.is_empty() {
        println!("No dates available for {hardware}");
    } else {
        for date in dates {
            println!("{date}");
        }
    }

    Ok(())
}
