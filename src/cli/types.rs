//! CLI type definitions.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::models::Hardware;

#[derive(Parser)]
#[command(name = "nightwatch")]
#[command(about = "Nightwatch - nightly CI result aggregator", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Config file path (defaults to nightwatch.yaml in the working dir)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate one day's results and cache them
    Collect(CollectArgs),

    /// Print summary statistics for one day
    Summary(SummaryArgs),

    /// Print historical trends over a date range
    Trend(TrendArgs),

    /// List available dates, newest first
    Dates(DatesArgs),
}

#[derive(clap::Args)]
pub struct CollectArgs {
    /// Run date (YYYY-MM-DD); defaults to today
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Hardware platform; detected from hostname when omitted
    #[arg(long, value_parser = parse_hardware)]
    pub hardware: Option<Hardware>,

    /// Skip the cache write
    #[arg(long)]
    pub no_store: bool,
}

#[derive(clap::Args)]
pub struct SummaryArgs {
    /// Run date (YYYY-MM-DD); defaults to today
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Hardware platform; detected from hostname when omitted
    #[arg(long, value_parser = parse_hardware)]
    pub hardware: Option<Hardware>,
}

#[derive(clap::Args)]
pub struct TrendArgs {
    /// Number of days to include
    #[arg(short = 'n', long, default_value_t = 14)]
    pub days: usize,

    /// Hardware platform; detected from hostname when omitted
    #[arg(long, value_parser = parse_hardware)]
    pub hardware: Option<Hardware>,
}

#[derive(clap::Args)]
pub struct DatesArgs {
    /// Maximum number of dates to list
    #[arg(long, default_value_t = 30)]
    pub max_days: usize,

    /// Hardware platform; detected from hostname when omitted
    #[arg(long, value_parser = parse_hardware)]
    pub hardware: Option<Hardware>,
}

fn parse_hardware(raw: &str) -> Result<Hardware, String> {
    raw.parse()
}
