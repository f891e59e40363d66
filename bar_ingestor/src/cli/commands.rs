use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::{cli::params::parse_date, models::Resolution};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a TOML config file with a [pipeline] table
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// The artifact a command works on.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Ticker symbol (e.g. "SPY")
    #[arg(long)]
    pub symbol: String,

    /// First calendar day, YYYY-MM-DD
    #[arg(long, value_parser = parse_date)]
    pub start: NaiveDate,

    /// Last calendar day (inclusive), YYYY-MM-DD
    #[arg(long, value_parser = parse_date)]
    pub end: NaiveDate,

    /// Bar resolution: minute or day
    #[arg(long, default_value = "minute")]
    pub resolution: Resolution,

    /// Directory holding the CSV artifacts
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

/// Flags that override the config file for a single run.
#[derive(Args, Debug, Clone, Default)]
pub struct FetchOverrides {
    /// Chunk width in days (each chunk spans end - start <= N)
    #[arg(long)]
    pub chunk_size: Option<u32>,

    /// Fetch chunks concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Concurrent requests in parallel mode
    #[arg(long, requires = "parallel")]
    pub max_workers: Option<usize>,

    /// Pause between chunk requests in sequential mode
    #[arg(long, conflicts_with = "parallel")]
    pub delay_ms: Option<u64>,

    /// Keep pre- and post-market minute bars
    #[arg(long)]
    pub no_session_filter: bool,

    /// Retry with daily bars when the minute run returns nothing
    #[arg(long)]
    pub fallback_daily: bool,

    /// Stop the backwards walk before reaching the start day
    #[arg(long)]
    pub exclusive_boundary: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download bars for one symbol and date range, or reuse the cached file
    Fetch {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        overrides: FetchOverrides,
    },

    /// Summarise a cached artifact without contacting the provider
    Show {
        #[command(flatten)]
        target: TargetArgs,
    },
}
