//! Command-line parsing for the deals dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the loading/aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "deals", version, about = "Deals and spending dashboard over shared sheets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the KPI counters and weekly charts.
    Report(ReportArgs),
    /// Write the snapshot to JSON and/or the weekly series to CSV.
    Export(ExportArgs),
    /// Launch the interactive TUI.
    ///
    /// Filters given here become the initial widget selection.
    Tui(TuiArgs),
}

/// Filters and source options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct FilterArgs {
    /// Status to include (repeatable). Default: every observed status.
    #[arg(short = 's', long = "status", value_name = "STATUS")]
    pub statuses: Vec<String>,

    /// Contributor name to include (repeatable). Default: every observed name.
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub names: Vec<String>,

    /// Year of the spending window.
    #[arg(long, default_value_t = 2023)]
    pub min_year: i32,

    /// First calendar week of the spending window.
    #[arg(long, default_value_t = 5)]
    pub min_week: u32,

    /// HTTP timeout per sheet fetch (seconds).
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Refetch sheets after this many seconds. Default: keep them until `r`.
    #[arg(long)]
    pub cache_ttl: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Longest bar (columns).
    #[arg(long, default_value_t = 50)]
    pub width: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Snapshot JSON output path.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,

    /// Weekly series CSV output path (`series,week,value`).
    #[arg(long = "weekly-csv", value_name = "CSV")]
    pub weekly_csv: Option<PathBuf>,
}
