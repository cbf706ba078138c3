//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - parses CLI arguments
//! - runs the load/filter/aggregate pipeline
//! - prints reports or writes exports, or hands over to the TUI

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ExportArgs, FilterArgs, ReportArgs, TuiArgs};
use crate::domain::{DashboardConfig, PurchaseWindow};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `deals` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();

    // We want `deals` and `deals -s Ordered` to behave like `deals tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Export(args) => handle_export(args),
        Command::Tui(args) => crate::tui::run(tui_config_from_args(&args)),
    }
}

fn init_logging() {
    // Logs go to stderr so `report` output stays pipeable; default to warnings.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = dashboard_config_from_args(&args.filters);
    let run = pipeline::run(&config)?;
    println!(
        "{}",
        crate::report::format_report(&run, config.window, args.width)
    );
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    if args.json.is_none() && args.weekly_csv.is_none() {
        return Err(AppError::Export(
            "nothing to export; pass --json and/or --weekly-csv".to_string(),
        ));
    }

    let config = dashboard_config_from_args(&args.filters);
    let run = pipeline::run(&config)?;

    if let Some(path) = &args.json {
        crate::io::export::write_snapshot_json(path, &run.snapshot)?;
    }
    if let Some(path) = &args.weekly_csv {
        crate::io::export::write_weekly_csv(path, &run.snapshot)?;
    }
    Ok(())
}

/// One-shot commands load once, so they never carry a cache TTL.
pub fn dashboard_config_from_args(args: &FilterArgs) -> DashboardConfig {
    let non_empty = |v: &Vec<String>| (!v.is_empty()).then(|| v.clone());
    DashboardConfig {
        statuses: non_empty(&args.statuses),
        contributors: non_empty(&args.names),
        window: PurchaseWindow {
            year: args.min_year,
            min_week: args.min_week,
        },
        fetch_timeout: Duration::from_secs(args.timeout),
        cache_ttl: None,
    }
}

pub fn tui_config_from_args(args: &TuiArgs) -> DashboardConfig {
    DashboardConfig {
        cache_ttl: args.cache_ttl.map(Duration::from_secs),
        ..dashboard_config_from_args(&args.filters)
    }
}

/// Rewrite argv so `deals` defaults to `deals tui`.
///
/// Rules:
/// - `deals`                        -> `deals tui`
/// - `deals -s Ordered ...`         -> `deals tui -s Ordered ...`
/// - `deals --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "export" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_binary_launches_tui() {
        assert_eq!(rewrite_args(argv(&["deals"])), argv(&["deals", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["deals", "-s", "Ordered"])),
            argv(&["deals", "tui", "-s", "Ordered"])
        );
        assert_eq!(rewrite_args(argv(&["deals", "--help"])), argv(&["deals", "--help"]));
        assert_eq!(rewrite_args(argv(&["deals", "report"])), argv(&["deals", "report"]));
    }

    #[test]
    fn empty_filter_flags_mean_all() {
        let cli = crate::cli::Cli::parse_from([
            "deals",
            "tui",
            "--min-week",
            "7",
            "--cache-ttl",
            "60",
        ]);
        let Command::Tui(args) = cli.command else {
            panic!("expected tui");
        };
        let config = tui_config_from_args(&args);
        assert!(config.statuses.is_none());
        assert!(config.contributors.is_none());
        assert_eq!(
            config.window,
            PurchaseWindow {
                year: 2023,
                min_week: 7,
            }
        );
        assert_eq!(config.cache_ttl, Some(Duration::from_secs(60)));
        assert_eq!(dashboard_config_from_args(&args.filters).cache_ttl, None);
    }
}
