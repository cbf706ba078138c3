//! Shared dashboard pipeline used by the report, export and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! resolve sources -> fetch + ingest (memoized) -> filter -> aggregate
//!
//! The front-ends can then focus on presentation (printing vs widgets).

use std::sync::Arc;

use crate::analytics::{build_snapshot, observed_contributors, observed_statuses};
use crate::data::{
    HttpSheetSource, LoadCache, SheetSource, SourceTables, SourcesConfig, load_deals,
    load_purchases,
};
use crate::domain::{AggregateSnapshot, DashboardConfig, FilterSelection, PurchaseWindow};
use crate::error::AppError;

/// All computed outputs for one filter selection.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub selection: FilterSelection,
    pub snapshot: AggregateSnapshot,
    /// Widget options: every status seen in the deals, first-seen order.
    pub status_options: Vec<String>,
    /// Widget options: every contributor seen in the deals, first-seen order.
    pub contributor_options: Vec<String>,
}

/// Fetch and normalize every table once, uncached.
pub fn fetch_tables<S: SheetSource + ?Sized>(
    source: &S,
    config: &SourcesConfig,
) -> Result<SourceTables, AppError> {
    let deals = load_deals(source, config)?;
    let purchases = load_purchases(source, config)?;
    Ok(SourceTables::new(deals, purchases))
}

/// Return the memoized tables, resolving configuration only when a load is needed.
pub fn load_cached<S, F>(
    source: &S,
    cache: &LoadCache,
    resolve: F,
) -> Result<Arc<SourceTables>, AppError>
where
    S: SheetSource + ?Sized,
    F: FnOnce() -> Result<SourcesConfig, AppError>,
{
    cache.get_or_load(|| {
        let config = resolve()?;
        fetch_tables(source, &config)
    })
}

/// Filter + aggregate for an explicit selection.
pub fn run_with_selection(
    tables: &SourceTables,
    selection: FilterSelection,
    window: PurchaseWindow,
) -> Result<RunOutput, AppError> {
    let snapshot = build_snapshot(&tables.deals, &tables.purchases, &selection, window)?;
    Ok(RunOutput {
        selection,
        snapshot,
        status_options: observed_statuses(&tables.deals),
        contributor_options: observed_contributors(&tables.deals),
    })
}

/// Filter + aggregate using the CLI filters (unset filters select everything).
pub fn run_report(
    tables: &SourceTables,
    config: &DashboardConfig,
) -> Result<RunOutput, AppError> {
    let selection = config.selection(&tables.deals);
    run_with_selection(tables, selection, config.window)
}

/// Execute the full pipeline against the live sheets.
pub fn run(config: &DashboardConfig) -> Result<RunOutput, AppError> {
    let source = HttpSheetSource::new(config.fetch_timeout)?;
    let cache = LoadCache::new(config.cache_ttl);
    let tables = load_cached(&source, &cache, SourcesConfig::from_env)?;
    run_report(&tables, config)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::data::sheets::tests::{config, sheets};

    fn dashboard_config() -> DashboardConfig {
        DashboardConfig {
            statuses: None,
            contributors: None,
            window: PurchaseWindow::default(),
            fetch_timeout: Duration::from_secs(1),
            cache_ttl: None,
        }
    }

    #[test]
    fn report_over_fake_sheets() {
        let source = sheets();
        let cache = LoadCache::default();
        let tables = load_cached(&source, &cache, || Ok(config())).unwrap();
        let run = run_report(&tables, &dashboard_config()).unwrap();

        assert_eq!(run.snapshot.counts.total, 4);
        assert_eq!(run.snapshot.counts.hold, 1);
        assert_eq!(run.snapshot.success_rate, Some(50));
        assert_eq!(run.contributor_options, vec!["Deccy", "Liezel"]);
        assert_eq!(
            run.status_options,
            vec!["Ordered", "Rejected", "Added to cart", "Pending"]
        );

        let spend: Vec<(&str, f64)> = run
            .snapshot
            .weekly_spend
            .iter()
            .map(|p| (p.week.as_str(), p.value))
            .collect();
        assert_eq!(spend, vec![("CW05", 10.5), ("CW06", 4.0)]);
    }

    #[test]
    fn cached_tables_are_fetched_once() {
        let source = sheets();
        let cache = LoadCache::default();

        load_cached(&source, &cache, || Ok(config())).unwrap();
        let fetched = source.fetches.get();
        assert_eq!(fetched, 3);

        load_cached(&source, &cache, || Ok(config())).unwrap();
        assert_eq!(source.fetches.get(), fetched);

        cache.invalidate();
        load_cached(&source, &cache, || Ok(config())).unwrap();
        assert_eq!(source.fetches.get(), fetched * 2);
    }

    #[test]
    fn configuration_error_is_not_cached() {
        let source = sheets();
        let cache = LoadCache::default();

        let err = load_cached(&source, &cache, || {
            Err(AppError::Configuration("missing SHEET_ID_VA_DECCY".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert_eq!(source.fetches.get(), 0);

        assert!(load_cached(&source, &cache, || Ok(config())).is_ok());
    }

    #[test]
    fn cli_filters_narrow_the_selection() {
        let source = sheets();
        let tables = fetch_tables(&source, &config()).unwrap();
        let mut cfg = dashboard_config();
        cfg.contributors = Some(vec!["Liezel".to_string()]);

        let run = run_report(&tables, &cfg).unwrap();
        assert_eq!(run.snapshot.counts.total, 2);
        assert_eq!(run.snapshot.counts.cart, 1);
        assert_eq!(run.snapshot.success_rate, Some(50));
        // Options still list everything so the widgets can re-enable it.
        assert_eq!(run.contributor_options.len(), 2);
    }
}
