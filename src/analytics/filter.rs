//! Row filters and the option sets that drive the filter widgets.

use std::collections::HashSet;

use crate::domain::{DealRecord, FilterSelection, PurchaseRecord, PurchaseWindow};

/// Keep deals whose status AND contributor are both selected.
pub fn filter_deals(records: &[DealRecord], selection: &FilterSelection) -> Vec<DealRecord> {
    records
        .iter()
        .filter(|r| {
            selection.statuses.contains(&r.status)
                && selection.contributors.contains(&r.contributor)
        })
        .cloned()
        .collect()
}

/// Keep purchases in `window.year` from week `window.min_week` on.
///
/// Later years are excluded as well; this is a single-year window, not a
/// date range.
pub fn filter_purchases_by_window(
    records: &[PurchaseRecord],
    window: PurchaseWindow,
) -> Vec<PurchaseRecord> {
    records
        .iter()
        .filter(|r| r.year == window.year && r.week >= window.min_week)
        .cloned()
        .collect()
}

/// Distinct statuses in first-seen order.
pub fn observed_statuses(records: &[DealRecord]) -> Vec<String> {
    distinct(records.iter().map(|r| r.status.as_str()))
}

/// Distinct contributors in first-seen order.
pub fn observed_contributors(records: &[DealRecord]) -> Vec<String> {
    distinct(records.iter().map(|r| r.contributor.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}
