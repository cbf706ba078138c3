//! Presentation helpers shared by the text report and the TUI.

pub mod format;

pub use format::*;

use crate::domain::AggregateSnapshot;

/// One labeled counter of the KPI panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kpi {
    pub label: &'static str,
    pub value: String,
}

/// The six KPI counters, in panel order (three columns of two).
pub fn kpis(snapshot: &AggregateSnapshot) -> [Kpi; 6] {
    let c = &snapshot.counts;
    let rate = snapshot
        .success_rate
        .map(|r| format!("{r} %"))
        .unwrap_or_else(|| "n/a".to_string());

    [
        Kpi {
            label: "New Deals",
            value: c.total.to_string(),
        },
        Kpi {
            label: "Success rate",
            value: rate,
        },
        Kpi {
            label: "Ordered",
            value: c.ordered.to_string(),
        },
        Kpi {
            label: "Added to cart",
            value: c.cart.to_string(),
        },
        Kpi {
            label: "On Hold",
            value: c.hold.to_string(),
        },
        Kpi {
            label: "Rejections",
            value: c.rejected.to_string(),
        },
    ]
}

/// Deal-count bars as `(week, count)`.
pub fn deal_bars(snapshot: &AggregateSnapshot) -> Vec<(&str, f64)> {
    snapshot
        .weekly_deals
        .iter()
        .map(|p| (p.week.as_str(), p.value as f64))
        .collect()
}

/// Spend bars as `(week, amount)`.
pub fn spend_bars(snapshot: &AggregateSnapshot) -> Vec<(&str, f64)> {
    snapshot
        .weekly_spend
        .iter()
        .map(|p| (p.week.as_str(), p.value))
        .collect()
}
