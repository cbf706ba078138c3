//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the filter/aggregate pipeline
//! - exported to JSON/CSV
//! - rendered by the TUI and the text report

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const STATUS_ORDERED: &str = "Ordered";
pub const STATUS_REJECTED: &str = "Rejected";
pub const STATUS_ADDED_TO_CART: &str = "Added to cart";

/// Calendar week key of the form `CW05`.
///
/// Ordering is lexicographic on the label, which matches numeric order only
/// within a single year.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekLabel(String);

impl WeekLabel {
    pub fn from_week(week: u32) -> Self {
        Self(format!("CW{week:02}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WeekLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the merged deals table.
#[derive(Debug, Clone, PartialEq)]
pub struct DealRecord {
    /// Opaque product identifier; only counted, never looked up.
    pub asin: String,
    pub status: String,
    pub date: NaiveDate,
    /// Assigned by the loader from the sheet the row came from.
    pub contributor: String,
    pub week_label: WeekLabel,
}

/// One row of the purchase log.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRecord {
    pub order_date: NaiveDate,
    /// Cost cell as written in the sheet, trimmed; blank when absent.
    ///
    /// Normalized only once the row falls inside the purchase window, so junk
    /// in historical rows never fails a load.
    pub total_cost: String,
    /// 1-based sheet line, for error messages.
    pub line: usize,
    /// Calendar year of `order_date`.
    pub year: i32,
    /// ISO week of `order_date`.
    pub week: u32,
    pub week_label: WeekLabel,
}

/// Which deals the caller wants to see.
///
/// An empty set on either side selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub statuses: BTreeSet<String>,
    pub contributors: BTreeSet<String>,
}

impl FilterSelection {
    pub fn new<S, C>(statuses: S, contributors: C) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            statuses: statuses.into_iter().map(Into::into).collect(),
            contributors: contributors.into_iter().map(Into::into).collect(),
        }
    }

    /// Everything observed in `deals` (the widget default).
    pub fn all(deals: &[DealRecord]) -> Self {
        Self {
            statuses: deals.iter().map(|d| d.status.clone()).collect(),
            contributors: deals.iter().map(|d| d.contributor.clone()).collect(),
        }
    }
}

/// Single-year purchase window: `year == self.year && week >= self.min_week`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseWindow {
    pub year: i32,
    pub min_week: u32,
}

impl Default for PurchaseWindow {
    fn default() -> Self {
        Self {
            year: 2023,
            min_week: 5,
        }
    }
}

/// Status buckets for the filtered deals. `hold` is the residual bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: usize,
    pub ordered: usize,
    pub rejected: usize,
    pub cart: usize,
    pub hold: usize,
}

/// One bar of a weekly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPoint<T> {
    pub week: WeekLabel,
    pub value: T,
}

/// Everything the presentation layer needs for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    pub counts: StatusCounts,
    /// `None` when the selection is empty.
    pub success_rate: Option<u32>,
    pub weekly_deals: Vec<WeeklyPoint<usize>>,
    pub weekly_spend: Vec<WeeklyPoint<f64>>,
}

/// Run settings as understood by the pipeline, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// `None` means every observed status.
    pub statuses: Option<Vec<String>>,
    /// `None` means every observed contributor.
    pub contributors: Option<Vec<String>>,
    pub window: PurchaseWindow,
    pub fetch_timeout: std::time::Duration,
    pub cache_ttl: Option<std::time::Duration>,
}

impl DashboardConfig {
    /// Resolve the configured filters against the loaded deals.
    pub fn selection(&self, deals: &[DealRecord]) -> FilterSelection {
        let all = FilterSelection::all(deals);
        FilterSelection {
            statuses: match &self.statuses {
                Some(v) => v.iter().cloned().collect(),
                None => all.statuses,
            },
            contributors: match &self.contributors {
                Some(v) => v.iter().cloned().collect(),
                None => all.contributors,
            },
        }
    }
}
