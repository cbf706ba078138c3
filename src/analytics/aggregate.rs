//! KPI counters and weekly series.

use std::collections::BTreeMap;

use crate::analytics::filter::{filter_deals, filter_purchases_by_window};
use crate::domain::{
    AggregateSnapshot, DealRecord, FilterSelection, PurchaseRecord, PurchaseWindow,
    STATUS_ADDED_TO_CART, STATUS_ORDERED, STATUS_REJECTED, StatusCounts, WeekLabel, WeeklyPoint,
};
use crate::error::AppError;
use crate::io::normalize::normalize_decimal;

/// Bucket deals by status. Anything not matched exactly lands in `hold`.
pub fn count_by_status(records: &[DealRecord]) -> StatusCounts {
    let count = |status: &str| records.iter().filter(|r| r.status == status).count();

    let total = records.len();
    let ordered = count(STATUS_ORDERED);
    let rejected = count(STATUS_REJECTED);
    let cart = count(STATUS_ADDED_TO_CART);

    StatusCounts {
        total,
        ordered,
        rejected,
        cart,
        hold: total - ordered - rejected - cart,
    }
}

/// Share of ordered + in-cart deals, in whole percent.
///
/// Halves round to even, so 12.5 becomes 12.
pub fn success_rate(counts: &StatusCounts) -> Result<u32, AppError> {
    if counts.total == 0 {
        return Err(AppError::EmptySelection);
    }
    let pct = (counts.ordered + counts.cart) as f64 / counts.total as f64 * 100.0;
    Ok(pct.round_ties_even() as u32)
}

/// Number of deals per week label, ascending by label.
pub fn weekly_deal_counts(records: &[DealRecord]) -> Vec<WeeklyPoint<usize>> {
    let mut by_week: BTreeMap<&WeekLabel, usize> = BTreeMap::new();
    for r in records {
        *by_week.entry(&r.week_label).or_default() += 1;
    }
    into_points(by_week)
}

/// Normalized cost of one purchase; `None` for a blank cell.
pub fn purchase_cost(record: &PurchaseRecord) -> Result<Option<f64>, AppError> {
    if record.total_cost.is_empty() {
        return Ok(None);
    }
    normalize_decimal(&record.total_cost)
        .map(Some)
        .map_err(|e| AppError::parse(format!("purchases line {} total cost", record.line), e))
}

/// Sum of purchase cost per week label, ascending by label.
///
/// Purchases without an amount still create their week's bar. A malformed
/// amount fails the whole series.
pub fn weekly_spend(records: &[PurchaseRecord]) -> Result<Vec<WeeklyPoint<f64>>, AppError> {
    let mut by_week: BTreeMap<&WeekLabel, f64> = BTreeMap::new();
    for r in records {
        *by_week.entry(&r.week_label).or_default() += purchase_cost(r)?.unwrap_or(0.0);
    }
    Ok(into_points(by_week))
}

fn into_points<T>(by_week: BTreeMap<&WeekLabel, T>) -> Vec<WeeklyPoint<T>> {
    by_week
        .into_iter()
        .map(|(week, value)| WeeklyPoint {
            week: week.clone(),
            value,
        })
        .collect()
}

/// Filter and aggregate for one selection.
///
/// Purchase costs are normalized after the window is applied; only an
/// in-window malformed amount is an error.
pub fn build_snapshot(
    deals: &[DealRecord],
    purchases: &[PurchaseRecord],
    selection: &FilterSelection,
    window: PurchaseWindow,
) -> Result<AggregateSnapshot, AppError> {
    let deals = filter_deals(deals, selection);
    let purchases = filter_purchases_by_window(purchases, window);
    tracing::debug!(
        deals = deals.len(),
        purchases = purchases.len(),
        "filtered source tables"
    );

    let counts = count_by_status(&deals);
    let success_rate = match success_rate(&counts) {
        Ok(rate) => Some(rate),
        Err(e) => {
            tracing::debug!("{e}");
            None
        }
    };

    Ok(AggregateSnapshot {
        counts,
        success_rate,
        weekly_deals: weekly_deal_counts(&deals),
        weekly_spend: weekly_spend(&purchases)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::io::normalize::{derive_week_label, week_number};

    fn deal(status: &str, contributor: &str, date: NaiveDate) -> DealRecord {
        DealRecord {
            asin: "B0".to_string(),
            status: status.to_string(),
            date,
            contributor: contributor.to_string(),
            week_label: derive_week_label(date),
        }
    }

    fn purchase(date: NaiveDate, cost: &str) -> PurchaseRecord {
        PurchaseRecord {
            order_date: date,
            total_cost: cost.to_string(),
            line: 2,
            year: chrono::Datelike::year(&date),
            week: week_number(date),
            week_label: derive_week_label(date),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scenario() -> Vec<DealRecord> {
        vec![
            deal("Ordered", "A", ymd(2023, 2, 1)),
            deal("Rejected", "A", ymd(2023, 2, 8)),
            deal("Added to cart", "B", ymd(2023, 2, 2)),
            deal("Pending", "B", ymd(2023, 3, 15)),
        ]
    }

    fn all(deals: &[DealRecord], purchases: &[PurchaseRecord]) -> AggregateSnapshot {
        build_snapshot(
            deals,
            purchases,
            &FilterSelection::all(deals),
            PurchaseWindow::default(),
        )
        .unwrap()
    }

    fn counts(total: usize, ordered: usize, rejected: usize, cart: usize) -> StatusCounts {
        StatusCounts {
            total,
            ordered,
            rejected,
            cart,
            hold: total - ordered - rejected - cart,
        }
    }

    #[test]
    fn end_to_end_counts_and_rate() {
        let snapshot = all(&scenario(), &[]);

        assert_eq!(snapshot.counts, counts(4, 1, 1, 1));
        assert_eq!(snapshot.counts.hold, 1);
        assert_eq!(snapshot.success_rate, Some(50));
    }

    #[test]
    fn buckets_partition_every_subset() {
        let mut deals = scenario();
        deals.push(deal("", "A", ymd(2023, 2, 3)));
        deals.push(deal("ordered", "B", ymd(2023, 2, 3)));

        // Every prefix is a valid "filtered set".
        for n in 0..=deals.len() {
            let c = count_by_status(&deals[..n]);
            assert_eq!(c.total, c.ordered + c.rejected + c.cart + c.hold);
        }

        // Case matters: "ordered" is not "Ordered".
        let c = count_by_status(&deals);
        assert_eq!(c.ordered, 1);
        assert_eq!(c.hold, 3);
    }

    #[test]
    fn rate_is_bounded_and_rounds_half_to_even() {
        assert_eq!(success_rate(&counts(8, 1, 7, 0)).unwrap(), 12);
        assert_eq!(success_rate(&counts(3, 2, 1, 0)).unwrap(), 67);
        assert_eq!(success_rate(&counts(2, 1, 0, 1)).unwrap(), 100);
    }

    #[test]
    fn empty_selection_has_no_rate() {
        let err = success_rate(&StatusCounts::default()).unwrap_err();
        assert!(matches!(err, AppError::EmptySelection));

        let deals = scenario();
        let snapshot = build_snapshot(
            &deals,
            &[],
            &FilterSelection::default(),
            PurchaseWindow::default(),
        )
        .unwrap();
        assert_eq!(snapshot.counts.total, 0);
        assert_eq!(snapshot.success_rate, None);
        assert!(snapshot.weekly_deals.is_empty());
    }

    #[test]
    fn weekly_counts_are_sorted_and_order_independent() {
        let deals = scenario();
        let forward = weekly_deal_counts(&deals);

        let mut reversed = deals.clone();
        reversed.reverse();
        assert_eq!(weekly_deal_counts(&reversed), forward);

        let labels: Vec<(&str, usize)> = forward
            .iter()
            .map(|p| (p.week.as_str(), p.value))
            .collect();
        assert_eq!(labels, vec![("CW05", 2), ("CW06", 1), ("CW11", 1)]);
    }

    #[test]
    fn weekly_spend_sums_within_a_week() {
        let purchases = vec![
            purchase(ymd(2023, 2, 8), "4"),
            purchase(ymd(2023, 2, 1), "10,5"),
            purchase(ymd(2023, 2, 2), "1.25"),
            purchase(ymd(2023, 2, 9), ""),
        ];
        let spend = weekly_spend(&purchases).unwrap();
        assert_eq!(spend.len(), 2);
        assert_eq!(spend[0].week.as_str(), "CW05");
        assert!((spend[0].value - 11.75).abs() < 1e-9);
        assert_eq!(spend[1].week.as_str(), "CW06");
        assert!((spend[1].value - 4.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_applies_purchase_window() {
        let purchases = vec![
            purchase(ymd(2022, 2, 1), "100"),
            purchase(ymd(2023, 1, 18), "50"),
            purchase(ymd(2023, 2, 1), "7"),
        ];
        let snapshot = all(&[], &purchases);
        assert_eq!(snapshot.weekly_spend.len(), 1);
        assert_eq!(snapshot.weekly_spend[0].week.as_str(), "CW05");
        assert!((snapshot.weekly_spend[0].value - 7.0).abs() < 1e-9);
    }

    #[test]
    fn costs_are_normalized_only_inside_the_window() {
        // A junk amount in a 2022 row is outside the default window.
        let purchases = vec![
            purchase(ymd(2022, 3, 1), "n/a"),
            purchase(ymd(2023, 2, 1), "1,50"),
        ];
        let snapshot = all(&[], &purchases);
        assert_eq!(snapshot.weekly_spend.len(), 1);
        assert!((snapshot.weekly_spend[0].value - 1.5).abs() < 1e-9);

        // Inside the window it fails closed.
        let mut bad = purchase(ymd(2023, 2, 8), "twelve");
        bad.line = 7;
        let err = build_snapshot(
            &[],
            &[bad],
            &FilterSelection::default(),
            PurchaseWindow::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Parse { .. }));
        assert!(err.to_string().contains("purchases line 7"));
    }
}
