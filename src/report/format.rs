//! Formatted terminal output for `deals report`.
//!
//! We keep formatting code in one place so output changes are localized.

use crate::app::pipeline::RunOutput;
use crate::domain::PurchaseWindow;
use crate::plot::render_bar_chart;
use crate::report::{deal_bars, kpis, spend_bars};

/// Full text report: selection, KPI panel and both weekly charts.
pub fn format_report(run: &RunOutput, window: PurchaseWindow, chart_width: usize) -> String {
    let mut out = String::new();

    out.push_str("=== Deals Dashboard ===\n");
    out.push_str(&format!("Status: {}\n", join_or_none(run.selection.statuses.iter())));
    out.push_str(&format!("Name: {}\n", join_or_none(run.selection.contributors.iter())));
    out.push_str(&format!(
        "Spending window: {} from CW{:02}\n\n",
        window.year, window.min_week
    ));

    out.push_str(&format_kpis(run));
    if run.snapshot.success_rate.is_none() {
        out.push_str("No deals match the current filter selection.\n");
    }
    out.push('\n');

    out.push_str(&render_bar_chart(
        "Deals per Week",
        &deal_bars(&run.snapshot),
        chart_width,
        fmt_count,
    ));
    out.push('\n');
    out.push_str(&render_bar_chart(
        "Spending per Week",
        &spend_bars(&run.snapshot),
        chart_width,
        fmt_money,
    ));

    out
}

/// KPI panel as three columns of two rows.
pub fn format_kpis(run: &RunOutput) -> String {
    let k = kpis(&run.snapshot);
    let cell = |i: usize| format!("{}: {}", k[i].label, k[i].value);

    let mut out = String::new();
    for row in 0..2 {
        let line = format!("{:<24}{:<24}{}", cell(row), cell(2 + row), cell(4 + row));
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn fmt_count(v: f64) -> String {
    format!("{v:.0}")
}

pub fn fmt_money(v: f64) -> String {
    format!("{v:.2}")
}

fn join_or_none<'a>(values: impl Iterator<Item = &'a String>) -> String {
    let parts: Vec<&str> = values
        .map(|v| if v.is_empty() { "(blank)" } else { v.as_str() })
        .collect();
    if parts.is_empty() {
        "(none)".to_string()
    } else {
        parts.join(", ")
    }
}
