//! ASCII horizontal bar charts for terminal output.
//!
//! This is intentionally "dumb" (fixed-width bars), optimized for:
//! - quick visual checks in a terminal or a pasted log
//! - deterministic output (helpful for golden tests)
//!
//! One row per week label: `CW05 |######## 12`.

const BAR: &str = "#";

/// Render `(label, value)` bars; the longest bar is `width` cells.
pub fn render_bar_chart(
    title: &str,
    bars: &[(&str, f64)],
    width: usize,
    fmt_value: fn(f64) -> String,
) -> String {
    let width = width.max(10);
    let mut out = String::new();
    out.push_str(title);
    out.push('\n');

    if bars.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    let max = bars.iter().map(|&(_, v)| v).fold(0.0_f64, f64::max);
    let label_width = bars.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    for &(label, v) in bars {
        let bar = BAR.repeat(bar_len(v, max, width));
        let line = format!("{label:<label_width$} |{bar} {}", fmt_value(v));
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn bar_len(v: f64, max: f64, width: usize) -> usize {
    if !(v.is_finite() && max.is_finite()) || max <= 0.0 || v <= 0.0 {
        return 0;
    }
    let u = (v / max).clamp(0.0, 1.0);
    // Any positive value gets at least one cell so it stays visible.
    ((u * width as f64).round() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt_count(v: f64) -> String {
        format!("{v:.0}")
    }

    fn fmt_money(v: f64) -> String {
        format!("{v:.2}")
    }

    #[test]
    fn bars_golden_snapshot() {
        let bars = [("CW05", 4.0), ("CW06", 1.0), ("CW07", 2.0)];
        let txt = render_bar_chart("Deals per Week", &bars, 10, fmt_count);
        let expected = concat!(
            "Deals per Week\n",
            "CW05 |########## 4\n",
            "CW06 |### 1\n",
            "CW07 |##### 2\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn zero_and_empty_series() {
        assert_eq!(
            render_bar_chart("Spending per Week", &[("CW09", 0.0)], 10, fmt_money),
            "Spending per Week\nCW09 | 0.00\n"
        );

        assert_eq!(
            render_bar_chart("Spending per Week", &[], 10, fmt_money),
            "Spending per Week\n(no data)\n"
        );
    }
}
