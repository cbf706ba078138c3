//! Plotters-powered weekly bar chart widget for Ratatui.
//!
//! Bars are horizontal: x is the measure, y is the week label. We render
//! Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
// `ratatui::style::Color` below shadows the prelude's plotters `Color`;
// the trait still has to be in scope for `.filled()`.
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Bar colour of both weekly charts.
const BAR_COLOR: RGBColor = RGBColor(0, 131, 184);

/// A lightweight, render-only chart description.
///
/// All bars are computed outside the render call, so `render()` only draws.
pub struct WeeklyBarChart<'a> {
    /// `(week label, value)`, drawn bottom to top.
    pub bars: &'a [(&'a str, f64)],
    pub x_label: &'a str,
    pub fmt_x: fn(f64) -> String,
}

impl<'a> Widget for WeeklyBarChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        if self.bars.is_empty() {
            buf.set_string(
                area.x,
                area.y,
                "No data for this selection.",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let n = self.bars.len();
        let x_max = x_upper_bound(self.bars);

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(0.0..x_max, (0..n).into_segmented())?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .x_labels(4)
                .y_labels(n)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| match v {
                    SegmentValue::CenterOf(i) => self
                        .bars
                        .get(*i)
                        .map(|(label, _)| label.to_string())
                        .unwrap_or_default(),
                    _ => String::new(),
                })
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            chart.draw_series(self.bars.iter().enumerate().map(|(i, &(_, v))| {
                Rectangle::new(
                    [
                        (0.0, SegmentValue::Exact(i)),
                        (v.max(0.0), SegmentValue::Exact(i + 1)),
                    ],
                    BAR_COLOR.filled(),
                )
            }))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Upper x bound with a little headroom; never degenerate.
fn x_upper_bound(bars: &[(&str, f64)]) -> f64 {
    let max = bars
        .iter()
        .map(|&(_, v)| v)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    if max > 0.0 { max * 1.05 } else { 1.0 }
}
