//! Export a snapshot to JSON or the weekly series to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use crate::domain::AggregateSnapshot;
use crate::error::AppError;

/// Write the full snapshot (counters, rate, both series) as pretty JSON.
pub fn write_snapshot_json(path: &Path, snapshot: &AggregateSnapshot) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::Export(format!("failed to create '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, snapshot)
        .map_err(|e| AppError::Export(format!("failed to write snapshot JSON: {e}")))?;
    tracing::info!(path = %path.display(), "wrote snapshot JSON");
    Ok(())
}

/// Write both weekly series in long format: `series,week,value`.
pub fn write_weekly_csv(path: &Path, snapshot: &AggregateSnapshot) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::Export(format!("failed to create '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);
    write_weekly_rows(&mut writer, snapshot)?;
    writer
        .flush()
        .map_err(|e| AppError::Export(format!("failed to flush weekly CSV: {e}")))?;
    tracing::info!(path = %path.display(), "wrote weekly CSV");
    Ok(())
}

fn write_weekly_rows<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    snapshot: &AggregateSnapshot,
) -> Result<(), AppError> {
    let row_err = |e: csv::Error| AppError::Export(format!("failed to write weekly CSV row: {e}"));

    writer.write_record(["series", "week", "value"]).map_err(row_err)?;
    for p in &snapshot.weekly_deals {
        let value = p.value.to_string();
        writer
            .write_record(["deals", p.week.as_str(), value.as_str()])
            .map_err(row_err)?;
    }
    for p in &snapshot.weekly_spend {
        let value = format!("{:.2}", p.value);
        writer
            .write_record(["spend", p.week.as_str(), value.as_str()])
            .map_err(row_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StatusCounts, WeekLabel, WeeklyPoint};

    fn snapshot() -> AggregateSnapshot {
        AggregateSnapshot {
            counts: StatusCounts {
                total: 3,
                ordered: 1,
                rejected: 1,
                cart: 0,
                hold: 1,
            },
            success_rate: Some(33),
            weekly_deals: vec![
                WeeklyPoint {
                    week: WeekLabel::from_week(5),
                    value: 2,
                },
                WeeklyPoint {
                    week: WeekLabel::from_week(6),
                    value: 1,
                },
            ],
            weekly_spend: vec![WeeklyPoint {
                week: WeekLabel::from_week(6),
                value: 12.5,
            }],
        }
    }

    #[test]
    fn weekly_csv_is_long_format() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        write_weekly_rows(&mut writer, &snapshot()).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "series,week,value\ndeals,CW05,2\ndeals,CW06,1\nspend,CW06,12.50\n"
        );
    }

    #[test]
    fn snapshot_json_uses_plain_week_strings() {
        let path = std::env::temp_dir().join(format!("deals_snapshot_{}.json", std::process::id()));
        write_snapshot_json(&path, &snapshot()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["success_rate"], 33);
        assert_eq!(value["counts"]["hold"], 1);
        assert_eq!(value["weekly_deals"][0]["week"], "CW05");
    }
}
