//! CSV ingest and normalization.
//!
//! This module turns the raw CSV text of a sheet into normalized records.
//!
//! Design goals:
//! - **Strict schema**: required columns are validated up front, before any row
//! - **Fail closed**: a malformed required value fails the whole table
//! - **Order preserving**: records come out in sheet order
//! - **Separation of concerns**: no fetching or filtering here

use std::collections::HashMap;

use chrono::Datelike;
use csv::StringRecord;

use crate::domain::{DealRecord, PurchaseRecord};
use crate::error::AppError;
use crate::io::normalize::{SHEET_DATE_FORMAT, derive_week_label, parse_date, week_number};

/// Column names of a deals sheet.
#[derive(Debug, Clone)]
pub struct DealsSchema {
    pub asin: String,
    pub status: String,
    pub date: String,
    pub date_format: String,
}

impl Default for DealsSchema {
    fn default() -> Self {
        Self {
            asin: "ASIN".to_string(),
            status: "Status".to_string(),
            date: "Date".to_string(),
            date_format: SHEET_DATE_FORMAT.to_string(),
        }
    }
}

/// Column names of the purchase log. Other columns pass through unread.
#[derive(Debug, Clone)]
pub struct PurchaseSchema {
    pub order_date: String,
    pub total_cost: String,
    pub date_format: String,
}

impl Default for PurchaseSchema {
    fn default() -> Self {
        Self {
            order_date: "ORDER (DATE)".to_string(),
            total_cost: "TOTAL PURCHASE (VAT incl)".to_string(),
            date_format: SHEET_DATE_FORMAT.to_string(),
        }
    }
}

/// Parse a deals sheet and tag every row with `contributor`.
pub fn parse_deals_csv(
    sheet: &str,
    text: &str,
    contributor: &str,
    schema: &DealsSchema,
) -> Result<Vec<DealRecord>, AppError> {
    let table = Table::read(sheet, text)?;
    let asin = table.column(&schema.asin)?;
    let status = table.column(&schema.status)?;
    let date = table.column(&schema.date)?;

    let mut out = Vec::with_capacity(table.rows.len());
    for (line, record) in table.data_rows() {
        let asin_value = cell(record, asin);
        if asin_value.is_empty() {
            return Err(AppError::source_unavailable(
                sheet,
                format!("line {line}: missing required value `{}`", schema.asin),
            ));
        }

        let date_value = parse_date(cell(record, date), &schema.date_format)
            .map_err(|e| AppError::parse(format!("{sheet} line {line} `{}`", schema.date), e))?;

        out.push(DealRecord {
            asin: asin_value.to_string(),
            // Blank statuses stay blank and land in the on-hold bucket.
            status: cell(record, status).to_string(),
            date: date_value,
            contributor: contributor.to_string(),
            week_label: derive_week_label(date_value),
        });
    }

    Ok(out)
}

/// Parse the purchase log.
pub fn parse_purchases_csv(
    sheet: &str,
    text: &str,
    schema: &PurchaseSchema,
) -> Result<Vec<PurchaseRecord>, AppError> {
    let table = Table::read(sheet, text)?;
    let order_date = table.column(&schema.order_date)?;
    let total_cost = table.column(&schema.total_cost)?;

    let mut out = Vec::with_capacity(table.rows.len());
    for (line, record) in table.data_rows() {
        let date = parse_date(cell(record, order_date), &schema.date_format).map_err(|e| {
            AppError::parse(format!("{sheet} line {line} `{}`", schema.order_date), e)
        })?;

        out.push(PurchaseRecord {
            order_date: date,
            total_cost: cell(record, total_cost).to_string(),
            line,
            year: date.year(),
            week: week_number(date),
            week_label: derive_week_label(date),
        });
    }

    Ok(out)
}

/// A CSV table with a validated-on-demand header.
struct Table<'a> {
    sheet: &'a str,
    header_map: HashMap<String, usize>,
    rows: Vec<StringRecord>,
}

impl<'a> Table<'a> {
    fn read(sheet: &'a str, text: &str) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| {
                AppError::source_unavailable(sheet, format!("failed to read CSV headers: {e}"))
            })?
            .clone();
        if headers.iter().all(str::is_empty) {
            return Err(AppError::source_unavailable(
                sheet,
                "response is not a table (empty header)",
            ));
        }

        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::source_unavailable(sheet, format!("malformed CSV: {e}")))?;

        Ok(Self {
            sheet,
            header_map: build_header_map(&headers),
            rows,
        })
    }

    fn column(&self, name: &str) -> Result<usize, AppError> {
        self.header_map
            .get(&normalize_header_name(name))
            .copied()
            .ok_or_else(|| AppError::MissingColumn {
                sheet: self.sheet.to_string(),
                column: name.to_string(),
            })
    }

    /// Non-blank rows with their 1-based CSV line numbers.
    fn data_rows(&self) -> impl Iterator<Item = (usize, &StringRecord)> {
        // +2: one for the header line, one for 1-based numbering.
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, record)| (idx + 2, record))
            .filter(|(_, record)| !record.iter().all(str::is_empty))
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins on duplicate headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Sheet exports sometimes carry a BOM on the first header; without
    // stripping it the first column would be reported missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).map(str::trim).unwrap_or("")
}
