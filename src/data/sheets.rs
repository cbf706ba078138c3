//! Spreadsheet sources: configuration, fetching and the two table loaders.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::domain::{DealRecord, PurchaseRecord};
use crate::error::AppError;
use crate::io::ingest::{DealsSchema, PurchaseSchema, parse_deals_csv, parse_purchases_csv};

const EXPORT_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

pub const ENV_SHEET_DECCY: &str = "SHEET_ID_VA_DECCY";
pub const ENV_SHEET_LIEZEL: &str = "SHEET_ID_VA_LIEZEL";

/// The purchase log lives in one fixed sheet.
pub const PURCHASE_SHEET_ID: &str = "1yqwcodAe1Fypk3SdksajOIe_VAUPY27xaAOGyA4cFiE";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A remote sheet addressed by its document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetLocation {
    pub sheet_id: String,
}

impl SheetLocation {
    pub fn new(sheet_id: impl Into<String>) -> Self {
        Self {
            sheet_id: sheet_id.into(),
        }
    }

    pub fn export_url(&self) -> String {
        format!("{EXPORT_BASE_URL}/{}/export?format=csv", self.sheet_id)
    }
}

/// A deals sheet and the contributor its rows belong to.
#[derive(Debug, Clone)]
pub struct ContributorSheet {
    pub contributor: String,
    pub location: SheetLocation,
}

/// Where every table comes from, plus the schemas they are validated against.
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    /// Concatenated in this order.
    pub contributors: Vec<ContributorSheet>,
    pub purchases: SheetLocation,
    pub deals_schema: DealsSchema,
    pub purchase_schema: PurchaseSchema,
}

impl SourcesConfig {
    /// Resolve sheet ids from the process environment (and `.env`).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve sheet ids through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    AppError::Configuration(format!("missing {key} in environment (.env)"))
                })
        };

        let contributors = vec![
            ContributorSheet {
                contributor: "Deccy".to_string(),
                location: SheetLocation::new(require(ENV_SHEET_DECCY)?),
            },
            ContributorSheet {
                contributor: "Liezel".to_string(),
                location: SheetLocation::new(require(ENV_SHEET_LIEZEL)?),
            },
        ];

        Ok(Self {
            contributors,
            purchases: SheetLocation::new(PURCHASE_SHEET_ID),
            deals_schema: DealsSchema::default(),
            purchase_schema: PurchaseSchema::default(),
        })
    }
}

/// Anything that can hand back a sheet as CSV text.
pub trait SheetSource {
    fn fetch_csv(&self, location: &SheetLocation) -> Result<String, AppError>;
}

/// Fetches the CSV export of a sheet over HTTPS.
pub struct HttpSheetSource {
    client: Client,
}

impl HttpSheetSource {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl SheetSource for HttpSheetSource {
    fn fetch_csv(&self, location: &SheetLocation) -> Result<String, AppError> {
        let url = location.export_url();
        tracing::debug!(sheet = %location.sheet_id, "fetching sheet");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| {
                AppError::source_unavailable(&location.sheet_id, format!("request failed: {e}"))
            })?;

        if !resp.status().is_success() {
            return Err(AppError::source_unavailable(
                &location.sheet_id,
                format!("request failed with status {}", resp.status()),
            ));
        }

        resp.text()
            .map_err(|e| {
                AppError::source_unavailable(
                    &location.sheet_id,
                    format!("failed to read body: {e}"),
                )
            })
    }
}

/// Fetch every contributor sheet and concatenate the rows.
///
/// Rows keep sheet order; sheets keep `config.contributors` order.
pub fn load_deals<S: SheetSource + ?Sized>(
    source: &S,
    config: &SourcesConfig,
) -> Result<Vec<DealRecord>, AppError> {
    let mut deals = Vec::new();
    for sheet in &config.contributors {
        let text = source.fetch_csv(&sheet.location)?;
        let label = format!("deals/{}", sheet.contributor);
        let rows = parse_deals_csv(&label, &text, &sheet.contributor, &config.deals_schema)?;
        tracing::info!(contributor = %sheet.contributor, rows = rows.len(), "loaded deals sheet");
        deals.extend(rows);
    }
    Ok(deals)
}

pub fn load_purchases<S: SheetSource + ?Sized>(
    source: &S,
    config: &SourcesConfig,
) -> Result<Vec<PurchaseRecord>, AppError> {
    let text = source.fetch_csv(&config.purchases)?;
    let rows = parse_purchases_csv("purchases", &text, &config.purchase_schema)?;
    tracing::info!(rows = rows.len(), "loaded purchase log");
    Ok(rows)
}
