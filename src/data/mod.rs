//! Remote sheet loading and the memoized source tables.

pub mod cache;
pub mod sheets;

pub use cache::{LoadCache, SourceTables};
pub use sheets::{
    ContributorSheet, HttpSheetSource, SheetLocation, SheetSource, SourcesConfig, load_deals,
    load_purchases,
};
