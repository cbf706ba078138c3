//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - normalized records (`DealRecord`, `PurchaseRecord`) and `WeekLabel`
//! - caller inputs (`FilterSelection`, `PurchaseWindow`, `DashboardConfig`)
//! - pipeline outputs (`StatusCounts`, `WeeklyPoint`, `AggregateSnapshot`)

pub mod types;

pub use types::*;
