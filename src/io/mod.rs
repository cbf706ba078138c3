//! Input/output helpers.
//!
//! - value normalization (`normalize`)
//! - CSV ingest + schema validation (`ingest`)
//! - snapshot exports (JSON/CSV) (`export`)

pub mod export;
pub mod ingest;
pub mod normalize;

pub use export::*;
pub use ingest::*;
pub use normalize::*;
