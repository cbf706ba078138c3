//! Filtering and aggregation over the loaded tables.
//!
//! Responsibilities:
//!
//! - restrict deals to a status/contributor selection
//! - restrict purchases to the reporting window
//! - compute status counters, success rate and the weekly series

pub mod aggregate;
pub mod filter;

pub use aggregate::*;
pub use filter::*;
