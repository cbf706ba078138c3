//! `deals-dashboard` library crate.
//!
//! The binary (`deals`) is a thin wrapper around this library so that:
//!
//! - the load/filter/aggregate pipeline is testable without spawning processes
//! - front-ends (text report, exports, TUI) share one pipeline
//! - code stays easy to navigate as the project grows

pub mod analytics;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
