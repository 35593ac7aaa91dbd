//! # abiframe-observability
//!
//! Logging setup and decode warning reports for abiframe.
//!
//! ## Structured logging
//! Text or JSON logs on stderr, levels configurable per crate.
//!
//! ## Warning reports
//! Decode warnings grouped by kind, counted, and surfaced through `tracing`.

pub mod report;
pub mod tracing_setup;

pub use report::{KindSummary, WarningReport};
pub use tracing_setup::{init_tracing, LogConfig};
