//! Rehab Flux - Data engine for a rehabilitation monitoring dashboard
//!
//! Flux loads patient vitals (temperature, heart rate, SpO2) and game session
//! scores from a spreadsheet, and derives what the dashboard shows:
//! source loading → cleaning → comparison, aggregation, calorie estimation, and
//! threshold classification → JSON or CSV reports.
//!
//! ## Modules
//!
//! - **Sources and loading**: Google Sheets or CSV tables, cleaned and memoized
//! - **Derived metrics**: latest-vs-baseline deltas, per-date statistics, calories
//! - **Classification**: abnormal-reading highlights against fixed safe ranges

pub mod aggregate;
pub mod calories;
pub mod classify;
pub mod compare;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod types;

pub use calories::{estimate_calories, CalorieParams};
pub use classify::{classify_abnormal, Highlight};
pub use config::{DashboardConfig, SourceConfig};
pub use error::ComputeError;
pub use filter::ReadingFilter;
pub use loader::{DataLoader, LoadDiagnostic};
pub use pipeline::{DashboardProcessor, DashboardSettings};
pub use report::{to_csv, Envelope, ReportEncoder};
pub use source::{CsvSource, SheetsSource, SourceHandle, StaticSource, TabularSource};

/// Flux version embedded in every report
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "rehab-flux";
