//! Tabular sources
//!
//! This module provides the sources the loader pulls raw sheet rows from. A
//! source returns the header row followed by data rows, every cell as a string;
//! type coercion is left to the loader.

mod csv_file;
mod sheets;

pub use csv_file::CsvSource;
pub use sheets::{SheetsAuth, SheetsSource, SHEETS_API_BASE};

use crate::error::ComputeError;
use std::fmt;
use std::sync::Arc;

/// Raw rows as returned by a source: header first, then data rows
pub type RawRows = Vec<Vec<String>>;

/// Trait for remote or local tabular sources
pub trait TabularSource: Send + Sync {
    /// Stable identifier of the underlying store, used in cache keys
    fn id(&self) -> String;

    /// Fetch every row of `range`, header included
    fn fetch(&self, range: &str) -> Result<RawRows, ComputeError>;
}

/// A source paired with the range that holds one dataset
#[derive(Clone)]
pub struct SourceHandle {
    source: Arc<dyn TabularSource>,
    range: String,
}

impl SourceHandle {
    pub fn new(source: Arc<dyn TabularSource>, range: impl Into<String>) -> Self {
        Self {
            source,
            range: range.into(),
        }
    }

    pub fn range(&self) -> &str {
        &self.range
    }

    pub fn source_id(&self) -> String {
        self.source.id()
    }

    /// Cache key for this dataset: (source id, range)
    pub fn cache_key(&self) -> (String, String) {
        (self.source.id(), self.range.clone())
    }

    pub fn fetch(&self) -> Result<RawRows, ComputeError> {
        self.source.fetch(&self.range)
    }
}

impl fmt::Debug for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceHandle")
            .field("source", &self.source.id())
            .field("range", &self.range)
            .finish()
    }
}

/// In-memory source serving fixed rows for every range
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    rows: RawRows,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, rows: RawRows) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Build from string slices, convenient for fixtures
    pub fn from_rows(name: impl Into<String>, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        Self::new(name, rows)
    }
}

impl TabularSource for StaticSource {
    fn id(&self) -> String {
        format!("static:{}", self.name)
    }

    fn fetch(&self, _range: &str) -> Result<RawRows, ComputeError> {
        Ok(self.rows.clone())
    }
}
