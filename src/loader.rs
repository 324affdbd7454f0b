//! Data loading
//!
//! This module turns raw sheet rows into typed, cleaned tables and memoizes them
//! for the life of the process.
//!
//! Loading never fails: an unreachable source, a missing column, or an empty
//! sheet all produce an empty table, and the problem is reported through
//! [`LoadDiagnostic`]s instead. Rows with a missing or unparsable required cell
//! are dropped. Row order is kept as the source delivered it.

use crate::error::ComputeError;
use crate::source::{RawRows, SourceHandle};
use crate::types::{Reading, ScoreReading, VitalReading, SHEET_DATE_FORMAT, SHEET_TIME_FORMAT};
use chrono::{NaiveDate, NaiveTime};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A shared, immutable loaded table
pub type Table<R> = Arc<[R]>;

/// A row type the loader can build from a sheet row
pub trait Record: Reading + Clone + Send + Sync + 'static {
    /// Dataset name used in logs and diagnostics
    const DATASET: &'static str;
    /// Header names that must be present in the sheet
    const REQUIRED_COLUMNS: &'static [&'static str];

    /// Build a record, or `None` if any required cell is missing or malformed
    fn from_row(row: &Row<'_>) -> Option<Self>;
}

impl Record for VitalReading {
    const DATASET: &'static str = "vitals";
    const REQUIRED_COLUMNS: &'static [&'static str] =
        &["Date", "Time", "Temperature", "Heart Rate", "SpO2"];

    fn from_row(row: &Row<'_>) -> Option<Self> {
        Some(VitalReading::new(
            row.date("Date")?,
            row.time("Time")?,
            row.number("Temperature")?,
            row.number("Heart Rate")?,
            row.number("SpO2")?,
        ))
    }
}

impl Record for ScoreReading {
    const DATASET: &'static str = "scores";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["Date", "Time", "Score"];

    fn from_row(row: &Row<'_>) -> Option<Self> {
        Some(ScoreReading::new(
            row.date("Date")?,
            row.time("Time")?,
            row.number("Score")?,
        ))
    }
}

/// Header lookup built from the first sheet row
#[derive(Debug)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn from_header(header: &[String]) -> Self {
        let mut positions = HashMap::new();
        for (idx, name) in header.iter().enumerate() {
            // CSV exports may lead with a UTF-8 byte order mark
            let name = name.trim_start_matches('\u{feff}').trim();
            // First occurrence wins for duplicated headers
            positions.entry(name.to_string()).or_insert(idx);
        }
        Self { positions }
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// First required column absent from the header, if any
    pub fn missing<'c>(&self, required: &[&'c str]) -> Option<&'c str> {
        required
            .iter()
            .copied()
            .find(|column| !self.positions.contains_key(*column))
    }
}

/// View of one data row with typed cell accessors
pub struct Row<'a> {
    index: &'a ColumnIndex,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    pub fn new(index: &'a ColumnIndex, cells: &'a [String]) -> Self {
        Self { index, cells }
    }

    /// Trimmed cell text; `None` for absent or blank cells
    pub fn cell(&self, column: &str) -> Option<&'a str> {
        let idx = self.index.position(column)?;
        let value = self.cells.get(idx)?.trim();
        (!value.is_empty()).then_some(value)
    }

    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.cell(column)?, SHEET_DATE_FORMAT).ok()
    }

    pub fn time(&self, column: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.cell(column)?, SHEET_TIME_FORMAT).ok()
    }

    /// Finite numeric value; `NaN` and infinities count as malformed
    pub fn number(&self, column: &str) -> Option<f64> {
        self.cell(column)?
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }
}

/// Result of cleaning one fetched sheet
#[derive(Debug, Clone)]
pub struct ParsedTable<R> {
    pub records: Vec<R>,
    /// Data rows excluded for missing or malformed cells
    pub dropped: usize,
}

/// Clean raw rows into records. Errors only for an empty sheet or a missing column.
pub fn parse_table<R: Record>(rows: &RawRows) -> Result<ParsedTable<R>, ComputeError> {
    let Some((header, data)) = rows.split_first() else {
        return Err(ComputeError::EmptySource(R::DATASET.to_string()));
    };

    let index = ColumnIndex::from_header(header);
    if let Some(column) = index.missing(R::REQUIRED_COLUMNS) {
        return Err(ComputeError::MissingColumn(format!(
            "{} (dataset {})",
            column,
            R::DATASET
        )));
    }

    let mut records = Vec::with_capacity(data.len());
    let mut dropped = 0;
    for cells in data {
        match R::from_row(&Row::new(&index, cells)) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    Ok(ParsedTable { records, dropped })
}

/// Kind of problem met while loading a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    SourceUnavailable,
    EmptySource,
    MissingColumn,
    MalformedRows,
}

/// Out-of-band report of a degraded load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadDiagnostic {
    pub dataset: String,
    pub source: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

type CacheKey = (String, String);
type Slot<R> = Arc<Mutex<Option<Table<R>>>>;

/// Memoized tables keyed by (source id, range)
///
/// Each key owns a slot whose lock is held for the whole fetch-and-replace
/// step, so at most one fetch per dataset is in flight. Callers racing on the
/// same key wait and then share the stored table.
pub struct TableCache<R> {
    slots: Mutex<HashMap<CacheKey, Slot<R>>>,
}

impl<R> Default for TableCache<R> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<R> TableCache<R> {
    fn slot(&self, key: CacheKey) -> Slot<R> {
        lock(&self.slots).entry(key).or_default().clone()
    }

    /// Return the cached table for `key`, running `load` on first use
    pub fn get_or_load(&self, key: CacheKey, load: impl FnOnce() -> Table<R>) -> Table<R> {
        let slot = self.slot(key);
        let mut entry = lock(&slot);
        if let Some(table) = entry.as_ref() {
            return table.clone();
        }
        let table = load();
        *entry = Some(table.clone());
        table
    }

    /// Whether `key` currently holds a table
    pub fn contains(&self, key: &CacheKey) -> bool {
        let Some(slot) = lock(&self.slots).get(key).cloned() else {
            return false;
        };
        let cached = lock(&slot).is_some();
        cached
    }

    /// Drop every cached table; the next load refetches.
    ///
    /// Slots are emptied in place rather than removed, so a fetch in flight
    /// finishes before its slot is cleared and later loads queue behind it.
    /// The slot map stays locked until every slot is empty.
    pub fn clear(&self) {
        let slots = lock(&self.slots);
        for slot in slots.values() {
            *lock(slot) = None;
        }
    }
}

/// Cached tables hold plain data, so a poisoned lock is still usable
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loader for the vitals and score datasets
#[derive(Default)]
pub struct DataLoader {
    vitals: TableCache<VitalReading>,
    scores: TableCache<ScoreReading>,
    diagnostics: Mutex<Vec<LoadDiagnostic>>,
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the vitals table behind `handle`, memoized
    pub fn load_vitals(&self, handle: &SourceHandle) -> Table<VitalReading> {
        self.load(&self.vitals, handle)
    }

    /// Load the score table behind `handle`, memoized
    pub fn load_scores(&self, handle: &SourceHandle) -> Table<ScoreReading> {
        self.load(&self.scores, handle)
    }

    /// Clear every memoized table
    pub fn refresh(&self) {
        info!("clearing cached tables");
        self.vitals.clear();
        self.scores.clear();
    }

    /// Drain diagnostics recorded since the last call
    pub fn take_diagnostics(&self) -> Vec<LoadDiagnostic> {
        std::mem::take(&mut *lock(&self.diagnostics))
    }

    fn load<R: Record>(&self, cache: &TableCache<R>, handle: &SourceHandle) -> Table<R> {
        cache.get_or_load(handle.cache_key(), || self.fetch_table(handle))
    }

    fn fetch_table<R: Record>(&self, handle: &SourceHandle) -> Table<R> {
        debug!("cache miss for {} at {:?}", R::DATASET, handle);

        let parsed = handle
            .fetch()
            .and_then(|rows| parse_table::<R>(&rows));

        match parsed {
            Ok(table) => {
                info!(
                    "loaded {} {} rows from {} ({} dropped)",
                    table.records.len(),
                    R::DATASET,
                    handle.source_id(),
                    table.dropped
                );
                if table.dropped > 0 {
                    self.report::<R>(
                        handle,
                        DiagnosticKind::MalformedRows,
                        format!(
                            "{} malformed rows dropped, {} kept",
                            table.dropped,
                            table.records.len()
                        ),
                    );
                }
                table.records.into()
            }
            Err(err) => {
                let kind = match &err {
                    ComputeError::EmptySource(_) => DiagnosticKind::EmptySource,
                    ComputeError::MissingColumn(_) => DiagnosticKind::MissingColumn,
                    _ => DiagnosticKind::SourceUnavailable,
                };
                self.report::<R>(handle, kind, err.to_string());
                Vec::new().into()
            }
        }
    }

    fn report<R: Record>(&self, handle: &SourceHandle, kind: DiagnosticKind, message: String) {
        warn!(
            "degraded load of {} from {}: {}",
            R::DATASET,
            handle.source_id(),
            message
        );
        lock(&self.diagnostics).push(LoadDiagnostic {
            dataset: R::DATASET.to_string(),
            source: handle.source_id(),
            kind,
            message,
        });
    }
}
