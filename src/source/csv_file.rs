//! CSV source
//!
//! Reads a sheet exported as CSV. The file stands in for a single sheet, so the
//! requested range is ignored.

use crate::error::ComputeError;
use csv::ReaderBuilder;
use std::io::Read;
use std::path::PathBuf;

use super::{RawRows, TabularSource};

/// Local CSV export of one sheet
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read every record from `reader`, keeping ragged rows as-is
    pub fn read_rows<R: Read>(reader: R) -> Result<RawRows, ComputeError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }
}

impl TabularSource for CsvSource {
    fn id(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn fetch(&self, _range: &str) -> Result<RawRows, ComputeError> {
        let file = std::fs::File::open(&self.path).map_err(|e| {
            ComputeError::SourceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        Self::read_rows(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_rows_keeps_ragged_records() {
        let data = "Date,Time,Score\n01-02-2024,10:00:00,120\n02-02-2024,11:00:00\n";
        let rows = CsvSource::read_rows(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Date", "Time", "Score"]);
        assert_eq!(rows[2].len(), 2);
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let source = CsvSource::new("/nonexistent/rehab/vitals.csv");
        let result = source.fetch("Sheet2");

        assert!(matches!(result, Err(ComputeError::SourceUnavailable(_))));
    }

    #[test]
    fn test_fetch_from_file() {
        let path = std::env::temp_dir().join(format!("rehab-{}.csv", uuid::Uuid::new_v4()));
        std::fs::write(&path, "Date,Time,Score\n01-02-2024,10:00:00,120\n").unwrap();

        let rows = CsvSource::new(&path).fetch("ignored").unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(rows[1], vec!["01-02-2024", "10:00:00", "120"]);
    }
}
