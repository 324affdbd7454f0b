//! Date and hour-of-day filtering of loaded tables

use crate::types::Reading;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Row selection by calendar date and hour of day.
///
/// A row passes when its date is in `dates` (any date when `None`) and
/// `start_hour <= hour <= end_hour`. The default passes every row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingFilter {
    pub dates: Option<BTreeSet<NaiveDate>>,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for ReadingFilter {
    fn default() -> Self {
        Self {
            dates: None,
            start_hour: 0,
            end_hour: 24,
        }
    }
}

impl ReadingFilter {
    pub fn with_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.dates = Some(dates.into_iter().collect());
        self
    }

    pub fn with_hours(mut self, start_hour: u32, end_hour: u32) -> Self {
        self.start_hour = start_hour;
        self.end_hour = end_hour;
        self
    }

    pub fn matches<R: Reading>(&self, row: &R) -> bool {
        let date_selected = self
            .dates
            .as_ref()
            .map_or(true, |dates| dates.contains(&row.date()));
        let hour = row.hour();
        date_selected && self.start_hour <= hour && hour <= self.end_hour
    }

    /// Matching rows, in table order
    pub fn apply<R: Reading + Clone>(&self, table: &[R]) -> Vec<R> {
        table.iter().filter(|row| self.matches(*row)).cloned().collect()
    }
}

/// Distinct dates present in the table, ascending
pub fn distinct_dates<R: Reading>(table: &[R]) -> Vec<NaiveDate> {
    table
        .iter()
        .map(|row| row.date())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VitalReading;
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn vital(d: u32, hour: u32) -> VitalReading {
        VitalReading::new(day(d), NaiveTime::from_hms_opt(hour, 30, 0).unwrap(), 98.6, 72.0, 97.0)
    }

    #[test]
    fn test_default_passes_everything() {
        let table = vec![vital(1, 0), vital(2, 23)];
        assert_eq!(ReadingFilter::default().apply(&table), table);
    }

    #[test]
    fn test_hour_bounds_are_inclusive() {
        let table = vec![vital(1, 7), vital(1, 8), vital(1, 12), vital(1, 13)];
        let filtered = ReadingFilter::default().with_hours(8, 12).apply(&table);

        let hours: Vec<u32> = filtered.iter().map(|r| r.hour()).collect();
        assert_eq!(hours, vec![8, 12]);
    }

    #[test]
    fn test_date_selection() {
        let table = vec![vital(1, 9), vital(2, 9), vital(3, 9)];
        let filtered = ReadingFilter::default().with_dates([day(1), day(3)]).apply(&table);

        assert_eq!(filtered, vec![vital(1, 9), vital(3, 9)]);
        assert!(ReadingFilter::default().with_dates(Vec::new()).apply(&table).is_empty());
    }

    #[test]
    fn test_distinct_dates_ascending() {
        let table = vec![vital(3, 9), vital(1, 9), vital(3, 10), vital(2, 9)];
        assert_eq!(distinct_dates(&table), vec![day(1), day(2), day(3)]);
    }
}
