//! Latest-vs-baseline comparison
//!
//! This module compares the latest reading of each metric with a baseline,
//! either the previous reading or the mean of the whole column. "Latest" is the
//! last row in table order; the loader keeps source order, which is
//! timestamp-ascending for append-only sheets.

use crate::aggregate::{column, mean};
use crate::types::{ComparisonMode, ComparisonResult, Metric, Reading};

/// Compare the latest value of each metric against its baseline.
///
/// Metrics the table does not carry are skipped, so an empty table yields an
/// empty result. With [`ComparisonMode::PreviousReading`] and a single row the
/// result carries no baseline and no delta.
pub fn compare_latest<R: Reading>(
    table: &[R],
    metrics: &[Metric],
    mode: ComparisonMode,
) -> Vec<ComparisonResult> {
    metrics
        .iter()
        .filter_map(|metric| {
            let values = column(table, *metric);
            let latest = *values.last()?;
            Some(ComparisonResult::new(
                metric.column_name(),
                latest,
                baseline(&values, mode),
            ))
        })
        .collect()
}

/// Baseline of a column for `mode`; `None` when the history is too short
pub fn baseline(values: &[f64], mode: ComparisonMode) -> Option<f64> {
    match mode {
        ComparisonMode::PreviousReading => values.len().checked_sub(2).map(|idx| values[idx]),
        ComparisonMode::MeanValue => mean(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VitalReading;
    use chrono::{NaiveDate, NaiveTime};
    use pretty_assertions::assert_eq;

    fn table(heart_rates: &[f64]) -> Vec<VitalReading> {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        heart_rates
            .iter()
            .enumerate()
            .map(|(i, hr)| {
                let time = NaiveTime::from_hms_opt(10, i as u32, 0).unwrap();
                VitalReading::new(date, time, 98.6, *hr, 97.0)
            })
            .collect()
    }

    #[test]
    fn test_previous_reading_delta() {
        let results = compare_latest(
            &table(&[70.0, 75.0, 80.0]),
            &[Metric::HeartRate],
            ComparisonMode::PreviousReading,
        );

        assert_eq!(results, vec![ComparisonResult::new("Heart Rate", 80.0, Some(75.0))]);
        assert_eq!(results[0].delta_value, Some(5.0));
    }

    #[test]
    fn test_mean_value_delta() {
        let results = compare_latest(
            &table(&[70.0, 75.0, 80.0]),
            &[Metric::HeartRate],
            ComparisonMode::MeanValue,
        );

        assert_eq!(results[0].latest_value, 80.0);
        assert_eq!(results[0].baseline_value, Some(75.0));
        assert_eq!(results[0].delta_value, Some(5.0));
    }

    #[test]
    fn test_single_row_has_no_previous_baseline() {
        let results =
            compare_latest(&table(&[72.0]), &Metric::VITALS, ComparisonMode::PreviousReading);

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| !r.has_baseline() && r.delta_value.is_none()));
        assert_eq!(results[1].latest_value, 72.0);
    }

    #[test]
    fn test_single_row_mean_baseline_is_itself() {
        let results =
            compare_latest(&table(&[72.0]), &[Metric::HeartRate], ComparisonMode::MeanValue);
        assert_eq!(results[0].delta_value, Some(0.0));
    }

    #[test]
    fn test_empty_table_and_absent_metric() {
        assert!(compare_latest(&table(&[]), &Metric::VITALS, ComparisonMode::MeanValue).is_empty());
        let scores_only = compare_latest(
            &table(&[70.0, 80.0]),
            &[Metric::Score],
            ComparisonMode::PreviousReading,
        );
        assert!(scores_only.is_empty());
    }

    #[test]
    fn test_latest_follows_table_order_not_timestamps() {
        let mut rows = table(&[70.0, 90.0]);
        rows.swap(0, 1);

        let results = compare_latest(&rows, &[Metric::HeartRate], ComparisonMode::PreviousReading);
        assert_eq!(results[0].latest_value, 70.0);
        assert_eq!(results[0].delta_value, Some(-20.0));
    }
}
