//! Grouped aggregation
//!
//! This module computes descriptive statistics (count, mean, median, max, min)
//! over loaded tables:
//! - Per group, for an arbitrary grouping key
//! - Per calendar date, for the daily statistics view
//! - Across a multi-date selection, either by combining per-date statistics or
//!   by recomputing from the raw rows
//! - Per-date score totals for the game score view

use crate::types::{
    AggregateRow, DateKey, Metric, Reading, ScoreDaySummary, ScoreReading, SummaryMode,
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;

/// Descriptive statistics over a non-empty set of values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    pub min: f64,
}

impl Stats {
    /// `None` for an empty slice
    pub fn from_values(values: &[f64]) -> Option<Self> {
        Some(Self {
            count: values.len(),
            mean: mean(values)?,
            median: median(values)?,
            max: values.iter().copied().reduce(f64::max)?,
            min: values.iter().copied().reduce(f64::min)?,
        })
    }

    fn into_row(self, group: Option<String>, metric: Metric) -> AggregateRow {
        AggregateRow {
            group,
            metric,
            count: self.count,
            mean: self.mean,
            median: self.median,
            max: self.max,
            min: self.min,
        }
    }
}

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median; the mean of the two middle values for an even count
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Values of `metric` in table order, skipping rows that lack it
pub fn column<R: Reading>(table: &[R], metric: Metric) -> Vec<f64> {
    table.iter().filter_map(|row| row.value(metric)).collect()
}

/// One row per distinct key, ordered by key.
///
/// Groups with no value for `metric` are omitted. The result does not depend
/// on the order of the input rows.
pub fn aggregate<R, K, F>(table: &[R], metric: Metric, key: F) -> Vec<AggregateRow>
where
    R: Reading,
    K: Ord + Display,
    F: Fn(&R) -> K,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for row in table {
        let values = groups.entry(key(row)).or_default();
        if let Some(value) = row.value(metric) {
            values.push(value);
        }
    }

    groups
        .into_iter()
        .filter_map(|(key, values)| {
            Stats::from_values(&values).map(|stats| stats.into_row(Some(key.to_string()), metric))
        })
        .collect()
}

/// Statistics of `metric` per calendar date, in chronological order
pub fn aggregate_by_date<R: Reading>(table: &[R], metric: Metric) -> Vec<AggregateRow> {
    aggregate(table, metric, |row| DateKey(row.date()))
}

/// Per-date statistics for each metric, grouped metric by metric
pub fn daily_stats<R: Reading>(table: &[R], metrics: &[Metric]) -> Vec<AggregateRow> {
    metrics
        .iter()
        .flat_map(|metric| aggregate_by_date(table, *metric))
        .collect()
}

/// One summary row per metric over the selected dates.
///
/// With [`SummaryMode::PerDateAggregates`] each date is summarized once and
/// the per-date results are combined: counts are summed, the mean is the mean
/// of the per-date means, the median the median of the per-date medians, max
/// and min the extremes of the per-date extremes. Dates carry equal weight
/// whatever their row counts. [`SummaryMode::Recompute`] pools the raw rows of
/// every selected date instead.
pub fn summarize_selection<R: Reading>(
    table: &[R],
    dates: &[NaiveDate],
    metrics: &[Metric],
    mode: SummaryMode,
) -> Vec<AggregateRow> {
    let mut seen = HashSet::new();
    let dates: Vec<NaiveDate> = dates.iter().copied().filter(|d| seen.insert(*d)).collect();

    metrics
        .iter()
        .filter_map(|metric| {
            let stats = match mode {
                SummaryMode::PerDateAggregates => combine_per_date(table, &dates, *metric),
                SummaryMode::Recompute => {
                    let selected: Vec<f64> = table
                        .iter()
                        .filter(|row| dates.contains(&row.date()))
                        .filter_map(|row| row.value(*metric))
                        .collect();
                    Stats::from_values(&selected)
                }
            };
            stats.map(|stats| stats.into_row(None, *metric))
        })
        .collect()
}

fn combine_per_date<R: Reading>(table: &[R], dates: &[NaiveDate], metric: Metric) -> Option<Stats> {
    let per_date: Vec<Stats> = dates
        .iter()
        .filter_map(|date| {
            let values: Vec<f64> = table
                .iter()
                .filter(|row| row.date() == *date)
                .filter_map(|row| row.value(metric))
                .collect();
            Stats::from_values(&values)
        })
        .collect();

    if per_date.is_empty() {
        return None;
    }

    let means: Vec<f64> = per_date.iter().map(|s| s.mean).collect();
    let medians: Vec<f64> = per_date.iter().map(|s| s.median).collect();

    Some(Stats {
        count: per_date.iter().map(|s| s.count).sum(),
        mean: mean(&means)?,
        median: median(&medians)?,
        max: per_date.iter().map(|s| s.max).reduce(f64::max)?,
        min: per_date.iter().map(|s| s.min).reduce(f64::min)?,
    })
}

/// Score totals per calendar date, in chronological order
pub fn score_summary_by_date(scores: &[ScoreReading]) -> Vec<ScoreDaySummary> {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for reading in scores {
        by_date.entry(reading.date).or_default().push(reading.score);
    }

    by_date
        .into_iter()
        .filter_map(|(date, values)| {
            let stats = Stats::from_values(&values)?;
            Some(ScoreDaySummary {
                date,
                sessions: stats.count,
                total_score: values.iter().sum(),
                average_score: stats.mean,
                min_score: stats.min,
                max_score: stats.max,
            })
        })
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

    fn vital(d: u32, hour: u32, heart_rate: f64) -> VitalReading {
        let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap();
        VitalReading::new(day(d), time, 98.6, heart_rate, 97.0)
    }

    fn score(d: u32, hour: u32, value: f64) -> ScoreReading {
        ScoreReading::new(day(d), NaiveTime::from_hms_opt(hour, 0, 0).unwrap(), value)
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_aggregate_one_row_per_date() {
        let table = vec![
            vital(1, 8, 60.0),
            vital(2, 9, 90.0),
            vital(1, 10, 80.0),
            vital(1, 12, 70.0),
        ];
        let rows = aggregate_by_date(&table, Metric::HeartRate);

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            AggregateRow {
                group: Some("01-02-2024".to_string()),
                metric: Metric::HeartRate,
                count: 3,
                mean: 70.0,
                median: 70.0,
                max: 80.0,
                min: 60.0,
            }
        );
        assert_eq!(rows[1].group.as_deref(), Some("02-02-2024"));
        assert_eq!(rows[1].count, 1);
        assert_eq!(rows[1].median, 90.0);
    }

    #[test]
    fn test_aggregate_independent_of_row_order() {
        let table = vec![
            vital(1, 8, 60.0),
            vital(2, 9, 90.0),
            vital(1, 10, 80.0),
            vital(2, 11, 100.0),
        ];
        let mut reversed = table.clone();
        reversed.reverse();

        assert_eq!(
            aggregate_by_date(&table, Metric::HeartRate),
            aggregate_by_date(&reversed, Metric::HeartRate)
        );
    }

    #[test]
    fn test_aggregate_skips_metric_absent_from_table() {
        let table = vec![vital(1, 8, 60.0)];
        assert!(aggregate_by_date(&table, Metric::Score).is_empty());
    }

    #[test]
    fn test_daily_stats_groups_metric_by_metric() {
        let table = vec![vital(1, 8, 60.0), vital(2, 9, 90.0)];
        let rows = daily_stats(&table, &Metric::VITALS);

        let order: Vec<(Metric, Option<&str>)> =
            rows.iter().map(|r| (r.metric, r.group.as_deref())).collect();
        assert_eq!(
            order,
            vec![
                (Metric::Temperature, Some("01-02-2024")),
                (Metric::Temperature, Some("02-02-2024")),
                (Metric::HeartRate, Some("01-02-2024")),
                (Metric::HeartRate, Some("02-02-2024")),
                (Metric::Spo2, Some("01-02-2024")),
                (Metric::Spo2, Some("02-02-2024")),
            ]
        );
    }

    #[test]
    fn test_selection_combines_per_date_statistics() {
        let table = vec![
            vital(1, 8, 60.0),
            vital(1, 9, 70.0),
            vital(1, 10, 80.0),
            vital(2, 9, 100.0),
        ];
        let rows = summarize_selection(
            &table,
            &[day(1), day(2)],
            &[Metric::HeartRate],
            SummaryMode::PerDateAggregates,
        );

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.group, None);
        assert_eq!(row.count, 4);
        assert_eq!(row.mean, 85.0);
        assert_eq!(row.median, 85.0);
        assert_eq!(row.max, 100.0);
        assert_eq!(row.min, 60.0);
    }

    #[test]
    fn test_selection_recomputed_from_raw_rows() {
        let table = vec![
            vital(1, 8, 60.0),
            vital(1, 9, 70.0),
            vital(1, 10, 80.0),
            vital(2, 9, 100.0),
        ];
        let rows = summarize_selection(
            &table,
            &[day(1), day(2)],
            &[Metric::HeartRate],
            SummaryMode::Recompute,
        );

        let row = &rows[0];
        assert_eq!(row.count, 4);
        assert_eq!(row.mean, 77.5);
        assert_eq!(row.median, 75.0);
    }

    #[test]
    fn test_selection_ignores_unselected_and_duplicate_dates() {
        let table = vec![vital(1, 8, 60.0), vital(2, 9, 100.0), vital(3, 9, 40.0)];
        let rows = summarize_selection(
            &table,
            &[day(2), day(2), day(9)],
            &[Metric::HeartRate],
            SummaryMode::PerDateAggregates,
        );

        assert_eq!(rows[0].count, 1);
        assert_eq!(rows[0].mean, 100.0);

        let none = summarize_selection(&table, &[], &[Metric::HeartRate], SummaryMode::Recompute);
        assert!(none.is_empty());
    }

    #[test]
    fn test_score_summary_by_date() {
        let scores = vec![
            score(2, 9, 50.0),
            score(1, 9, 100.0),
            score(1, 10, 40.0),
            score(1, 11, 60.0),
        ];
        let days = score_summary_by_date(&scores);

        assert_eq!(days.len(), 2);
        assert_eq!(
            days[0],
            ScoreDaySummary {
                date: day(1),
                sessions: 3,
                total_score: 200.0,
                average_score: 200.0 / 3.0,
                min_score: 40.0,
                max_score: 100.0,
            }
        );
        assert_eq!(days[1].total_score, 50.0);
    }
}
