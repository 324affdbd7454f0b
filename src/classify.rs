//! Threshold classification of vital readings

use crate::types::{Metric, Reading};
use serde::{Deserialize, Serialize};

/// Safe band of a metric; values outside it are abnormal.
///
/// Bounds are inclusive: a value exactly on a bound is safe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SafeRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

impl Metric {
    /// `None` for metrics that are never flagged
    pub fn safe_range(&self) -> Option<SafeRange> {
        match self {
            Metric::Temperature => Some(SafeRange { min: None, max: Some(99.5) }),
            Metric::HeartRate => Some(SafeRange { min: Some(60.0), max: Some(100.0) }),
            Metric::Spo2 => Some(SafeRange { min: Some(95.0), max: None }),
            Metric::Score => None,
        }
    }

    pub fn is_abnormal(&self, value: f64) -> bool {
        self.safe_range().map_or(false, |range| !range.contains(value))
    }
}

/// Rows whose `metric` value is outside the safe range, in table order
pub fn classify_abnormal<'a, R: Reading>(readings: &'a [R], metric: Metric) -> Vec<&'a R> {
    readings
        .iter()
        .filter(|row| row.value(metric).map_or(false, |v| metric.is_abnormal(v)))
        .collect()
}

/// Abnormal-reading count for one metric over a set of readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub metric: Metric,
    pub total: usize,
    pub abnormal: usize,
}

impl Highlight {
    pub fn has_abnormal(&self) -> bool {
        self.abnormal > 0
    }
}

pub fn highlight<R: Reading>(readings: &[R], metric: Metric) -> Highlight {
    Highlight {
        metric,
        total: readings.iter().filter(|row| row.value(metric).is_some()).count(),
        abnormal: classify_abnormal(readings, metric).len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ScoreReading, VitalReading};
    use chrono::{NaiveDate, NaiveTime};
    use pretty_assertions::assert_eq;

    fn vital(minute: u32, temperature: f64, heart_rate: f64, spo2: f64) -> VitalReading {
        VitalReading::new(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveTime::from_hms_opt(10, minute, 0).unwrap(),
            temperature,
            heart_rate,
            spo2,
        )
    }

    #[test]
    fn test_temperature_boundary() {
        assert!(!Metric::Temperature.is_abnormal(99.5));
        assert!(Metric::Temperature.is_abnormal(99.51));
        assert!(!Metric::Temperature.is_abnormal(95.0));
    }

    #[test]
    fn test_heart_rate_boundaries() {
        assert!(!Metric::HeartRate.is_abnormal(60.0));
        assert!(!Metric::HeartRate.is_abnormal(100.0));
        assert!(Metric::HeartRate.is_abnormal(59.9));
        assert!(Metric::HeartRate.is_abnormal(100.1));
    }

    #[test]
    fn test_spo2_boundary() {
        assert!(!Metric::Spo2.is_abnormal(95.0));
        assert!(Metric::Spo2.is_abnormal(94.9));
        assert!(!Metric::Spo2.is_abnormal(100.0));
    }

    #[test]
    fn test_score_is_never_abnormal() {
        assert_eq!(Metric::Score.safe_range(), None);
        assert!(!Metric::Score.is_abnormal(-1000.0));

        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let scores = vec![ScoreReading::new(date, NaiveTime::from_hms_opt(9, 0, 0).unwrap(), 0.0)];
        assert!(classify_abnormal(&scores, Metric::Score).is_empty());
    }

    #[test]
    fn test_classify_abnormal_subset() {
        let readings = vec![
            vital(0, 98.6, 72.0, 98.0),
            vital(1, 100.2, 72.0, 98.0),
            vital(2, 98.6, 110.0, 94.0),
        ];

        let fevers = classify_abnormal(&readings, Metric::Temperature);
        assert_eq!(fevers, vec![&readings[1]]);

        let low_oxygen = classify_abnormal(&readings, Metric::Spo2);
        assert_eq!(low_oxygen, vec![&readings[2]]);
    }

    #[test]
    fn test_highlight_counts() {
        let readings = vec![vital(0, 98.6, 55.0, 98.0), vital(1, 98.6, 72.0, 98.0)];

        let hr = highlight(&readings, Metric::HeartRate);
        assert_eq!(hr, Highlight { metric: Metric::HeartRate, total: 2, abnormal: 1 });
        assert!(hr.has_abnormal());

        let scores = highlight(&readings, Metric::Score);
        assert_eq!(scores.total, 0);
        assert!(!scores.has_abnormal());
    }
}
