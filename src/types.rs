//! Core types for the Rehab Flux engine
//!
//! This module defines the data structures that flow through each stage of the
//! engine: cleaned readings from the loader, and the comparison, aggregate, and
//! calorie outputs handed to the presentation layer.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used by the source sheets (`DD-MM-YYYY`)
pub const SHEET_DATE_FORMAT: &str = "%d-%m-%Y";

/// Time format used by the source sheets (`HH:MM:SS`)
pub const SHEET_TIME_FORMAT: &str = "%H:%M:%S";

/// Numeric column tracked by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    HeartRate,
    Spo2,
    Score,
}

impl Metric {
    /// The vitals columns, in dashboard order
    pub const VITALS: [Metric; 3] = [Metric::Temperature, Metric::HeartRate, Metric::Spo2];

    /// The vitals in the order of the selection summary table
    pub const SUMMARY_ORDER: [Metric; 3] = [Metric::Spo2, Metric::Temperature, Metric::HeartRate];

    /// Header name of this metric's column in the source sheet
    pub fn column_name(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::HeartRate => "Heart Rate",
            Metric::Spo2 => "SpO2",
            Metric::Score => "Score",
        }
    }

    /// Display unit of this metric's values
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Temperature => "°F",
            Metric::HeartRate => "bpm",
            Metric::Spo2 => "%",
            Metric::Score => "pts",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Common view over a loaded table row
pub trait Reading {
    fn date(&self) -> NaiveDate;
    fn timestamp(&self) -> NaiveDateTime;
    /// Value of `metric` for this row, `None` if the row does not carry it
    fn value(&self, metric: Metric) -> Option<f64>;

    fn hour(&self) -> u32 {
        self.timestamp().hour()
    }
}

/// One row of the vitals sheet after cleaning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalReading {
    #[serde(with = "sheet_date")]
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Body temperature (°F)
    pub temperature: f64,
    /// Heart rate (bpm)
    pub heart_rate: f64,
    /// Oxygen saturation (percentage, 0-100)
    pub spo2: f64,
    /// `date` combined with `time`
    pub timestamp: NaiveDateTime,
}

impl VitalReading {
    pub fn new(
        date: NaiveDate,
        time: NaiveTime,
        temperature: f64,
        heart_rate: f64,
        spo2: f64,
    ) -> Self {
        Self {
            date,
            time,
            temperature,
            heart_rate,
            spo2,
            timestamp: date.and_time(time),
        }
    }
}

impl Reading for VitalReading {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => Some(self.temperature),
            Metric::HeartRate => Some(self.heart_rate),
            Metric::Spo2 => Some(self.spo2),
            Metric::Score => None,
        }
    }
}

/// One row of the game score log after cleaning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReading {
    #[serde(with = "sheet_date")]
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub score: f64,
    pub timestamp: NaiveDateTime,
}

impl ScoreReading {
    pub fn new(date: NaiveDate, time: NaiveTime, score: f64) -> Self {
        Self {
            date,
            time,
            score,
            timestamp: date.and_time(time),
        }
    }
}

impl Reading for ScoreReading {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Score => Some(self.score),
            _ => None,
        }
    }
}

/// Reference used for the latest-reading delta
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// Second-to-last row in table order
    #[default]
    PreviousReading,
    /// Arithmetic mean of the whole column
    MeanValue,
}

/// Latest value of a metric against its baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub metric_name: String,
    pub latest_value: f64,
    /// `None` when the table holds too little history for the requested mode
    pub baseline_value: Option<f64>,
    /// `latest_value - baseline_value`, `None` alongside a missing baseline
    pub delta_value: Option<f64>,
}

impl ComparisonResult {
    pub fn new(
        metric_name: impl Into<String>,
        latest_value: f64,
        baseline_value: Option<f64>,
    ) -> Self {
        Self {
            metric_name: metric_name.into(),
            latest_value,
            baseline_value,
            delta_value: baseline_value.map(|base| latest_value - base),
        }
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline_value.is_some()
    }
}

/// How a multi-date selection is summarized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMode {
    /// Summarize each date, then combine the per-date statistics
    /// (mean of means, median of medians, max of maxes, min of mins)
    #[default]
    PerDateAggregates,
    /// Recompute every statistic from the raw rows of the whole selection
    Recompute,
}

/// Descriptive statistics of one metric over one group of rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// Group label (e.g. `01-02-2024`); `None` for a whole-selection summary
    pub group: Option<String>,
    pub metric: Metric,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    pub min: f64,
}

/// Score totals for a single calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDaySummary {
    #[serde(with = "sheet_date")]
    pub date: NaiveDate,
    pub sessions: usize,
    pub total_score: f64,
    pub average_score: f64,
    pub min_score: f64,
    pub max_score: f64,
}

/// Calorie estimate derived from a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieEstimate {
    pub score: f64,
    /// `score / 10`
    pub kicks: f64,
    pub kick_duration_seconds: f64,
    pub duration_hours: f64,
    /// Energy expenditure (kcal)
    pub calories_burned: f64,
}

/// Calorie estimate for one date of a multi-date selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCalories {
    #[serde(with = "sheet_date")]
    pub date: NaiveDate,
    pub total_score: f64,
    pub total_kicks: f64,
    pub duration_hours: f64,
    pub calories_burned: f64,
}

/// Calorie estimate for a single game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCalories {
    #[serde(with = "sheet_date")]
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub score: f64,
    pub kicks: f64,
    pub duration_hours: f64,
    pub calories_burned: f64,
}

/// Calendar date ordered chronologically and displayed in sheet format
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(pub NaiveDate);

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SHEET_DATE_FORMAT))
    }
}

/// Serde helpers for `DD-MM-YYYY` dates
pub mod sheet_date {
    use super::SHEET_DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(SHEET_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(raw.trim(), SHEET_DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
