//! Dashboard orchestration
//!
//! This module provides the public API the presentation layer calls. Each view
//! of the dashboard maps to one method; every method loads (or reuses) the
//! memoized tables and runs the matching engine stage.

use crate::aggregate::{daily_stats, score_summary_by_date, summarize_selection};
use crate::calories::{self, calories_per_session, compare_calories, CalorieParams};
use crate::classify::{highlight, Highlight};
use crate::compare::compare_latest;
use crate::config::DashboardConfig;
use crate::error::ComputeError;
use crate::filter::{distinct_dates, ReadingFilter};
use crate::loader::{DataLoader, LoadDiagnostic, Table};
use crate::source::SourceHandle;
use crate::types::{
    AggregateRow, ComparisonMode, ComparisonResult, DailyCalories, Metric, ScoreDaySummary,
    ScoreReading, SessionCalories, SummaryMode, VitalReading,
};
use chrono::NaiveDate;
use std::sync::Arc;

/// Caller-controlled settings of the derived views
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashboardSettings {
    pub calories: CalorieParams,
    pub comparison_mode: ComparisonMode,
    pub summary_mode: SummaryMode,
}

impl From<&DashboardConfig> for DashboardSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            calories: config.calories,
            comparison_mode: config.comparison_mode,
            summary_mode: config.summary_mode,
        }
    }
}

/// Stateful processor behind the dashboard views.
///
/// The loader may be shared between processors; tables are cached per source
/// and range, so processors reading the same sheet share one fetch.
pub struct DashboardProcessor {
    loader: Arc<DataLoader>,
    vitals: SourceHandle,
    scores: SourceHandle,
    settings: DashboardSettings,
}

impl DashboardProcessor {
    pub fn new(
        loader: Arc<DataLoader>,
        vitals: SourceHandle,
        scores: SourceHandle,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            loader,
            vitals,
            scores,
            settings,
        }
    }

    /// Build a processor with a fresh loader from a validated configuration
    pub fn from_config(config: &DashboardConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self::new(
            Arc::new(DataLoader::new()),
            config.vitals_handle()?,
            config.scores_handle()?,
            DashboardSettings::from(config),
        ))
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn vitals(&self) -> Table<VitalReading> {
        self.loader.load_vitals(&self.vitals)
    }

    pub fn scores(&self) -> Table<ScoreReading> {
        self.loader.load_scores(&self.scores)
    }

    /// Latest vitals, score, and calories against their baselines
    pub fn latest_metrics(&self) -> Vec<ComparisonResult> {
        let mode = self.settings.comparison_mode;
        let vitals = self.vitals();
        let scores = self.scores();

        let mut results = compare_latest(&vitals, &Metric::VITALS, mode);
        results.extend(compare_latest(&scores, &[Metric::Score], mode));
        results.extend(compare_calories(&scores, &self.settings.calories, mode));
        results
    }

    /// Dates present in the vitals table, ascending
    pub fn vital_dates(&self) -> Vec<NaiveDate> {
        distinct_dates(&self.vitals())
    }

    /// Dates present in the score log, ascending
    pub fn score_dates(&self) -> Vec<NaiveDate> {
        distinct_dates(&self.scores())
    }

    /// One summary row per vital metric over the selected dates: SpO2,
    /// temperature, then heart rate
    pub fn selection_summary(&self, dates: &[NaiveDate], mode: SummaryMode) -> Vec<AggregateRow> {
        summarize_selection(&self.vitals(), dates, &Metric::SUMMARY_ORDER, mode)
    }

    /// Per-date statistics of every vital metric
    pub fn daily_vital_stats(&self) -> Vec<AggregateRow> {
        daily_stats(&self.vitals(), &Metric::VITALS)
    }

    /// Score totals of the selected dates
    pub fn score_days(&self, dates: &[NaiveDate]) -> Vec<ScoreDaySummary> {
        let selected: Vec<ScoreReading> = ReadingFilter::default()
            .with_dates(dates.iter().copied())
            .apply(&self.scores());
        score_summary_by_date(&selected)
    }

    /// Calories per selected date, sharing one per-kick duration
    pub fn calories_by_date(&self, dates: &[NaiveDate]) -> Vec<DailyCalories> {
        calories::calories_by_date(&self.score_days(dates), &self.settings.calories)
    }

    /// Calories of every session, in log order
    pub fn calorie_series(&self) -> Vec<SessionCalories> {
        calories_per_session(&self.scores(), &self.settings.calories)
    }

    /// Vital readings passing `filter`, in table order
    pub fn readings(&self, filter: &ReadingFilter) -> Vec<VitalReading> {
        filter.apply(&self.vitals())
    }

    /// Abnormal-reading counts per vital metric over the filtered readings
    pub fn highlights(&self, filter: &ReadingFilter) -> Vec<Highlight> {
        let readings = self.readings(filter);
        Metric::VITALS
            .iter()
            .map(|metric| highlight(&readings, *metric))
            .collect()
    }

    /// Drop the cached tables; the next view re-fetches them
    pub fn refresh(&self) {
        self.loader.refresh();
    }

    pub fn take_diagnostics(&self) -> Vec<LoadDiagnostic> {
        self.loader.take_diagnostics()
    }
}
