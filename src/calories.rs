//! Calorie estimation
//!
//! This module derives an energy-expenditure estimate from game scores:
//! score → kicks → per-kick duration → exercise duration → kcal, using
//! `kcal = MET × body weight (kg) × duration (h)`.

use crate::compare::baseline;
use crate::error::ComputeError;
use crate::types::{
    CalorieEstimate, ComparisonMode, ComparisonResult, DailyCalories, ScoreDaySummary,
    ScoreReading, SessionCalories,
};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Game points per kick
pub const SCORE_PER_KICK: f64 = 10.0;

/// Per-kick duration used when there are no kicks to divide the timer by
pub const ZERO_KICK_DURATION_SECONDS: f64 = 1.0;

const SECONDS_PER_HOUR: f64 = 3600.0;

pub const BODY_WEIGHT_RANGE_KG: RangeInclusive<f64> = 20.0..=200.0;
pub const TIMER_WINDOW_RANGE_SECONDS: RangeInclusive<f64> = 10.0..=1000.0;
pub const MET_RANGE: RangeInclusive<f64> = 0.0..=10.0;

/// Caller-supplied inputs of the calorie estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalorieParams {
    pub body_weight_kg: f64,
    /// Time window the kicks of a session are spread over (seconds)
    pub timer_window_seconds: f64,
    /// Metabolic equivalent of the exercise
    pub met: f64,
}

impl Default for CalorieParams {
    fn default() -> Self {
        Self {
            body_weight_kg: 70.0,
            timer_window_seconds: 15.0,
            met: 3.5,
        }
    }
}

impl CalorieParams {
    /// Validated constructor
    pub fn new(
        body_weight_kg: f64,
        timer_window_seconds: f64,
        met: f64,
    ) -> Result<Self, ComputeError> {
        let params = Self {
            body_weight_kg,
            timer_window_seconds,
            met,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        check_range("body weight (kg)", self.body_weight_kg, &BODY_WEIGHT_RANGE_KG)?;
        check_range("timer window (s)", self.timer_window_seconds, &TIMER_WINDOW_RANGE_SECONDS)?;
        check_range("MET", self.met, &MET_RANGE)
    }
}

fn check_range(name: &str, value: f64, range: &RangeInclusive<f64>) -> Result<(), ComputeError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ComputeError::InvalidConfig(format!(
            "{} must be within {}..={}, got {}",
            name,
            range.start(),
            range.end(),
            value
        )))
    }
}

pub fn kicks(score: f64) -> f64 {
    score / SCORE_PER_KICK
}

/// Timer window divided by the kicks, or [`ZERO_KICK_DURATION_SECONDS`] when
/// there are no kicks
pub fn kick_duration_seconds(timer_window_seconds: f64, kicks: f64) -> f64 {
    if kicks > 0.0 {
        timer_window_seconds / kicks
    } else {
        ZERO_KICK_DURATION_SECONDS
    }
}

fn duration_hours(kicks: f64, kick_duration_seconds: f64) -> f64 {
    kicks * kick_duration_seconds / SECONDS_PER_HOUR
}

fn calories(met: f64, body_weight_kg: f64, duration_hours: f64) -> f64 {
    met * body_weight_kg * duration_hours
}

/// Estimate the calories burned for one score
pub fn estimate_calories(
    score: f64,
    timer_window_seconds: f64,
    met: f64,
    body_weight_kg: f64,
) -> CalorieEstimate {
    let kicks = kicks(score);
    let kick_duration_seconds = kick_duration_seconds(timer_window_seconds, kicks);
    let duration_hours = duration_hours(kicks, kick_duration_seconds);

    CalorieEstimate {
        score,
        kicks,
        kick_duration_seconds,
        duration_hours,
        calories_burned: calories(met, body_weight_kg, duration_hours),
    }
}

/// [`estimate_calories`] with validated parameters
pub fn estimate_with(score: f64, params: &CalorieParams) -> CalorieEstimate {
    estimate_calories(score, params.timer_window_seconds, params.met, params.body_weight_kg)
}

/// Calories of the latest session against the baseline session.
///
/// The per-kick duration is derived once from the latest session's kicks and
/// reused for the baseline kicks (previous session's, or mean score / 10).
/// Returns `None` for an empty score table.
pub fn compare_calories(
    scores: &[ScoreReading],
    params: &CalorieParams,
    mode: ComparisonMode,
) -> Option<ComparisonResult> {
    let values: Vec<f64> = scores.iter().map(|s| s.score).collect();
    let latest = estimate_with(*values.last()?, params);

    let baseline_calories = baseline(&values, mode).map(|baseline_score| {
        let hours = duration_hours(kicks(baseline_score), latest.kick_duration_seconds);
        calories(params.met, params.body_weight_kg, hours)
    });

    Some(ComparisonResult::new(
        "Calories Burned",
        latest.calories_burned,
        baseline_calories,
    ))
}

/// Calories per date over a selection of daily score summaries.
///
/// A single per-kick duration, the timer window divided by the kicks of the
/// whole selection, is applied to every date; per-date durations are not
/// derived separately.
pub fn calories_by_date(days: &[ScoreDaySummary], params: &CalorieParams) -> Vec<DailyCalories> {
    let total_kicks: f64 = days.iter().map(|d| kicks(d.total_score)).sum();
    let shared_duration = kick_duration_seconds(params.timer_window_seconds, total_kicks);

    days.iter()
        .map(|day| {
            let total_kicks = kicks(day.total_score);
            let duration_hours = duration_hours(total_kicks, shared_duration);
            DailyCalories {
                date: day.date,
                total_score: day.total_score,
                total_kicks,
                duration_hours,
                calories_burned: calories(params.met, params.body_weight_kg, duration_hours),
            }
        })
        .collect()
}

/// Per-session calorie series, in table order
pub fn calories_per_session(
    scores: &[ScoreReading],
    params: &CalorieParams,
) -> Vec<SessionCalories> {
    scores
        .iter()
        .map(|reading| {
            let estimate = estimate_with(reading.score, params);
            SessionCalories {
                date: reading.date,
                time: reading.time,
                score: reading.score,
                kicks: estimate.kicks,
                duration_hours: estimate.duration_hours,
                calories_burned: estimate.calories_burned,
            }
        })
        .collect()
}
