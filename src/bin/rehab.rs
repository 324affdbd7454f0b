//! Rehab CLI - Command-line front end for the Rehab Flux dashboard engine
//!
//! Commands:
//! - metrics: Latest vitals, score, and calories against their baselines
//! - summary: One summary row per vital over the selected dates
//! - stats: Per-date statistics of every vital
//! - scores: Per-date score totals
//! - calories: Calories per date or per session
//! - readings: Filtered vital readings and abnormal-reading highlights
//! - doctor: Diagnose configuration and source health

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rehab_flux::config::{DashboardConfig, SourceConfig};
use rehab_flux::filter::ReadingFilter;
use rehab_flux::loader::LoadDiagnostic;
use rehab_flux::pipeline::DashboardProcessor;
use rehab_flux::types::{
    AggregateRow, ComparisonMode, ComparisonResult, DailyCalories, Metric, ScoreDaySummary,
    SessionCalories, SummaryMode, VitalReading, SHEET_DATE_FORMAT,
};
use rehab_flux::{to_csv, ComputeError, Highlight, ReportEncoder, PKG_VERSION, PRODUCER_NAME};

/// Rehab - Derived metrics for a rehabilitation monitoring dashboard
#[derive(Parser)]
#[command(name = "rehab")]
#[command(version = PKG_VERSION)]
#[command(
    about = "Compute rehabilitation dashboard views from vitals and game scores",
    long_about = None
)]
struct Cli {
    /// Dashboard configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read vitals from a CSV file instead of the configured source
    #[arg(long, global = true)]
    vitals_csv: Option<PathBuf>,

    /// Read game scores from a CSV file instead of the configured source
    #[arg(long, global = true)]
    scores_csv: Option<PathBuf>,

    /// Output format (defaults to text on a terminal, JSON otherwise)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Baseline for latest-value deltas
    #[arg(long, global = true, value_enum)]
    comparison: Option<ComparisonArg>,

    /// Body weight in kg
    #[arg(long, global = true)]
    weight: Option<f64>,

    /// Timer window in seconds
    #[arg(long, global = true)]
    timer: Option<f64>,

    /// Metabolic equivalent of the exercise
    #[arg(long, global = true)]
    met: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Latest vitals, score, and calories against their baselines
    Metrics,

    /// One summary row per vital over the selected dates
    Summary {
        /// Date to include (DD-MM-YYYY); repeat for several, all dates when omitted
        #[arg(long = "date", value_parser = parse_date)]
        dates: Vec<NaiveDate>,

        /// Recompute from the raw rows instead of combining per-date statistics
        #[arg(long)]
        recompute: bool,
    },

    /// Per-date statistics of every vital
    Stats,

    /// Per-date score totals
    Scores {
        /// Date to include (DD-MM-YYYY); repeat for several, all dates when omitted
        #[arg(long = "date", value_parser = parse_date)]
        dates: Vec<NaiveDate>,
    },

    /// Calories per date, or per session with --per-session
    Calories {
        /// Date to include (DD-MM-YYYY); repeat for several, all dates when omitted
        #[arg(long = "date", value_parser = parse_date)]
        dates: Vec<NaiveDate>,

        /// One row per game session instead of per date
        #[arg(long)]
        per_session: bool,
    },

    /// Vital readings filtered by date and hour of day
    Readings {
        /// Date to include (DD-MM-YYYY); repeat for several, all dates when omitted
        #[arg(long = "date", value_parser = parse_date)]
        dates: Vec<NaiveDate>,

        /// First hour of day to include
        #[arg(long, default_value = "0")]
        start_hour: u32,

        /// Last hour of day to include
        #[arg(long, default_value = "24")]
        end_hour: u32,

        /// Print abnormal-reading counts instead of the readings
        #[arg(long)]
        highlights: bool,
    },

    /// Diagnose configuration and source health
    Doctor,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Aligned plain-text tables
    Text,
    /// Pretty-printed JSON report envelope
    Json,
    /// CSV rows with a header line
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
enum ComparisonArg {
    /// Previous reading
    Previous,
    /// Mean of the whole column
    Mean,
}

impl From<ComparisonArg> for ComparisonMode {
    fn from(arg: ComparisonArg) -> Self {
        match arg {
            ComparisonArg::Previous => ComparisonMode::PreviousReading,
            ComparisonArg::Mean => ComparisonMode::MeanValue,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), RehabCliError> {
    let format = cli.format.unwrap_or_else(|| {
        if atty::is(atty::Stream::Stdout) {
            OutputFormat::Text
        } else {
            OutputFormat::Json
        }
    });

    if let Commands::Doctor = cli.command {
        return cmd_doctor(&cli, format);
    }

    let config = build_config(&cli)?;
    let processor = DashboardProcessor::from_config(&config)?;
    let output = Output::new(format);

    match cli.command {
        Commands::Metrics => {
            output.emit("latest_metrics", &processor.latest_metrics(), render_metrics)
        }

        Commands::Summary { dates, recompute } => {
            let dates = or_all(dates, || processor.vital_dates());
            let mode = if recompute {
                SummaryMode::Recompute
            } else {
                config.summary_mode
            };
            output.emit(
                "selection_summary",
                &processor.selection_summary(&dates, mode),
                render_aggregates,
            )
        }

        Commands::Stats => output.emit(
            "daily_vital_stats",
            &processor.daily_vital_stats(),
            render_aggregates,
        ),

        Commands::Scores { dates } => {
            let dates = or_all(dates, || processor.score_dates());
            output.emit("score_days", &processor.score_days(&dates), render_score_days)
        }

        Commands::Calories { dates, per_session } => {
            if per_session {
                output.emit("calorie_series", &processor.calorie_series(), render_sessions)
            } else {
                let dates = or_all(dates, || processor.score_dates());
                output.emit(
                    "calories_by_date",
                    &processor.calories_by_date(&dates),
                    render_daily_calories,
                )
            }
        }

        Commands::Readings {
            dates,
            start_hour,
            end_hour,
            highlights,
        } => {
            let mut filter = ReadingFilter::default().with_hours(start_hour, end_hour);
            if !dates.is_empty() {
                filter = filter.with_dates(dates);
            }
            if highlights {
                output.emit("highlights", &processor.highlights(&filter), render_highlights)
            } else {
                output.emit("readings", &processor.readings(&filter), render_readings)
            }
        }

        Commands::Doctor => Ok(()),
    }
}

fn build_config(cli: &Cli) -> Result<DashboardConfig, RehabCliError> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };

    if let Some(path) = &cli.vitals_csv {
        config.vitals = Some(SourceConfig::Csv { path: path.clone() });
    }
    if let Some(path) = &cli.scores_csv {
        config.scores = Some(SourceConfig::Csv { path: path.clone() });
    }
    if let Some(mode) = cli.comparison {
        config.comparison_mode = mode.into();
    }
    if let Some(weight) = cli.weight {
        config.calories.body_weight_kg = weight;
    }
    if let Some(timer) = cli.timer {
        config.calories.timer_window_seconds = timer;
    }
    if let Some(met) = cli.met {
        config.calories.met = met;
    }

    config.validate()?;
    Ok(config)
}

fn or_all(dates: Vec<NaiveDate>, all: impl FnOnce() -> Vec<NaiveDate>) -> Vec<NaiveDate> {
    if dates.is_empty() {
        all()
    } else {
        dates
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), SHEET_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d"))
        .map_err(|_| format!("expected DD-MM-YYYY, got '{}'", raw))
}

// Output

struct Output {
    format: OutputFormat,
    encoder: ReportEncoder,
}

impl Output {
    fn new(format: OutputFormat) -> Self {
        Self {
            format,
            encoder: ReportEncoder::new(),
        }
    }

    fn emit<T: Serialize>(
        &self,
        report: &str,
        rows: &[T],
        render_text: fn(&[T]) -> String,
    ) -> Result<(), RehabCliError> {
        let rendered = match self.format {
            OutputFormat::Text => render_text(rows),
            OutputFormat::Json => self.encoder.encode_to_json(report, rows)? + "\n",
            OutputFormat::Csv => to_csv(rows)?,
        };
        print!("{}", rendered);
        Ok(())
    }
}

fn fmt_opt(value: Option<f64>, signed: bool) -> String {
    match value {
        Some(v) if signed => format!("{:+.2}", v),
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

fn render_metrics(rows: &[ComparisonResult]) -> String {
    if rows.is_empty() {
        return "No data available\n".to_string();
    }
    let mut out = format!("{:<16} {:>10} {:>10} {:>10}\n", "Metric", "Latest", "Baseline", "Delta");
    for row in rows {
        out += &format!(
            "{:<16} {:>10.2} {:>10} {:>10}\n",
            row.metric_name,
            row.latest_value,
            fmt_opt(row.baseline_value, false),
            fmt_opt(row.delta_value, true)
        );
    }
    out
}

fn render_aggregates(rows: &[AggregateRow]) -> String {
    if rows.is_empty() {
        return "No data available\n".to_string();
    }
    let mut out = format!(
        "{:<12} {:<12} {:<5} {:>6} {:>9} {:>9} {:>9} {:>9}\n",
        "Date", "Metric", "Unit", "Count", "Mean", "Median", "Max", "Min"
    );
    for row in rows {
        out += &format!(
            "{:<12} {:<12} {:<5} {:>6} {:>9.2} {:>9.2} {:>9.2} {:>9.2}\n",
            row.group.as_deref().unwrap_or("selection"),
            row.metric.to_string(),
            row.metric.unit(),
            row.count,
            row.mean,
            row.median,
            row.max,
            row.min
        );
    }
    out
}

fn render_score_days(rows: &[ScoreDaySummary]) -> String {
    if rows.is_empty() {
        return "No data available\n".to_string();
    }
    let mut out = format!(
        "{:<12} {:>8} {:>10} {:>10} {:>8} {:>8}\n",
        "Date", "Sessions", "Total", "Average", "Min", "Max"
    );
    for row in rows {
        out += &format!(
            "{:<12} {:>8} {:>10.1} {:>10.2} {:>8.1} {:>8.1}\n",
            row.date.format(SHEET_DATE_FORMAT).to_string(),
            row.sessions,
            row.total_score,
            row.average_score,
            row.min_score,
            row.max_score
        );
    }
    out
}

fn render_daily_calories(rows: &[DailyCalories]) -> String {
    if rows.is_empty() {
        return "No data available\n".to_string();
    }
    let mut out = format!("{:<12} {:>8} {:>12} {:>10}\n", "Date", "Kicks", "Hours", "kcal");
    for row in rows {
        out += &format!(
            "{:<12} {:>8.1} {:>12.5} {:>10.4}\n",
            row.date.format(SHEET_DATE_FORMAT).to_string(),
            row.total_kicks,
            row.duration_hours,
            row.calories_burned
        );
    }
    out
}

fn render_sessions(rows: &[SessionCalories]) -> String {
    if rows.is_empty() {
        return "No data available\n".to_string();
    }
    let mut out = format!(
        "{:<12} {:<10} {:>8} {:>8} {:>10}\n",
        "Date", "Time", "Score", "Kicks", "kcal"
    );
    for row in rows {
        out += &format!(
            "{:<12} {:<10} {:>8.1} {:>8.1} {:>10.4}\n",
            row.date.format(SHEET_DATE_FORMAT).to_string(),
            row.time.to_string(),
            row.score,
            row.kicks,
            row.calories_burned
        );
    }
    out
}

fn render_readings(rows: &[VitalReading]) -> String {
    if rows.is_empty() {
        return "No readings match the filter\n".to_string();
    }
    let cell = |metric: Metric, value: f64| {
        let flag = if metric.is_abnormal(value) { "!" } else { " " };
        format!("{:>8.1}{}", value, flag)
    };
    let mut out = format!(
        "{:<12} {:<10} {:>9} {:>9} {:>9}\n",
        "Date", "Time", "Temp", "HR", "SpO2"
    );
    for row in rows {
        out += &format!(
            "{:<12} {:<10} {} {} {}\n",
            row.date.format(SHEET_DATE_FORMAT).to_string(),
            row.time.to_string(),
            cell(Metric::Temperature, row.temperature),
            cell(Metric::HeartRate, row.heart_rate),
            cell(Metric::Spo2, row.spo2)
        );
    }
    out
}

fn render_highlights(rows: &[Highlight]) -> String {
    let mut out = String::new();
    for row in rows {
        let status = if row.has_abnormal() { "[WARN]" } else { "[OK]" };
        out += &format!(
            "  {} {}: {} of {} readings abnormal\n",
            status, row.metric, row.abnormal, row.total
        );
    }
    out
}

// Doctor

fn cmd_doctor(cli: &Cli, format: OutputFormat) -> Result<(), RehabCliError> {
    let mut checks = Vec::new();

    let config = match build_config(cli) {
        Ok(config) => {
            checks.push(DoctorCheck::ok(
                "config",
                match &cli.config {
                    Some(path) => format!("Loaded {}", path.display()),
                    None => "Using defaults".to_string(),
                },
            ));
            Some(config)
        }
        Err(e) => {
            checks.push(DoctorCheck::error("config", CliError::from(e).message));
            None
        }
    };

    if let Some(config) = &config {
        checks.push(source_check("vitals", config.vitals.as_ref()));
        checks.push(source_check("scores", config.scores.as_ref()));

        match DashboardProcessor::from_config(config) {
            Ok(processor) => {
                let vitals = processor.vitals().len();
                let scores = processor.scores().len();
                checks.extend(processor.take_diagnostics().iter().map(diagnostic_check));
                checks.push(DoctorCheck::ok(
                    "load",
                    format!("{} vital readings, {} game sessions", vitals, scores),
                ));
            }
            Err(e) => checks.push(DoctorCheck::error("load", e.to_string())),
        }
    }

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: PKG_VERSION.to_string(),
        checks,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Csv => print!("{}", to_csv(&report.checks)?),
        OutputFormat::Text => {
            println!("Rehab Doctor Report");
            println!("===================");
            println!("Producer: {}", report.producer);
            println!("Version:  {}", report.version);
            println!("\nChecks:");

            for check in &report.checks {
                let status_icon = match check.status {
                    CheckStatus::Ok => "[OK]",
                    CheckStatus::Warning => "[WARN]",
                    CheckStatus::Error => "[ERR]",
                };
                println!("  {} {}: {}", status_icon, check.name, check.message);
            }
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(RehabCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn source_check(dataset: &str, source: Option<&SourceConfig>) -> DoctorCheck {
    match source {
        None => DoctorCheck::error(dataset, format!("No {} source configured", dataset)),
        Some(SourceConfig::Csv { path }) => csv_check(dataset, path),
        Some(SourceConfig::Sheets { spreadsheet_id, .. }) => {
            DoctorCheck::ok(dataset, format!("Google Sheets {}", spreadsheet_id))
        }
    }
}

fn csv_check(dataset: &str, path: &Path) -> DoctorCheck {
    if path.exists() {
        DoctorCheck::ok(dataset, format!("CSV file {}", path.display()))
    } else {
        DoctorCheck::error(dataset, format!("CSV file {} does not exist", path.display()))
    }
}

fn diagnostic_check(diagnostic: &LoadDiagnostic) -> DoctorCheck {
    DoctorCheck {
        name: format!("{} load", diagnostic.dataset),
        status: CheckStatus::Warning,
        message: diagnostic.message.clone(),
    }
}

// Error types

#[derive(Debug)]
enum RehabCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    DoctorFailed,
}

impl From<io::Error> for RehabCliError {
    fn from(e: io::Error) -> Self {
        RehabCliError::Io(e)
    }
}

impl From<ComputeError> for RehabCliError {
    fn from(e: ComputeError) -> Self {
        RehabCliError::Compute(e)
    }
}

impl From<serde_json::Error> for RehabCliError {
    fn from(e: serde_json::Error) -> Self {
        RehabCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<RehabCliError> for CliError {
    fn from(e: RehabCliError) -> Self {
        match e {
            RehabCliError::Io(e) | RehabCliError::Compute(ComputeError::Io(e)) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            RehabCliError::Compute(e @ ComputeError::InvalidConfig(_)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'rehab doctor' to check the configuration".to_string()),
            },
            RehabCliError::Compute(ComputeError::JsonError(e)) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the configuration file syntax".to_string()),
            },
            RehabCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            RehabCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            RehabCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

impl DoctorCheck {
    fn ok(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message,
        }
    }

    fn error(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message,
        }
    }
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
