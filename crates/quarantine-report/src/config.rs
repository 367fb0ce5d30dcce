//! Configuration structures for the quarantine report

use crate::error::ReportError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main report configuration
///
/// Every field has a literal default; running with `ReportConfig::default()`
/// reproduces the reference figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// First date on the axis (inclusive)
    pub start_date: NaiveDate,

    /// Last date on the axis (inclusive)
    pub end_date: NaiveDate,

    /// Date marked as "Travel restrictions" on every panel
    pub travel_restriction_date: NaiveDate,

    /// Date from which reduction fractions apply
    pub quarantine_start_date: NaiveDate,

    /// Scenarios, in plotting order
    pub scenarios: Vec<ScenarioSpec>,

    /// Transmission model constants
    pub model: ModelParams,

    /// Baseline source options
    pub baseline: BaselineConfig,

    /// Figure layout options
    pub figure: FigureConfig,

    /// Output directory
    pub output_dir: PathBuf,

    /// File stem shared by the vector and raster artifacts
    pub file_stem: String,

    /// Also write the derived series to CSV
    pub export_csv: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let intervention = date(2020, 1, 23);
        Self {
            start_date: date(2019, 12, 15),
            end_date: date(2020, 2, 5),
            travel_restriction_date: intervention,
            quarantine_start_date: intervention,
            scenarios: ScenarioSpec::defaults(),
            model: ModelParams::default(),
            baseline: BaselineConfig::default(),
            figure: FigureConfig::default(),
            output_dir: PathBuf::from("plots"),
            file_stem: "quarantine_effect_quick".to_string(),
            export_csv: false,
        }
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    // Literal calendar dates only; all are valid.
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

impl ReportConfig {
    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Load configuration from a JSON file; missing fields take defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Validate the configuration before any output is produced
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.end_date < self.start_date {
            return Err(ReportError::config(format!(
                "end date {} precedes start date {}",
                self.end_date, self.start_date
            )));
        }
        for (name, d) in [
            ("quarantine start", self.quarantine_start_date),
            ("travel restriction", self.travel_restriction_date),
        ] {
            if d < self.start_date || d > self.end_date {
                return Err(ReportError::config(format!(
                    "{} date {} outside axis {}..={}",
                    name, d, self.start_date, self.end_date
                )));
            }
        }
        if self.scenarios.is_empty() {
            return Err(ReportError::config("at least one scenario is required"));
        }
        for s in &self.scenarios {
            if !(0.0..=1.0).contains(&s.reduction) {
                return Err(ReportError::config(format!(
                    "reduction {} for scenario '{}' must lie in [0, 1]",
                    s.reduction, s.label
                )));
            }
            if parse_hex_color(&s.color).is_none() {
                return Err(ReportError::config(format!(
                    "scenario '{}' has invalid colour '{}'",
                    s.label, s.color
                )));
            }
        }
        if !(self.model.generation_time > 0.0) {
            return Err(ReportError::config(format!(
                "generation time must be positive, got {}",
                self.model.generation_time
            )));
        }
        if self.baseline.median_columns == 0 {
            return Err(ReportError::config("median_columns must be at least 1"));
        }
        if self.file_stem.is_empty() {
            return Err(ReportError::config("file stem must not be empty"));
        }
        Ok(())
    }

    /// Reduction fractions in scenario order
    pub fn reductions(&self) -> Vec<f64> {
        self.scenarios.iter().map(|s| s.reduction).collect()
    }
}

/// One intervention-strength scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Fraction by which R is reduced after quarantine start (0.0-1.0)
    pub reduction: f64,
    /// Legend label, e.g. "30%"
    pub label: String,
    /// Line colour as "#RRGGBB"
    pub color: String,
}

impl ScenarioSpec {
    pub fn new(reduction: f64, label: &str, color: &str) -> Self {
        Self {
            reduction,
            label: label.to_string(),
            color: color.to_string(),
        }
    }

    /// 0/30/50/70% compliance; red, orange, yellow, green
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(0.0, "0%", "#FF4444"),
            Self::new(0.3, "30%", "#FF8800"),
            Self::new(0.5, "50%", "#FFAA00"),
            Self::new(0.7, "70%", "#00AA00"),
        ]
    }
}

/// Transmission model constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Mean generation time (days)
    pub generation_time: f64,
    /// Cumulative infections on the first day
    pub initial_cases: f64,
    /// Multiplier applied to the running sum of daily incidence
    pub prevalence_scale: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            generation_time: 5.2,
            initial_cases: 1.0,
            prevalence_scale: 0.1,
        }
    }
}

/// Baseline source and synthetic formula parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// Headerless numeric table; row-wise median becomes the baseline
    pub source: PathBuf,
    /// Leading columns included in the median
    pub median_columns: usize,
    /// Synthetic R level
    pub level: f64,
    /// Daily decay rate after the intervention
    pub decay_rate: f64,
    /// Oscillation amplitude before the intervention
    pub oscillation_amplitude: f64,
    /// Oscillation period divisor (sin(i / period))
    pub oscillation_period: f64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("out_R0.csv"),
            median_columns: 10,
            level: 2.5,
            decay_rate: 0.02,
            oscillation_amplitude: 0.3,
            oscillation_period: 10.0,
        }
    }
}

/// Figure layout options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// Canvas size in pixels (width, height)
    pub size: (u32, u32),
    /// Fixed upper bound of the R panel
    pub r_axis_max: f64,
    /// Spacing of x-axis ticks in days
    pub tick_interval_days: usize,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            size: (1000, 1200),
            r_axis_max: 8.0,
            tick_interval_days: 14,
        }
    }
}

/// Parse "#RRGGBB" into its channels
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
