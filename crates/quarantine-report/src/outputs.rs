//! Output contract structures and writers

use crate::error::ReportError;
use crate::scenario::Scenario;
use crate::timeline::DateAxis;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Output directory contract
#[derive(Debug, Clone)]
pub struct OutputContract {
    /// Base output directory
    pub base_dir: PathBuf,
    /// Shared stem of the figure files
    pub file_stem: String,
}

impl OutputContract {
    /// Create output contract and ensure the directory exists
    pub fn new(base_dir: &Path, file_stem: &str) -> Result<Self> {
        fs::create_dir_all(base_dir)
            .with_context(|| format!("Failed to create directory: {}", base_dir.display()))?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            file_stem: file_stem.to_string(),
        })
    }

    // Path accessors
    pub fn vector_figure(&self) -> PathBuf {
        self.base_dir.join(format!("{}.svg", self.file_stem))
    }

    pub fn raster_figure(&self) -> PathBuf {
        self.base_dir.join(format!("{}.png", self.file_stem))
    }

    pub fn scenarios_csv(&self) -> PathBuf {
        self.base_dir.join("quarantine_scenarios.csv")
    }
}

/// One CSV row: a single day of a single scenario
#[derive(Debug, Serialize)]
struct ScenarioRow<'a> {
    date: String,
    scenario: &'a str,
    reduction: f64,
    reproduction: f64,
    daily_incidence: f64,
    prevalence: f64,
}

/// Write every scenario's derived series in long format
///
/// Every series must cover the whole axis; nothing is written otherwise.
pub fn write_scenarios_csv(path: &Path, axis: &DateAxis, scenarios: &[Scenario]) -> Result<()> {
    for scenario in scenarios {
        let lengths = [
            scenario.reproduction.len(),
            scenario.daily_incidence.len(),
            scenario.prevalence.len(),
        ];
        if let Some(&actual) = lengths.iter().find(|&&n| n != axis.len()) {
            return Err(ReportError::LengthMismatch {
                expected: axis.len(),
                actual,
            })
            .with_context(|| format!("Scenario {} does not span the date axis", scenario.label));
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for scenario in scenarios {
        for (i, date) in axis.dates().iter().enumerate() {
            writer.serialize(ScenarioRow {
                date: date.format("%Y-%m-%d").to_string(),
                scenario: &scenario.label,
                reduction: scenario.reduction,
                reproduction: scenario.reproduction[i],
                daily_incidence: scenario.daily_incidence[i],
                prevalence: scenario.prevalence[i],
            })?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelParams, ScenarioSpec};
    use crate::scenario::ScenarioGenerator;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_contract_paths() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("plots").join("nested");
        let contract = OutputContract::new(&base, "quarantine_effect_quick").unwrap();

        assert!(base.is_dir());
        assert_eq!(contract.vector_figure(), base.join("quarantine_effect_quick.svg"));
        assert_eq!(contract.raster_figure(), base.join("quarantine_effect_quick.png"));
    }

    #[test]
    fn test_scenarios_csv() {
        let tmp = TempDir::new().unwrap();
        let axis = DateAxis::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 3).unwrap(),
        )
        .unwrap();
        let baseline = vec![2.0; 3];
        let scenarios = ScenarioGenerator::new(&baseline, Some(1), ModelParams::default())
            .generate_all(&ScenarioSpec::defaults()[..2], 3)
            .unwrap();

        let path = tmp.path().join("scenarios.csv");
        write_scenarios_csv(&path, &axis, &scenarios).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "date,scenario,reduction,reproduction,daily_incidence,prevalence"
        );
        assert_eq!(lines.len(), 1 + 2 * 3);
        assert!(lines[1].starts_with("2020-01-01,0%,0.0,2.0,1.0,0.1"));
        assert!(lines[5].starts_with("2020-01-02,30%,0.3,"));
    }

    #[test]
    fn test_scenarios_csv_rejects_short_series() {
        let tmp = TempDir::new().unwrap();
        let axis = DateAxis::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 3).unwrap(),
        )
        .unwrap();
        let baseline = vec![2.0; 3];
        let mut scenarios = ScenarioGenerator::new(&baseline, Some(1), ModelParams::default())
            .generate_all(&ScenarioSpec::defaults()[..1], 3)
            .unwrap();
        scenarios[0].prevalence.pop();

        let path = tmp.path().join("scenarios.csv");
        let err = write_scenarios_csv(&path, &axis, &scenarios).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::LengthMismatch { expected: 3, actual: 2 })
        ));
        assert!(!path.exists());
    }
}
