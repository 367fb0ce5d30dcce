//! Baseline reproduction-number series
//!
//! The baseline comes from an external headerless table when one is present
//! and parseable. Otherwise it is synthesized from a closed-form curve. A
//! missing file and a malformed file take the same fallback path.

use crate::config::BaselineConfig;
use crate::error::ReportError;
use crate::timeline::DateAxis;
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};

/// Where the baseline in use came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaselineSource {
    File(PathBuf),
    Synthetic,
}

/// Baseline series aligned to a date axis
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub values: Vec<f64>,
    pub source: BaselineSource,
}

impl Baseline {
    /// Load from `config.source`, falling back to the synthetic curve on any error
    pub fn resolve(config: &BaselineConfig, axis: &DateAxis, intervention_idx: usize) -> Self {
        match load_table_median(&config.source, config.median_columns) {
            Ok(medians) => {
                log::info!(
                    "  Baseline: {} rows from {}",
                    medians.len(),
                    config.source.display()
                );
                Self {
                    values: fit_to_length(medians, axis.len()),
                    source: BaselineSource::File(config.source.clone()),
                }
            }
            Err(e) => {
                log::debug!("Baseline source rejected: {}", e);
                log::info!("  Baseline: synthetic");
                Self {
                    values: synthetic_baseline(config, axis.len(), intervention_idx),
                    source: BaselineSource::Synthetic,
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Closed-form baseline: exponential decay from the intervention onward,
/// sinusoidal wobble before it
pub fn synthetic_baseline(config: &BaselineConfig, len: usize, intervention_idx: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            if i >= intervention_idx {
                config.level * (-config.decay_rate * (i - intervention_idx) as f64).exp()
            } else {
                config.level + config.oscillation_amplitude * (i as f64 / config.oscillation_period).sin()
            }
        })
        .collect()
}

/// Row-wise median over the first `columns` cells of a headerless table.
///
/// The first row fixes the table width. Shorter rows are padded with missing
/// cells; a wider row is an error. Empty cells count as missing and are
/// skipped. Any other non-numeric cell, a row with no values, or an empty
/// table is an error.
pub fn load_table_median(path: &Path, columns: usize) -> Result<Vec<f64>, ReportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| ReportError::BaselineUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let mut medians = Vec::new();
    let mut width = None;
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|source| ReportError::BaselineUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let expected = *width.get_or_insert(record.len());
        if record.len() > expected {
            return Err(ReportError::malformed(
                path,
                row,
                format!("{} fields, first row has {}", record.len(), expected),
            ));
        }

        let mut values = Vec::with_capacity(columns);
        for cell in record.iter().take(columns) {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let value: f64 = cell.parse().map_err(|_| {
                ReportError::malformed(path, row, format!("non-numeric cell '{}'", cell))
            })?;
            if !value.is_nan() {
                values.push(value);
            }
        }

        let m = median(&mut values)
            .ok_or_else(|| ReportError::malformed(path, row, "no numeric values"))?;
        medians.push(m);
    }

    if medians.is_empty() {
        return Err(ReportError::malformed(path, 0, "no data rows"));
    }
    Ok(medians)
}

/// Median; mean of the two middle values for even counts
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Truncate, or repeat the last value, until the series has `len` entries
pub fn fit_to_length(mut values: Vec<f64>, len: usize) -> Vec<f64> {
    if let Some(&last) = values.last() {
        values.resize(len, last);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn axis() -> DateAxis {
        DateAxis::new(
            NaiveDate::from_ymd_opt(2019, 12, 15).unwrap(),
            NaiveDate::from_ymd_opt(2020, 2, 5).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_synthetic_formula() {
        let config = BaselineConfig::default();
        let values = synthetic_baseline(&config, 53, 39);
        assert_eq!(values.len(), 53);
        assert_eq!(values[0], 2.5);
        assert_relative_eq!(values[10], 2.5 + 0.3 * 1.0f64.sin(), epsilon = 1e-12);
        assert_eq!(values[39], 2.5);
        assert_relative_eq!(values[49], 2.5 * (-0.2f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn test_fit_to_length() {
        assert_eq!(fit_to_length(vec![1.0, 2.0, 3.0], 2), vec![1.0, 2.0]);
        assert_eq!(fit_to_length(vec![1.0, 2.0], 4), vec![1.0, 2.0, 2.0, 2.0]);
        assert!(fit_to_length(vec![], 4).is_empty());
    }

    #[test]
    fn test_load_uses_first_ten_columns() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("r0.csv");
        // Columns 11 and 12 are large and must be ignored
        std::fs::write(
            &path,
            "1,2,3,4,5,6,7,8,9,10,100,200\n2,2,2,2,2,2,2,2,2,2,900,900\n",
        )
        .unwrap();

        let medians = load_table_median(&path, 10).unwrap();
        assert_eq!(medians, vec![5.5, 2.0]);
    }

    #[test]
    fn test_load_skips_empty_cells() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("r0.csv");
        std::fs::write(&path, "1.0,,3.0\n2.0,4.0\n").unwrap();

        assert_eq!(load_table_median(&path, 10).unwrap(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_load_rejects_row_wider_than_first() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("r0.csv");
        std::fs::write(&path, "1.0,2.0\n1.0,2.0,3.0\n").unwrap();

        assert!(matches!(
            load_table_median(&path, 10),
            Err(ReportError::BaselineMalformed { row: 1, .. })
        ));
    }

    #[test]
    fn test_load_rejects_malformed() {
        let tmp = TempDir::new().unwrap();

        let bad = tmp.path().join("bad.csv");
        std::fs::write(&bad, "1.0,abc\n").unwrap();
        assert!(matches!(
            load_table_median(&bad, 10),
            Err(ReportError::BaselineMalformed { row: 0, .. })
        ));

        let empty = tmp.path().join("empty.csv");
        std::fs::write(&empty, "").unwrap();
        assert!(load_table_median(&empty, 10).is_err());

        let missing = tmp.path().join("missing.csv");
        assert!(matches!(
            load_table_median(&missing, 10),
            Err(ReportError::BaselineUnreadable { .. })
        ));
    }

    #[test]
    fn test_resolve_from_file_extends_tail() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("r0.csv");
        std::fs::write(&path, "2.0,3.0,4.0\n1.5,1.5,1.5\n").unwrap();

        let config = BaselineConfig {
            source: path.clone(),
            ..BaselineConfig::default()
        };
        let baseline = Baseline::resolve(&config, &axis(), 39);
        assert_eq!(baseline.source, BaselineSource::File(path));
        assert_eq!(baseline.len(), 53);
        assert_eq!(baseline.values[0], 3.0);
        assert!(baseline.values[1..].iter().all(|&v| v == 1.5));
    }

    #[test]
    fn test_resolve_falls_back() {
        let tmp = TempDir::new().unwrap();
        let expected = synthetic_baseline(&BaselineConfig::default(), 53, 39);

        let config = BaselineConfig {
            source: tmp.path().join("does_not_exist.csv"),
            ..BaselineConfig::default()
        };
        let baseline = Baseline::resolve(&config, &axis(), 39);
        assert_eq!(baseline.source, BaselineSource::Synthetic);
        assert_eq!(baseline.values, expected);

        let bad = tmp.path().join("bad.csv");
        std::fs::write(&bad, "x,y,z\n").unwrap();
        let config = BaselineConfig {
            source: bad,
            ..BaselineConfig::default()
        };
        assert_eq!(Baseline::resolve(&config, &axis(), 39).values, expected);
    }
}
