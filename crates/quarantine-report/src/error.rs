//! Error types for the quarantine report.

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors raised before any figure is rendered.
///
/// Rendering and directory failures are not listed here; they travel as
/// `anyhow::Error` with context attached at the call site.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Configuration validation errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Baseline source could not be opened
    #[error("Baseline source {path} unreadable: {source}")]
    BaselineUnreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Baseline source opened but its contents are not usable
    #[error("Baseline source {path} malformed at row {row}: {message}")]
    BaselineMalformed {
        path: PathBuf,
        row: usize,
        message: String,
    },

    /// Series lengths disagree with the date axis
    #[error("Series length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

impl ReportError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ReportError::ConfigError(message.into())
    }

    /// Creates a malformed-baseline error.
    pub fn malformed(path: impl Into<PathBuf>, row: usize, message: impl Into<String>) -> Self {
        ReportError::BaselineMalformed {
            path: path.into(),
            row,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ReportError::config("reversed date axis");
        assert_eq!(err.to_string(), "Configuration error: reversed date axis");

        let err = ReportError::malformed("out_R0.csv", 3, "non-numeric cell 'x'");
        assert!(err.to_string().contains("row 3"));
        assert!(err.to_string().contains("out_R0.csv"));

        let err = ReportError::LengthMismatch { expected: 53, actual: 2 };
        assert_eq!(err.to_string(), "Series length mismatch: expected 53, got 2");
    }
}
