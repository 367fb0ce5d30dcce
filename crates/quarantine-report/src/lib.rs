//! Quarantine Effect Report Generator
//!
//! Static three-panel figure showing how quarantine compliance levels would
//! change an epidemic's reproduction number, daily incidence and prevalence.
//!
//! # Pipeline
//!
//! - Daily date axis between two literal dates
//! - Baseline R(t): row-wise median of an external table, or a synthetic curve
//! - One scenario per reduction fraction (0%, 30%, 50%, 70%)
//! - Exponential-growth recurrence for incidence, scaled running sum for prevalence
//! - SVG and PNG figures in `plots/`
//!
//! # CLI Contract
//!
//! ```bash
//! quarantine-report [--config cfg.json] [--baseline out_R0.csv] [--out plots] [--export-csv]
//! ```

pub mod baseline;
pub mod config;
pub mod error;
pub mod figures;
pub mod outputs;
pub mod pipeline;
pub mod scenario;
pub mod timeline;

// Re-exports
pub use baseline::{Baseline, BaselineSource};
pub use config::{BaselineConfig, FigureConfig, ModelParams, ReportConfig, ScenarioSpec};
pub use error::ReportError;
pub use figures::QuarantineFigure;
pub use outputs::OutputContract;
pub use pipeline::{PipelineResult, ReportPipeline, ScenarioSet};
pub use scenario::{Scenario, ScenarioGenerator};
pub use timeline::DateAxis;

/// Crate version (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
