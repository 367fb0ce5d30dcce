//! Quarantine Report CLI Entry Point
//!
//! Runs with no arguments:
//! ```
//! quarantine-report
//! ```
//! which reads `out_R0.csv` if present (synthetic baseline otherwise) and
//! writes `plots/quarantine_effect_quick.{svg,png}`.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use quarantine_report::{ReportConfig, ReportPipeline};

/// Quarantine effect on transmission dynamics
#[derive(Parser, Debug)]
#[command(name = "quarantine-report")]
#[command(version)]
#[command(about = "Render quarantine scenario figures (R(t), daily cases, prevalence)", long_about = None)]
struct Cli {
    /// Load configuration from JSON (missing fields take defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Baseline table; row-wise median of the first columns is used as R(t)
    #[arg(long)]
    baseline: Option<PathBuf>,

    /// Output directory
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    /// Also write the derived series to quarantine_scenarios.csv
    #[arg(long)]
    export_csv: bool,

    /// Save the effective configuration to JSON before running
    #[arg(long)]
    save_config: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<(ReportConfig, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ReportConfig::default(),
        };
        if let Some(baseline) = self.baseline {
            config.baseline.source = baseline;
        }
        if let Some(out) = self.out {
            config.output_dir = out;
        }
        if self.export_csv {
            config.export_csv = true;
        }
        Ok((config, self.save_config))
    }
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let (config, save_config) = Cli::parse().into_config()?;
    if let Some(path) = save_config {
        config.save(&path)?;
        log::info!("Saved configuration to {}", path.display());
    }

    let result = ReportPipeline::new(config).run()?;

    println!("✓ Graph saved to: {}", result.vector_figure.display());
    println!("✓ Also saved as PNG: {}", result.raster_figure.display());
    if let Some(csv) = &result.scenarios_csv {
        println!("✓ Scenario series saved to: {}", csv.display());
    }

    let levels: Vec<&str> = result.scenarios.iter().map(|s| s.label.as_str()).collect();
    println!();
    println!("Graph generation complete!");
    println!(
        "The figure shows how different quarantine effectiveness levels ({})",
        levels.join(", ")
    );
    println!("affect transmission dynamics, case incidence, and infection prevalence.");

    Ok(())
}
