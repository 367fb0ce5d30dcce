//! Report pipeline orchestration
//!
//! config -> date axis -> baseline -> scenarios -> figures.
//! Nothing is written until the configuration has been validated.

use crate::baseline::{Baseline, BaselineSource};
use crate::config::ReportConfig;
use crate::figures::QuarantineFigure;
use crate::outputs::{write_scenarios_csv, OutputContract};
use crate::scenario::{Scenario, ScenarioGenerator};
use crate::timeline::DateAxis;
use anyhow::Result;
use std::path::PathBuf;

/// Pipeline result
#[derive(Debug)]
pub struct PipelineResult {
    /// Output directory
    pub output_dir: PathBuf,
    /// Vector figure path
    pub vector_figure: PathBuf,
    /// Raster figure path
    pub raster_figure: PathBuf,
    /// Scenario CSV, when requested
    pub scenarios_csv: Option<PathBuf>,
    /// Where the baseline came from
    pub baseline_source: BaselineSource,
    /// Derived scenarios, in configuration order
    pub scenarios: Vec<Scenario>,
}

/// Series computed before anything touches the file system
#[derive(Debug, Clone)]
pub struct ScenarioSet {
    pub axis: DateAxis,
    pub baseline: Baseline,
    pub scenarios: Vec<Scenario>,
}

/// Main report pipeline
pub struct ReportPipeline {
    config: ReportConfig,
}

impl ReportPipeline {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Build axis, baseline and scenarios
    pub fn compute(&self) -> Result<ScenarioSet> {
        let config = &self.config;
        config.validate()?;

        log::info!("[1/4] Building date axis...");
        let axis = DateAxis::new(config.start_date, config.end_date)?;
        log::info!(
            "  {} days, {} to {}",
            axis.len(),
            config.start_date,
            config.end_date
        );

        // Validated to lie on the axis
        let start_idx = axis.first_index_at_or_after(config.quarantine_start_date);
        let synthetic_anchor = axis
            .index_of(config.travel_restriction_date)
            .unwrap_or_default();

        log::info!("[2/4] Resolving baseline...");
        let baseline = Baseline::resolve(&config.baseline, &axis, synthetic_anchor);

        log::info!(
            "[3/4] Generating {} scenarios (reductions {:?})...",
            config.scenarios.len(),
            config.reductions()
        );
        let generator = ScenarioGenerator::new(&baseline.values, start_idx, config.model.clone());
        let scenarios = generator.generate_all(&config.scenarios, axis.len())?;
        for s in &scenarios {
            log::debug!(
                "  {}: peak daily {:.1}, final prevalence {:.1}",
                s.label,
                s.peak_incidence(),
                s.final_prevalence()
            );
        }

        Ok(ScenarioSet {
            axis,
            baseline,
            scenarios,
        })
    }

    /// Compute scenarios and write all artifacts
    pub fn run(&self) -> Result<PipelineResult> {
        let config = &self.config;
        let set = self.compute()?;

        log::info!("[4/4] Rendering figures...");
        let contract = OutputContract::new(&config.output_dir, &config.file_stem)?;
        let figure = QuarantineFigure::new(
            &set.axis,
            &set.scenarios,
            config.travel_restriction_date,
            config.quarantine_start_date,
            &config.figure,
        );

        let vector_figure = contract.vector_figure();
        figure.render_svg(&vector_figure)?;
        log::info!("  Wrote {}", vector_figure.display());

        let raster_figure = contract.raster_figure();
        figure.render_png(&raster_figure)?;
        log::info!("  Wrote {}", raster_figure.display());

        let scenarios_csv = if config.export_csv {
            let path = contract.scenarios_csv();
            write_scenarios_csv(&path, &set.axis, &set.scenarios)?;
            log::info!("  Wrote {}", path.display());
            Some(path)
        } else {
            None
        };

        Ok(PipelineResult {
            output_dir: contract.base_dir.clone(),
            vector_figure,
            raster_figure,
            scenarios_csv,
            baseline_source: set.baseline.source,
            scenarios: set.scenarios,
        })
    }
}
