//! Scenario generation
//!
//! Each scenario rescales the baseline R after the quarantine start and
//! pushes the result through a discrete exponential-growth recurrence:
//!
//! ```text
//! C[0] = initial
//! C[i] = C[i-1] * exp((R[i-1] - 1) / T_g)
//! daily[i] = max(C[i] - C[i-1], 0),  daily[0] = C[0]
//! prevalence[i] = scale * sum(daily[0..=i])
//! ```

use crate::config::{ModelParams, ScenarioSpec};
use crate::error::ReportError;

/// One intervention-strength scenario and its derived series
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Fraction by which R is reduced after quarantine start
    pub reduction: f64,
    /// Legend label
    pub label: String,
    /// Line colour "#RRGGBB"
    pub color: String,
    /// Reproduction number per day
    pub reproduction: Vec<f64>,
    /// Cumulative infections per day (before clamping)
    pub cumulative: Vec<f64>,
    /// Daily incidence, clamped to >= 0
    pub daily_incidence: Vec<f64>,
    /// Scaled running sum of daily incidence
    pub prevalence: Vec<f64>,
}

impl Scenario {
    pub fn len(&self) -> usize {
        self.reproduction.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reproduction.is_empty()
    }

    /// Peak daily incidence
    pub fn peak_incidence(&self) -> f64 {
        self.daily_incidence.iter().copied().fold(0.0, f64::max)
    }

    /// Prevalence on the last day
    pub fn final_prevalence(&self) -> f64 {
        self.prevalence.last().copied().unwrap_or(0.0)
    }
}

/// Produces scenarios from a baseline series
#[derive(Debug, Clone)]
pub struct ScenarioGenerator<'a> {
    baseline: &'a [f64],
    /// First index the reduction applies to; `None` leaves every scenario at baseline
    start_idx: Option<usize>,
    params: ModelParams,
}

impl<'a> ScenarioGenerator<'a> {
    pub fn new(baseline: &'a [f64], start_idx: Option<usize>, params: ModelParams) -> Self {
        Self {
            baseline,
            start_idx,
            params,
        }
    }

    /// Derive every series for one scenario
    pub fn generate(&self, spec: &ScenarioSpec) -> Scenario {
        let reproduction = apply_reduction(self.baseline, self.start_idx, spec.reduction);
        let cumulative = cumulative_infections(
            &reproduction,
            self.params.initial_cases,
            self.params.generation_time,
        );
        let daily_incidence = daily_incidence(&cumulative);
        let prevalence = prevalence(&daily_incidence, self.params.prevalence_scale);

        Scenario {
            reduction: spec.reduction,
            label: spec.label.clone(),
            color: spec.color.clone(),
            reproduction,
            cumulative,
            daily_incidence,
            prevalence,
        }
    }

    /// Generate all scenarios, checking each against the expected axis length
    pub fn generate_all(
        &self,
        specs: &[ScenarioSpec],
        axis_len: usize,
    ) -> Result<Vec<Scenario>, ReportError> {
        if self.baseline.len() != axis_len {
            return Err(ReportError::LengthMismatch {
                expected: axis_len,
                actual: self.baseline.len(),
            });
        }
        Ok(specs.iter().map(|spec| self.generate(spec)).collect())
    }
}

/// Copy of `baseline` with every value from `start_idx` on scaled by `1 - reduction`
pub fn apply_reduction(baseline: &[f64], start_idx: Option<usize>, reduction: f64) -> Vec<f64> {
    let mut values = baseline.to_vec();
    if let Some(start) = start_idx {
        let factor = 1.0 - reduction;
        for v in values.iter_mut().skip(start) {
            *v *= factor;
        }
    }
    values
}

/// Exponential growth driven by the previous day's R
pub fn cumulative_infections(reproduction: &[f64], initial: f64, generation_time: f64) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(reproduction.len());
    if reproduction.is_empty() {
        return cumulative;
    }
    cumulative.push(initial);
    for i in 1..reproduction.len() {
        let growth_rate = (reproduction[i - 1] - 1.0) / generation_time;
        cumulative.push(cumulative[i - 1] * growth_rate.exp());
    }
    cumulative
}

/// First differences of the cumulative curve (first entry kept as is), clamped at zero
pub fn daily_incidence(cumulative: &[f64]) -> Vec<f64> {
    let mut previous = 0.0;
    cumulative
        .iter()
        .map(|&c| {
            let daily = (c - previous).max(0.0);
            previous = c;
            daily
        })
        .collect()
}

/// Running sum of daily incidence, scaled after summation
pub fn prevalence(daily: &[f64], scale: f64) -> Vec<f64> {
    let mut total = 0.0;
    daily
        .iter()
        .map(|&d| {
            total += d;
            total * scale
        })
        .collect()
}
