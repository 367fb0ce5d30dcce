//! Figure generation using plotters
//!
//! The three-panel quarantine figure is drawn once against a generic
//! `DrawingBackend`; the SVG and bitmap outputs only differ in the backend.

use crate::config::{parse_hex_color, FigureConfig};
use crate::scenario::Scenario;
use crate::timeline::DateAxis;
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_svg::SVGBackend;
use std::ops::Range;
use std::path::Path;

const FIGURE_TITLE: &str = "Effect of Quarantine on COVID-19 Transmission Dynamics";
const FONT: &str = "sans-serif";

/// Vertical marker's colour and optional legend entry
#[derive(Clone, Copy)]
struct Marker {
    date: NaiveDate,
    color: RGBColor,
    legend: Option<&'static str>,
}

/// Per-panel layout
struct PanelSpec {
    title: &'static str,
    y_desc: &'static str,
    x_desc: Option<&'static str>,
    y_max: f64,
    legend_position: SeriesLabelPosition,
    threshold: Option<f64>,
    markers: Vec<Marker>,
}

/// Day-offset x axis with fixed tick positions, labelled as calendar dates
#[derive(Clone)]
pub struct DayAxis {
    inner: RangedCoordf64,
    ticks: Vec<f64>,
    dates: DateAxis,
}

impl DayAxis {
    pub fn new(dates: &DateAxis, span: Range<f64>, ticks: Vec<f64>) -> Self {
        Self {
            inner: span.into(),
            ticks,
            dates: dates.clone(),
        }
    }
}

impl Ranged for DayAxis {
    type FormatOption = NoDefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.inner.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<f64> {
        self.ticks.clone()
    }

    fn range(&self) -> Range<f64> {
        self.inner.range()
    }
}

impl ValueFormatter<f64> for DayAxis {
    fn format_ext(&self, value: &f64) -> String {
        self.dates
            .date_at_offset(*value)
            .format("%b %d")
            .to_string()
    }
}

/// Everything needed to draw the quarantine figure
pub struct QuarantineFigure<'a> {
    axis: &'a DateAxis,
    scenarios: &'a [Scenario],
    travel_restriction: NaiveDate,
    quarantine_start: NaiveDate,
    figure: &'a FigureConfig,
}

impl<'a> QuarantineFigure<'a> {
    pub fn new(
        axis: &'a DateAxis,
        scenarios: &'a [Scenario],
        travel_restriction: NaiveDate,
        quarantine_start: NaiveDate,
        figure: &'a FigureConfig,
    ) -> Self {
        Self {
            axis,
            scenarios,
            travel_restriction,
            quarantine_start,
            figure,
        }
    }

    /// Vector output
    pub fn render_svg(&self, path: &Path) -> Result<()> {
        let root = SVGBackend::new(path, self.figure.size).into_drawing_area();
        self.draw(&root)
            .with_context(|| format!("Failed to render figure: {}", path.display()))
    }

    /// Raster output; format follows the file extension (PNG for `.png`)
    pub fn render_png(&self, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, self.figure.size).into_drawing_area();
        self.draw(&root)
            .with_context(|| format!("Failed to render figure: {}", path.display()))
    }

    /// Draw the titled figure with three stacked panels
    pub fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;
        let body = root.titled(FIGURE_TITLE, (FONT, 26))?;
        let panels = body.split_evenly((3, 1));

        let travel = Marker {
            date: self.travel_restriction,
            color: RED,
            legend: Some("Travel restrictions"),
        };
        let quarantine = Marker {
            date: self.quarantine_start,
            color: BLUE,
            legend: Some("Quarantine starts"),
        };

        let r_panel = PanelSpec {
            title: "Effect of Quarantine on Reproduction Number",
            y_desc: "Reproduction Number (Rₜ)",
            x_desc: None,
            y_max: self.figure.r_axis_max,
            legend_position: SeriesLabelPosition::UpperRight,
            threshold: Some(1.0),
            markers: vec![travel],
        };
        self.draw_panel(&panels[0], &r_panel, |s| s.reproduction.as_slice())?;

        let cases_panel = PanelSpec {
            title: "Effect of Quarantine on Daily Case Incidence",
            y_desc: "Daily New Cases in Wuhan",
            x_desc: None,
            y_max: padded_max(self.scenarios.iter().map(|s| s.daily_incidence.as_slice())),
            legend_position: SeriesLabelPosition::UpperLeft,
            threshold: None,
            markers: vec![Marker { legend: None, ..travel }, quarantine],
        };
        self.draw_panel(&panels[1], &cases_panel, |s| s.daily_incidence.as_slice())?;

        let prevalence_panel = PanelSpec {
            title: "Effect of Quarantine on Infection Prevalence",
            y_desc: "Infection Prevalence (E+I)",
            x_desc: Some("Date"),
            y_max: padded_max(self.scenarios.iter().map(|s| s.prevalence.as_slice())),
            legend_position: SeriesLabelPosition::UpperLeft,
            threshold: None,
            markers: vec![
                Marker { legend: None, ..travel },
                Marker { legend: None, ..quarantine },
            ],
        };
        self.draw_panel(&panels[2], &prevalence_panel, |s| s.prevalence.as_slice())?;

        root.present()?;
        Ok(())
    }

    fn draw_panel<DB>(
        &self,
        area: &DrawingArea<DB, Shift>,
        panel: &PanelSpec,
        select: impl Fn(&Scenario) -> &[f64],
    ) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let x_max = self.axis.len().saturating_sub(1).max(1) as f64;
        let ticks = self.tick_offsets();
        let n_ticks = ticks.len().max(2);

        let mut chart = ChartBuilder::on(area)
            .caption(panel.title, (FONT, 18))
            .margin(15)
            .x_label_area_size(if panel.x_desc.is_some() { 50 } else { 35 })
            .y_label_area_size(70)
            .build_cartesian_2d(
                DayAxis::new(self.axis, 0.0..x_max, ticks),
                0.0..panel.y_max,
            )?;

        let mut mesh = chart.configure_mesh();
        mesh.x_labels(n_ticks)
            .y_desc(panel.y_desc)
            .axis_desc_style((FONT, 14))
            .bold_line_style(BLACK.mix(0.15))
            .light_line_style(BLACK.mix(0.05));
        if let Some(x_desc) = panel.x_desc {
            mesh.x_desc(x_desc);
        }
        mesh.draw()?;

        for scenario in self.scenarios {
            let color = scenario_color(scenario);
            let values = select(scenario);
            chart
                .draw_series(LineSeries::new(
                    values.iter().enumerate().map(|(i, &v)| (i as f64, v)),
                    color.stroke_width(3),
                ))?
                .label(format!("Quarantine: {}", scenario.label))
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3))
                });
        }

        for marker in &panel.markers {
            let x = self.axis.offset_days(marker.date);
            let color = marker.color;
            let anno = chart.draw_series(DashedLineSeries::new(
                vec![(x, 0.0), (x, panel.y_max)],
                10,
                6,
                color.stroke_width(2),
            ))?;
            if let Some(label) = marker.legend {
                anno.label(label).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }
        }

        if let Some(level) = panel.threshold {
            chart.draw_series(DashedLineSeries::new(
                vec![(0.0, level), (x_max, level)],
                2,
                4,
                RGBColor(128, 128, 128).mix(0.7).stroke_width(2),
            ))?;
        }

        chart
            .configure_series_labels()
            .position(panel.legend_position.clone())
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.3))
            .label_font((FONT, 12))
            .draw()?;

        Ok(())
    }

    /// Every second Monday on the axis, as chart x offsets
    fn tick_offsets(&self) -> Vec<f64> {
        let interval = self.figure.tick_interval_days.max(1);
        let first_monday = self
            .axis
            .dates()
            .iter()
            .position(|d| d.weekday() == Weekday::Mon)
            .unwrap_or(0);
        (first_monday..self.axis.len())
            .step_by(interval)
            .map(|i| i as f64)
            .collect()
    }
}

/// Line colour for a scenario; black if the hex string does not parse
fn scenario_color(scenario: &Scenario) -> RGBColor {
    parse_hex_color(&scenario.color)
        .map(|(r, g, b)| RGBColor(r, g, b))
        .unwrap_or(BLACK)
}

/// 10% headroom over the largest value, never below 1
fn padded_max<'s>(series: impl Iterator<Item = &'s [f64]>) -> f64 {
    let max = series
        .flat_map(|s| s.iter().copied())
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    (max * 1.1).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelParams, ScenarioSpec};
    use crate::scenario::ScenarioGenerator;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn fixture() -> (DateAxis, Vec<Scenario>) {
        let axis = DateAxis::new(d(2019, 12, 15), d(2020, 2, 5)).unwrap();
        let baseline = vec![2.5; axis.len()];
        let scenarios = ScenarioGenerator::new(&baseline, Some(39), ModelParams::default())
            .generate_all(&ScenarioSpec::defaults(), axis.len())
            .unwrap();
        (axis, scenarios)
    }

    #[test]
    fn test_svg_figure() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("figure.svg");
        let (axis, scenarios) = fixture();
        let config = FigureConfig::default();

        QuarantineFigure::new(&axis, &scenarios, d(2020, 1, 23), d(2020, 1, 23), &config)
            .render_svg(&path)
            .unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Effect of Quarantine on Reproduction Number"));
        assert!(svg.contains("Quarantine: 70%"));
        assert!(svg.contains("Travel restrictions"));
        assert!(svg.contains("Dec 16"));
    }

    #[test]
    fn test_tick_offsets_biweekly_mondays() {
        let (axis, scenarios) = fixture();
        let config = FigureConfig::default();
        let figure = QuarantineFigure::new(&axis, &scenarios, d(2020, 1, 23), d(2020, 1, 23), &config);

        // 2019-12-16 is the first Monday on the axis
        assert_eq!(figure.tick_offsets(), vec![1.0, 15.0, 29.0, 43.0]);
    }

    #[test]
    fn test_day_axis_ticks_and_labels() {
        let dates = DateAxis::new(d(2019, 12, 15), d(2020, 2, 5)).unwrap();
        let day_axis = DayAxis::new(&dates, 0.0..52.0, vec![1.0, 15.0]);

        assert_eq!(day_axis.range(), 0.0..52.0);
        assert_eq!(day_axis.key_points(10usize), vec![1.0, 15.0]);
        assert_eq!(day_axis.format_ext(&1.0), "Dec 16");
        assert_eq!(day_axis.format_ext(&39.0), "Jan 23");
        assert_eq!(day_axis.map(&0.0, (0, 520)), 0);
        assert_eq!(day_axis.map(&52.0, (0, 520)), 520);
    }

    #[test]
    fn test_svg_labels_every_second_monday() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("figure.svg");
        let (axis, scenarios) = fixture();
        let config = FigureConfig::default();

        QuarantineFigure::new(&axis, &scenarios, d(2020, 1, 23), d(2020, 1, 23), &config)
            .render_svg(&path)
            .unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        for label in ["Dec 16", "Dec 30", "Jan 13", "Jan 27"] {
            assert!(svg.contains(label), "missing tick label {}", label);
        }
        assert!(svg.contains("Reproduction Number (Rₜ)"));
    }

    #[test]
    fn test_padded_max() {
        let a = [1.0, 5.0];
        let b = [2.0, f64::INFINITY];
        assert!((padded_max([&a[..], &b[..]].into_iter()) - 5.5).abs() < 1e-12);
        assert_eq!(padded_max(std::iter::empty()), 1.0);
    }

    #[test]
    fn test_scenario_color() {
        let (_, scenarios) = fixture();
        let c = scenario_color(&scenarios[0]);
        assert_eq!((c.0, c.1, c.2), (0xFF, 0x44, 0x44));

        let mut odd = scenarios[0].clone();
        odd.color = "not-a-colour".to_string();
        let c = scenario_color(&odd);
        assert_eq!((c.0, c.1, c.2), (0, 0, 0));
    }
}
