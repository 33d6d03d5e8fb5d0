//! Scenario report formatting and export.
//!
//! The output layer consumes `ScenarioAnalysis` summaries, a flattened
//! serializable view of a `ScenarioReport`. Formatters render one summary
//! per line (or block, in verbose text mode); full map contents go to CSV
//! files via `export_map_csv` instead of the terminal.

mod csv;
mod json;
mod text;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use rolling_stats::Stats;
use serde::Serialize;

use crate::constants::KMH_PER_MPS;
use crate::error::{RadarError, Result};
use crate::processing::{LabeledMap, ScenarioReport};
use crate::spectral::SpectralMap;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub count: usize,
    pub mean: f32,
    pub std_dev: f32,
    pub min: f32,
    pub max: f32,
}

impl StatsSummary {
    pub fn from_stats(stats: &Stats<f32>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PeakSummary {
    pub range_m: f32,
    pub magnitude: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReflectionSummary {
    pub angle_deg: f32,
    pub range_m: f32,
}

/// Shape and hotspot of one generated map.
#[derive(Debug, Clone, Serialize)]
pub struct MapSummary {
    pub label: String,
    pub rows: usize,
    pub cols: usize,
    pub stats: Option<StatsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_range_m: Option<f32>,
    /// Velocity or angle of the strongest cell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_cross: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_db: Option<f32>,
}

impl MapSummary {
    fn from_labeled(labeled: &LabeledMap) -> Self {
        let mut stats: Stats<f32> = Stats::new();
        for &value in labeled.map.values.iter() {
            stats.update(value);
        }
        let peak = labeled.map.strongest_cell();

        Self {
            label: labeled.label.clone(),
            rows: labeled.map.values.nrows(),
            cols: labeled.map.values.ncols(),
            stats: StatsSummary::from_stats(&stats),
            peak_range_m: peak.map(|(row, _, _)| labeled.map.range_axis[row]),
            peak_cross: peak.map(|(_, col, _)| labeled.map.cross_axis[col]),
            peak_db: peak.map(|(_, _, value)| value),
        }
    }
}

/// Flattened per-scenario summary, one per analyzed folder.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioAnalysis {
    pub timestamp: String,
    pub scenario: String,
    /// File the cube came from, or a multi-frame note
    pub source: String,
    pub frames: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_distance_m: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_angle_deg: Option<f32>,
    pub range_resolution_m: f32,
    pub max_range_m: f32,
    pub angle_offset_deg: f32,
    pub range_corrected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_angle_deg: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_range_m: Option<f32>,
    pub prf_hz: f32,
    pub velocity_resolution_mps: f32,
    pub max_velocity_mps: f32,
    pub max_velocity_kmh: f32,
    pub peaks: Vec<PeakSummary>,
    pub profile_stats: Option<StatsSummary>,
    pub maps: Vec<MapSummary>,
    pub strong_reflections: Vec<ReflectionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScenarioAnalysis {
    pub fn from_report(report: &ScenarioReport, source: String, frames: usize) -> Self {
        let mut profile_stats: Stats<f32> = Stats::new();
        for &value in &report.profile {
            profile_stats.update(value);
        }

        let maps = report
            .range_doppler
            .iter()
            .chain(report.range_angle.iter())
            .map(MapSummary::from_labeled)
            .collect();

        Self {
            timestamp: iso8601_timestamp(),
            scenario: report.meta.name.clone(),
            source,
            frames,
            expected_distance_m: report.expectation.distance_m,
            expected_angle_deg: report.expectation.angle_deg,
            range_resolution_m: report.calibration.range_resolution,
            max_range_m: report.calibration.max_range,
            angle_offset_deg: report.calibration.angle_offset_deg,
            range_corrected: report.range_corrected,
            detected_angle_deg: report.detected_angle_deg,
            detected_range_m: report.detected_range_m,
            prf_hz: report.doppler.prf_hz,
            velocity_resolution_mps: report.doppler.velocity_resolution_mps,
            max_velocity_mps: report.doppler.max_velocity_mps,
            max_velocity_kmh: report.doppler.max_velocity_mps * KMH_PER_MPS,
            peaks: report
                .peaks
                .iter()
                .map(|p| PeakSummary {
                    range_m: p.range_m,
                    magnitude: p.magnitude,
                })
                .collect(),
            profile_stats: StatsSummary::from_stats(&profile_stats),
            maps,
            strong_reflections: report
                .strong_cells
                .iter()
                .map(|c| ReflectionSummary {
                    angle_deg: c.angle_deg,
                    range_m: c.range_m,
                })
                .collect(),
            error: None,
        }
    }

    /// Placeholder record for a scenario that failed to load or process.
    pub fn failed(scenario: &str, source: &str, error: impl std::fmt::Display) -> Self {
        Self {
            timestamp: iso8601_timestamp(),
            scenario: scenario.to_string(),
            source: source.to_string(),
            frames: 0,
            expected_distance_m: None,
            expected_angle_deg: None,
            range_resolution_m: 0.0,
            max_range_m: 0.0,
            angle_offset_deg: 0.0,
            range_corrected: false,
            detected_angle_deg: None,
            detected_range_m: None,
            prf_hz: 0.0,
            velocity_resolution_mps: 0.0,
            max_velocity_mps: 0.0,
            max_velocity_kmh: 0.0,
            peaks: Vec::new(),
            profile_stats: None,
            maps: Vec::new(),
            strong_reflections: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    /// The detected peak with the largest magnitude.
    pub fn strongest_peak(&self) -> Option<&PeakSummary> {
        self.peaks
            .iter()
            .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
    }
}

pub trait Formatter: Send {
    fn format(&self, analysis: &ScenarioAnalysis) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Write one map as CSV: header row carries the cross axis, each data
/// row starts with its range value.
pub fn export_map_csv(map: &SpectralMap, path: &Path) -> Result<()> {
    let io_err = |e: std::io::Error| RadarError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);

    let mut header = String::from("range_m");
    for cross in &map.cross_axis {
        header.push_str(&format!(",{:.4}", cross));
    }
    writeln!(writer, "{}", header).map_err(io_err)?;

    for (row, &range) in map.range_axis.iter().enumerate() {
        let mut line = format!("{:.4}", range);
        for &value in map.values.row(row).iter() {
            line.push_str(&format!(",{:.2}", value));
        }
        writeln!(writer, "{}", line).map_err(io_err)?;
    }

    writer.flush().map_err(io_err)?;
    Ok(())
}
