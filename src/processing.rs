//! Per-scenario analysis pipeline.
//!
//! `ScenarioProcessor` turns one radar cube plus its folder metadata into
//! a `ScenarioReport`: calibrated axes, the range profile with its peaks,
//! both map families for the standard tx/rx selections, and the
//! diagnostics that the output layer prints. Calibration is applied in a
//! fixed order (range first, then angle) and starts fresh for every
//! scenario.

use log::debug;

use crate::calib::{self, CalibrationState};
use crate::config::RadarConfig;
use crate::cube::RadarCube;
use crate::error::Result;
use crate::meta::{ScenarioExpectation, ScenarioMeta};
use crate::profile::{self, PeakSet};
use crate::spectral::{self, SpectralMap, percentile};

/// Percentile pair framing the interesting dynamic range of a map.
const DISPLAY_LOW_PERCENTILE: f32 = 10.0;
const DISPLAY_HIGH_PERCENTILE: f32 = 90.0;
/// Fraction of the display range a cell must clear to count as strong.
const STRONG_CELL_FRACTION: f32 = 0.8;
const MAX_STRONG_CELLS: usize = 4;

/// A map labeled with the tx/rx selection it came from.
#[derive(Debug, Clone)]
pub struct LabeledMap {
    pub label: String,
    pub map: SpectralMap,
}

/// Doppler axis figures for the report header.
#[derive(Debug, Clone, Copy)]
pub struct DopplerFigures {
    pub prf_hz: f32,
    pub velocity_resolution_mps: f32,
    pub max_velocity_mps: f32,
}

/// A cell of the range-angle map that clears the strong-reflection
/// threshold.
#[derive(Debug, Clone, Copy)]
pub struct StrongCell {
    pub angle_deg: f32,
    pub range_m: f32,
}

/// Everything the output layer needs about one analyzed scenario.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub meta: ScenarioMeta,
    pub expectation: ScenarioExpectation,
    /// Final state after range and angle correction
    pub calibration: CalibrationState,
    /// Whether the range axis was rescaled against the expectation
    pub range_corrected: bool,
    /// Strongest cell found during angle calibration, if searched
    pub detected_angle_deg: Option<f32>,
    pub detected_range_m: Option<f32>,
    pub profile: Vec<f32>,
    /// Range of each profile bin under the final calibration
    pub profile_axis: Vec<f32>,
    pub peaks: PeakSet,
    pub doppler: DopplerFigures,
    pub range_doppler: Vec<LabeledMap>,
    pub range_angle: Vec<LabeledMap>,
    pub strong_cells: Vec<StrongCell>,
}

/// Runs the full pipeline for one scenario at a time.
pub struct ScenarioProcessor {
    config: RadarConfig,
}

impl ScenarioProcessor {
    pub fn new(config: &RadarConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Analyze one cube. Map generation order matches the calibration
    /// order: every map in the report carries corrected axes.
    pub fn process(&self, cube: &RadarCube, meta: &ScenarioMeta) -> Result<ScenarioReport> {
        let config = &self.config;
        let expectation = meta.expectation();
        let nominal = CalibrationState::from_config(config);
        debug!(
            "processing {}: cube {:?}, expected distance {:?} m, angle {:?} deg",
            meta.name,
            cube.dim(),
            expectation.distance_m,
            expectation.angle_deg
        );

        let profile = profile::range_profile(cube, config)?;
        let peaks = profile::find_peaks(&profile, nominal.range_resolution, config);
        let state = calib::calibrate_range(
            nominal,
            &peaks,
            expectation.distance_m,
            &config.calibration,
        );
        let range_corrected = (state.range_resolution - nominal.range_resolution).abs() > 1e-3;

        let mut primary_angle_map = spectral::range_angle_map(cube, 0, config, &state)?;
        let angle_cal = calib::calibrate_angle(
            state,
            &primary_angle_map,
            expectation.distance_m,
            expectation.angle_deg,
            &config.calibration,
        );
        let state = angle_cal.state;
        primary_angle_map.cross_axis = angle_cal.corrected_axis;

        let range_doppler = self.doppler_maps(cube, &state)?;
        let n_doppler = range_doppler
            .first()
            .map_or(0, |labeled| labeled.map.values.ncols());
        let doppler = DopplerFigures {
            prf_hz: config.prf(),
            velocity_resolution_mps: calib::velocity_resolution(
                config.antenna.wavelength_m,
                config.prf(),
                n_doppler,
            ),
            max_velocity_mps: calib::max_velocity(
                config.antenna.wavelength_m,
                config.prf(),
                n_doppler,
            ),
        };

        let strong_cells = strong_reflections(&primary_angle_map, state.max_range);
        let range_angle = self.angle_maps(cube, primary_angle_map, &state)?;
        let profile_axis = calib::range_axis(&state, profile.len());

        Ok(ScenarioReport {
            meta: meta.clone(),
            expectation,
            calibration: state,
            range_corrected,
            detected_angle_deg: angle_cal.detected_angle_deg,
            detected_range_m: angle_cal.detected_range_m,
            profile,
            profile_axis,
            peaks,
            doppler,
            range_doppler,
            range_angle,
            strong_cells,
        })
    }

    /// Range-Doppler maps for the first and last rx channel of tx 0.
    fn doppler_maps(&self, cube: &RadarCube, state: &CalibrationState) -> Result<Vec<LabeledMap>> {
        let last_rx = self.config.antenna.rx_channels.saturating_sub(1);
        let mut selections = vec![0];
        if last_rx > 0 {
            selections.push(last_rx);
        }

        let mut maps = Vec::new();
        for rx in selections {
            maps.push(LabeledMap {
                label: format!("TX1/RX{}", rx + 1),
                map: spectral::range_doppler_map(cube, 0, rx, &self.config, state)?,
            });
        }
        Ok(maps)
    }

    /// Range-angle maps for tx 0 and, where the array has one, a second
    /// transmitter for MIMO comparison.
    fn angle_maps(
        &self,
        cube: &RadarCube,
        primary: SpectralMap,
        state: &CalibrationState,
    ) -> Result<Vec<LabeledMap>> {
        let mut maps = vec![LabeledMap {
            label: "TX1".to_string(),
            map: primary,
        }];

        let second_tx = 2.min(self.config.antenna.tx_channels.saturating_sub(1));
        if second_tx > 0 {
            maps.push(LabeledMap {
                label: format!("TX{}", second_tx + 1),
                map: spectral::range_angle_map(cube, second_tx, &self.config, state)?,
            });
        }
        Ok(maps)
    }
}

/// Sparse scan of a range-angle map for cells that clear the
/// strong-reflection threshold.
///
/// Every tenth row and twentieth column is sampled; a cell qualifies when
/// it exceeds 80% of the span between the display percentiles. At most
/// four cells are reported, in scan order.
fn strong_reflections(map: &SpectralMap, max_range: f32) -> Vec<StrongCell> {
    let (rows, cols) = map.values.dim();
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    let flat: Vec<f32> = map.values.iter().copied().collect();
    let vmin = percentile(&flat, DISPLAY_LOW_PERCENTILE);
    let vmax = percentile(&flat, DISPLAY_HIGH_PERCENTILE);
    let threshold = vmin + STRONG_CELL_FRACTION * (vmax - vmin);

    let row_step = (rows / 10).max(1);
    let col_step = (cols / 20).max(1);

    let mut cells = Vec::new();
    'scan: for row in (0..rows).step_by(row_step) {
        for col in (0..cols).step_by(col_step) {
            if map.values[[row, col]] > threshold {
                cells.push(StrongCell {
                    angle_deg: map.cross_axis[col],
                    range_m: row as f32 * max_range / rows as f32,
                });
                if cells.len() >= MAX_STRONG_CELLS {
                    break 'scan;
                }
            }
        }
    }
    cells
}
