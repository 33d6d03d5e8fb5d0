//! Range-Doppler and range-angle map synthesis.
//!
//! Both maps start from the range spectrum of demultiplexed chirps and
//! differ in the second transform axis: Doppler resolves velocity across
//! chirps of a single rx channel, beamforming resolves angle across the
//! rx array. Output values are normalized log magnitudes in dB.

use ndarray::{Array2, Axis, s};
use num_complex::Complex;

use crate::calib::{self, CalibrationState};
use crate::config::RadarConfig;
use crate::cube::RadarCube;
use crate::error::Result;
use crate::mimo;
use crate::spectral::transform::{AxisTransform, Normalization, log_magnitude};
use crate::spectral::window::Window;

/// A log-magnitude map with physical axes. Rows follow `range_axis`,
/// columns follow `cross_axis` (velocity or angle).
#[derive(Debug, Clone)]
pub struct SpectralMap {
    pub values: Array2<f32>,
    pub range_axis: Vec<f32>,
    pub cross_axis: Vec<f32>,
}

impl SpectralMap {
    /// (range bins, cross bins)
    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Row, column and value of the strongest cell, if the map is
    /// non-empty.
    pub fn strongest_cell(&self) -> Option<(usize, usize, f32)> {
        let mut best: Option<(usize, usize, f32)> = None;
        for ((row, col), &value) in self.values.indexed_iter() {
            if best.is_none_or(|(_, _, b)| value > b) {
                best = Some((row, col, value));
            }
        }
        best
    }
}

/// Range-Doppler map for one tx/rx pair.
///
/// Chirps of the selected transmitter and channel are DC-removed, range
/// transformed with a Blackman window (first half kept, near-field bins
/// zeroed), then Doppler transformed across chirps with the zero-velocity
/// bin centered. Values are normalized to the map maximum.
pub fn range_doppler_map(
    cube: &RadarCube,
    tx_index: usize,
    rx_index: usize,
    config: &RadarConfig,
    state: &CalibrationState,
) -> Result<SpectralMap> {
    let channel = mimo::demux_channel(cube, tx_index, config.antenna.tx_channels, rx_index)?;

    let range_spectrum = AxisTransform::new(Window::Blackman)
        .keep_first_half()
        .suppress_near_field(config.map.doppler_near_field_bins)
        .apply(&channel);

    let doppler_spectrum = AxisTransform::new(Window::Blackman)
        .centered()
        .apply(&range_spectrum.t().to_owned());

    let (n_range, n_doppler) = doppler_spectrum.dim();
    Ok(SpectralMap {
        values: log_magnitude(&doppler_spectrum, Normalization::ByMax),
        range_axis: calib::range_axis(state, n_range),
        cross_axis: calib::velocity_axis(config.antenna.wavelength_m, config.prf(), n_doppler),
    })
}

/// Range-angle map for one transmitter across the rx array.
///
/// All channels are DC-removed and averaged over chirps (the middle half
/// of the chirps once enough are present, to sidestep settling at the
/// frame edges), range transformed per channel, then beamformed across
/// channels with a zero-padded transform. Values are normalized to a high
/// percentile so a few hot cells do not compress the rest of the map.
pub fn range_angle_map(
    cube: &RadarCube,
    tx_index: usize,
    config: &RadarConfig,
    state: &CalibrationState,
) -> Result<SpectralMap> {
    let tx_data = mimo::demux_all(cube, tx_index, config.antenna.tx_channels)?;
    let averaged = average_chirps(&tx_data, config.map.chirp_average_min);

    let range_spectrum = AxisTransform::new(Window::Blackman)
        .keep_first_half()
        .suppress_near_field(config.map.angle_near_field_bins)
        .apply(&averaged);

    let angle_spectrum = AxisTransform::new(Window::Rectangular)
        .zero_padded(config.map.angle_fft_size)
        .centered()
        .apply(&range_spectrum.t().to_owned());

    let (n_range, n_angle) = angle_spectrum.dim();
    Ok(SpectralMap {
        values: log_magnitude(
            &angle_spectrum,
            Normalization::ByPercentile(config.map.normalization_percentile),
        ),
        range_axis: calib::range_axis(state, n_range),
        cross_axis: calib::angle_axis(n_angle, state.angle_offset_deg),
    })
}

/// Mean over the chirp axis, reduced to (rx, samples).
///
/// With more than `min_chirps` chirps only the middle half contributes.
fn average_chirps(
    tx_data: &ndarray::Array3<Complex<f32>>,
    min_chirps: usize,
) -> Array2<Complex<f32>> {
    let (n_chirps, n_rx, n_samples) = tx_data.dim();

    let averaged = if n_chirps > min_chirps {
        tx_data
            .slice(s![n_chirps / 4..3 * n_chirps / 4, .., ..])
            .mean_axis(Axis(0))
    } else {
        tx_data.mean_axis(Axis(0))
    };

    averaged.unwrap_or_else(|| Array2::zeros((n_rx, n_samples)))
}
