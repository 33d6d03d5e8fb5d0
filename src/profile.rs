//! Averaged range profile and reflection peak detection.
//!
//! The profile collapses transmitter 0's chirps and every rx channel into
//! one amplitude-vs-distance curve. Peak detection on that curve feeds the
//! range self-calibration; it is deliberately conservative (local maximum
//! over a span on both sides plus a relative floor) so noise ripple does
//! not produce phantom reflections.

use log::debug;
use ndarray::Axis;

use crate::config::RadarConfig;
use crate::cube::RadarCube;
use crate::error::Result;
use crate::mimo;
use crate::spectral::{AxisTransform, Window};

/// One detected reflection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Distance of the reflecting bin in meters
    pub range_m: f32,
    /// Linear profile magnitude at the peak
    pub magnitude: f32,
}

/// Detected reflections in ascending range order. May be empty.
#[derive(Debug, Clone, Default)]
pub struct PeakSet {
    peaks: Vec<Peak>,
}

impl PeakSet {
    /// Build a set from already-detected peaks.
    pub fn from_peaks(peaks: Vec<Peak>) -> Self {
        Self { peaks }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Peak> {
        self.peaks.iter()
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// The peak with the largest magnitude, if any.
    pub fn strongest(&self) -> Option<&Peak> {
        self.peaks
            .iter()
            .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
    }

    pub fn as_slice(&self) -> &[Peak] {
        &self.peaks
    }
}

/// Amplitude-vs-range profile for transmitter 0.
///
/// Chirps are demultiplexed and DC-removed per rx channel, averaged over
/// chirps and channels, Blackman-windowed, and transformed; the first
/// half of the spectrum is kept and the first `near_field_bins` bins are
/// zeroed. Values are linear magnitudes, not dB.
pub fn range_profile(cube: &RadarCube, config: &RadarConfig) -> Result<Vec<f32>> {
    let tx_data = mimo::demux_all(cube, 0, config.antenna.tx_channels)?;

    let averaged = tx_data
        .mean_axis(Axis(0))
        .and_then(|per_rx| per_rx.mean_axis(Axis(0)))
        .unwrap_or_else(|| ndarray::Array1::zeros(cube.n_samples()));

    let spectrum = AxisTransform::new(Window::Blackman)
        .keep_first_half()
        .suppress_near_field(config.profile.near_field_bins)
        .apply(&averaged.insert_axis(Axis(0)));

    Ok(spectrum.row(0).iter().map(|c| c.norm()).collect())
}

/// Local-maximum peak detection over a range profile.
///
/// A bin is a peak when it exceeds the maximum of the `peak_span` bins on
/// each side and `relative_threshold` of the global maximum. The first and
/// last `edge_guard` bins are never peaks. Flat or all-zero profiles yield
/// an empty set.
pub fn find_peaks(profile: &[f32], range_resolution: f32, config: &RadarConfig) -> PeakSet {
    let span = config.profile.peak_span;
    let guard = config.profile.edge_guard;
    let global_max = profile.iter().copied().fold(0.0f32, f32::max);
    let floor = config.profile.relative_threshold * global_max;

    let mut peaks = Vec::new();
    for i in guard..profile.len().saturating_sub(guard) {
        let value = profile[i];
        let before = &profile[i.saturating_sub(span)..i];
        let after = &profile[i + 1..(i + 1 + span).min(profile.len())];

        let before_max = before.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let after_max = after.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        if value > before_max && value > after_max && value > floor {
            peaks.push(Peak {
                range_m: i as f32 * range_resolution,
                magnitude: value,
            });
        }
    }

    debug!(
        "peak search: {} of {} bins qualified (floor {:.3e})",
        peaks.len(),
        profile.len(),
        floor
    );

    PeakSet { peaks }
}
