//! Axis derivation and empirical scale correction.
//!
//! Nominal axes follow from the chirp configuration alone. When a scenario
//! records the true target position, the detected reflection is compared
//! against it and the axes are corrected: range errors rescale the meters
//! per bin, angle errors shift the angle axis. Corrections are carried in
//! a `CalibrationState` value that is threaded explicitly through the
//! pipeline; nothing here mutates shared state.

use log::{debug, info};

use crate::config::{CalibrationConfig, RadarConfig};
use crate::profile::PeakSet;
use crate::spectral::SpectralMap;

/// Axis scale parameters, nominal or corrected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationState {
    /// Meters represented by one range bin
    pub range_resolution: f32,
    /// Distance of the half-spectrum edge in meters
    pub max_range: f32,
    /// Degrees added to the angle axis
    pub angle_offset_deg: f32,
}

impl CalibrationState {
    /// Nominal state derived from the chirp configuration, with no
    /// angle offset.
    pub fn from_config(config: &RadarConfig) -> Self {
        Self {
            range_resolution: config.range_resolution(),
            max_range: config.max_range(),
            angle_offset_deg: 0.0,
        }
    }
}

/// Distance of each range bin in meters: `i * range_resolution`.
pub fn range_axis(state: &CalibrationState, n_bins: usize) -> Vec<f32> {
    (0..n_bins)
        .map(|i| i as f32 * state.range_resolution)
        .collect()
}

/// Velocity represented by one Doppler bin in m/s.
pub fn velocity_resolution(wavelength_m: f32, prf_hz: f32, n_bins: usize) -> f32 {
    if n_bins == 0 {
        return 0.0;
    }
    (wavelength_m * prf_hz) / (2.0 * n_bins as f32)
}

/// Largest unambiguous velocity magnitude in m/s.
pub fn max_velocity(wavelength_m: f32, prf_hz: f32, n_bins: usize) -> f32 {
    velocity_resolution(wavelength_m, prf_hz, n_bins) * (n_bins / 2) as f32
}

/// Velocity of each Doppler bin in m/s, zero at the center bin.
///
/// Bin `i` maps to `(i - n/2) * resolution` with the integer half, so the
/// axis runs from the most negative (approaching) velocity to just under
/// the most positive one.
pub fn velocity_axis(wavelength_m: f32, prf_hz: f32, n_bins: usize) -> Vec<f32> {
    let resolution = velocity_resolution(wavelength_m, prf_hz, n_bins);
    let half = (n_bins / 2) as f32;
    (0..n_bins)
        .map(|i| (i as f32 - half) * resolution)
        .collect()
}

/// Angle of each beam bin in degrees, evenly spaced over [-180, 180]
/// inclusive, shifted by the calibrated offset.
pub fn angle_axis(n_bins: usize, offset_deg: f32) -> Vec<f32> {
    match n_bins {
        0 => Vec::new(),
        1 => vec![-180.0 + offset_deg],
        n => {
            let step = 360.0 / (n - 1) as f32;
            (0..n).map(|i| -180.0 + i as f32 * step + offset_deg).collect()
        }
    }
}

/// Rescale the range axis against a known target distance.
///
/// The strongest detected peak stands in for the target. When it sits
/// further from the expected distance than the configured threshold, the
/// resolution and maximum range are both scaled by `expected / detected`;
/// otherwise the state passes through unchanged. Missing expectation or
/// an empty peak set also leave the state unchanged.
pub fn calibrate_range(
    state: CalibrationState,
    peaks: &PeakSet,
    expected_distance_m: Option<f32>,
    config: &CalibrationConfig,
) -> CalibrationState {
    let Some(expected) = expected_distance_m else {
        return state;
    };
    let Some(peak) = peaks.strongest() else {
        debug!("range calibration skipped: no peaks detected");
        return state;
    };

    let detected = peak.range_m;
    let error = (detected - expected).abs();
    debug!(
        "strongest reflection at {:.3} m, expected {:.3} m (error {:.3} m)",
        detected, expected, error
    );

    if error <= config.range_error_threshold_m || detected <= f32::EPSILON {
        return state;
    }

    let correction = expected / detected;
    info!(
        "range axis rescaled by {:.4}: resolution {:.4} -> {:.4} m/bin",
        correction,
        state.range_resolution,
        state.range_resolution * correction
    );

    CalibrationState {
        range_resolution: state.range_resolution * correction,
        max_range: state.max_range * correction,
        angle_offset_deg: state.angle_offset_deg,
    }
}

/// Result of one angle correction pass.
#[derive(Debug, Clone)]
pub struct AngleCalibration {
    /// State with the accumulated angle offset
    pub state: CalibrationState,
    /// The map's angle axis with any new offset applied
    pub corrected_axis: Vec<f32>,
    /// Angle of the strongest cell inside the search window, if one
    /// was searched
    pub detected_angle_deg: Option<f32>,
    /// Range of that cell, for diagnostics
    pub detected_range_m: Option<f32>,
}

/// Shift the angle axis against a known target position.
///
/// The expected distance selects a band of range rows (0.8 to 1.2 times
/// the expected bin); the strongest cell inside that band is taken as the
/// target. When its angle misses the expected angle by more than the
/// configured threshold, the difference is applied as an axis offset.
/// This is an axis shift only; map values are never resampled.
pub fn calibrate_angle(
    state: CalibrationState,
    map: &SpectralMap,
    expected_distance_m: Option<f32>,
    expected_angle_deg: Option<f32>,
    config: &CalibrationConfig,
) -> AngleCalibration {
    let unchanged = AngleCalibration {
        state,
        corrected_axis: map.cross_axis.clone(),
        detected_angle_deg: None,
        detected_range_m: None,
    };

    let (Some(expected_distance), Some(expected_angle)) =
        (expected_distance_m, expected_angle_deg)
    else {
        return unchanged;
    };

    let n_rows = map.values.nrows();
    if n_rows == 0 || map.cross_axis.is_empty() {
        return unchanged;
    }

    let expected_bin =
        (((expected_distance / state.max_range) * n_rows as f32) as usize).min(n_rows - 1);
    let start = (expected_bin as f32 * config.window_low_fraction) as usize;
    let end = ((expected_bin as f32 * config.window_high_fraction) as usize).min(n_rows);
    if start >= end {
        debug!(
            "angle calibration skipped: empty search window around range bin {}",
            expected_bin
        );
        return unchanged;
    }

    let mut best = (f32::NEG_INFINITY, start, 0);
    for row in start..end {
        for (col, &value) in map.values.row(row).iter().enumerate() {
            if value > best.0 {
                best = (value, row, col);
            }
        }
    }
    let (_, best_row, best_col) = best;

    let detected_angle = map.cross_axis[best_col];
    let detected_range = best_row as f32 * state.max_range / n_rows as f32;
    let error = (detected_angle - expected_angle).abs();
    debug!(
        "strongest cell in rows {}..{}: {:.1} deg at {:.2} m, expected {:.1} deg",
        start, end, detected_angle, detected_range, expected_angle
    );

    if error <= config.angle_error_threshold_deg {
        return AngleCalibration {
            detected_angle_deg: Some(detected_angle),
            detected_range_m: Some(detected_range),
            ..unchanged
        };
    }

    let correction = expected_angle - detected_angle;
    info!(
        "angle axis shifted by {:+.1} deg (detected {:.1}, expected {:.1})",
        correction, detected_angle, expected_angle
    );

    AngleCalibration {
        state: CalibrationState {
            angle_offset_deg: state.angle_offset_deg + correction,
            ..state
        },
        corrected_axis: map.cross_axis.iter().map(|a| a + correction).collect(),
        detected_angle_deg: Some(detected_angle),
        detected_range_m: Some(detected_range),
    }
}
