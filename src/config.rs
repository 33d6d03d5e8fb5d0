//! Configuration for the chirpmap radar analyzer.
//!
//! ## Matching the capture configuration
//!
//! The defaults describe a 77 GHz 4-rx/3-tx sensor sweeping 4 GHz with
//! 256 ADC samples over 256 TDM chirps per frame. If your captures were
//! recorded with a different chirp profile, adjust `ChirpConfig` to match:
//!
//! ```ignore
//! config.chirp.bandwidth_hz = 2.0e9;     // range resolution follows
//! config.chirp.duration_s = 40.0e-6;     // PRF and velocity span follow
//! ```
//!
//! Every tuning constant of the pipeline (near-field bin suppression, peak
//! comparison spans, calibration thresholds) is an explicit field here, so
//! changes are visible in one place and testable without touching the
//! algorithms.

use std::fmt;
use std::str::FromStr;

use crate::constants::SPEED_OF_LIGHT;

/// Chirp sweep bandwidth
///
/// Can be given in Hz, MHz, or GHz. Useful on the command line where
/// `4ghz` reads better than `4000000000`.
///
/// # Parsing formats
/// - `4000000000` - bandwidth in Hz (no suffix)
/// - `4000mhz` or `4000MHz` - bandwidth in megahertz
/// - `4ghz` or `4GHz` - bandwidth in gigahertz
///
/// # Example
/// ```
/// use chirpmap::config::Bandwidth;
///
/// let bw: Bandwidth = "4ghz".parse().unwrap();
/// assert!((bw.as_hz() - 4.0e9).abs() < 1.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Bandwidth(f32);

impl Bandwidth {
    /// Create from bandwidth in Hz
    pub fn from_hz(hz: f32) -> Self {
        Self(hz)
    }

    /// Create from bandwidth in GHz
    pub fn from_ghz(ghz: f32) -> Self {
        Self(ghz * 1.0e9)
    }

    /// Get bandwidth in Hz
    pub fn as_hz(&self) -> f32 {
        self.0
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}ghz", self.0 / 1.0e9)
    }
}

impl FromStr for Bandwidth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let (num, scale) = if let Some(n) = s.strip_suffix("ghz").or_else(|| s.strip_suffix("GHz"))
        {
            (n, 1.0e9)
        } else if let Some(n) = s.strip_suffix("mhz").or_else(|| s.strip_suffix("MHz")) {
            (n, 1.0e6)
        } else {
            let n = s
                .strip_suffix("hz")
                .or_else(|| s.strip_suffix("Hz"))
                .or_else(|| s.strip_suffix("HZ"))
                .unwrap_or(s);
            (n, 1.0)
        };

        let value: f32 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid bandwidth: {}", s))?;
        if value <= 0.0 {
            return Err("bandwidth must be positive".to_string());
        }
        Ok(Self(value * scale))
    }
}

/// System-wide radar configuration
///
/// Contains all parameters for the FMCW processing and self-calibration
/// pipeline. Use `RadarConfig::default()` for the reference sensor profile.
///
/// # Example
/// ```
/// use chirpmap::config::RadarConfig;
///
/// let mut config = RadarConfig::default();
/// // Customize as needed
/// config.calibration.range_error_threshold_m = 1.0;
/// ```
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Antenna array geometry
    pub antenna: AntennaConfig,
    /// Chirp timing and sweep parameters
    pub chirp: ChirpConfig,
    /// Range profile and peak detection tuning
    pub profile: ProfileConfig,
    /// Spectral map generation tuning
    pub map: MapConfig,
    /// Axis self-calibration thresholds
    pub calibration: CalibrationConfig,
}

/// Antenna array geometry
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct AntennaConfig {
    /// Number of receive channels in the capture
    pub rx_channels: usize,
    /// Number of transmitters in the TDM schedule
    pub tx_channels: usize,
    /// Carrier wavelength in meters (0.0039 m at 77 GHz)
    pub wavelength_m: f32,
    /// Physical spacing between adjacent rx elements in meters
    /// (half a wavelength for the reference array)
    pub element_spacing_m: f32,
}

/// Chirp timing and sweep parameters
///
/// These must match the sensor configuration the captures were recorded
/// with; range and velocity scaling are derived from them.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct ChirpConfig {
    /// ADC samples recorded per chirp
    pub samples_per_chirp: usize,
    /// Total chirps per frame across all transmitters
    pub chirps_per_frame: usize,
    /// Chirp loops per frame and transmitter (chirps_per_frame / tx, rounded)
    pub loops_per_frame: usize,
    /// Sweep bandwidth in Hz
    pub bandwidth_hz: f32,
    /// Single chirp duration in seconds
    pub duration_s: f32,
}

/// Range profile and peak detection tuning
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Range bins zeroed at the start of the profile (unreliable
    /// very-near-field response)
    pub near_field_bins: usize,
    /// Samples on each side a candidate peak must dominate
    pub peak_span: usize,
    /// Bins excluded from peak search at both profile edges
    pub edge_guard: usize,
    /// Fraction of the profile maximum a peak must exceed
    pub relative_threshold: f32,
}

/// Spectral map generation tuning
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Range bins zeroed in the range-Doppler map (DC and leakage)
    pub doppler_near_field_bins: usize,
    /// Range bins zeroed in the range-angle map
    pub angle_near_field_bins: usize,
    /// Zero-padded FFT size across the rx axis; sets angular bin count
    pub angle_fft_size: usize,
    /// Minimum chirp count before averaging is restricted to the middle
    /// half of the sequence (edge-chirp transient suppression)
    pub chirp_average_min: usize,
    /// Percentile used to normalize the range-angle map (outlier-resistant,
    /// unlike the plain maximum used for range-Doppler)
    pub normalization_percentile: f32,
}

/// Axis self-calibration thresholds
///
/// The window fractions and the angle threshold are empirical defaults for
/// the reference array, not derived physical limits. Treat them as tunables
/// when moving to a different antenna geometry.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Detected-vs-expected range error (meters) that triggers a
    /// resolution correction
    pub range_error_threshold_m: f32,
    /// Detected-vs-expected angle error (degrees) that triggers an
    /// axis offset
    pub angle_error_threshold_deg: f32,
    /// Lower bound of the angle-search window as a fraction of the
    /// expected range bin
    pub window_low_fraction: f32,
    /// Upper bound of the angle-search window as a fraction of the
    /// expected range bin
    pub window_high_fraction: f32,
}

impl RadarConfig {
    /// Range covered by one bin, in meters: c / (2 * bandwidth).
    pub fn range_resolution(&self) -> f32 {
        SPEED_OF_LIGHT / (2.0 * self.chirp.bandwidth_hz)
    }

    /// Maximum represented range in meters (resolution times the retained
    /// half of the sample spectrum).
    pub fn max_range(&self) -> f32 {
        self.range_resolution() * (self.chirp.samples_per_chirp / 2) as f32
    }

    /// Pulse repetition frequency for a single transmitter in Hz.
    /// Under TDM each transmitter fires once per tx_channels chirps.
    pub fn prf(&self) -> f32 {
        1.0 / (self.antenna.tx_channels as f32 * self.chirp.duration_s)
    }

    /// Frame period in seconds.
    pub fn frame_period(&self) -> f32 {
        self.antenna.tx_channels as f32 * self.chirp.loops_per_frame as f32 * self.chirp.duration_s
    }

    /// Complex samples expected in a nominal single-frame capture.
    pub fn expected_frame_len(&self) -> usize {
        self.antenna.rx_channels * self.chirp.chirps_per_frame * self.chirp.samples_per_chirp
    }
}

impl Default for AntennaConfig {
    fn default() -> Self {
        Self {
            rx_channels: 4,
            tx_channels: 3,
            wavelength_m: 0.0039,
            element_spacing_m: 0.00195,
        }
    }
}

impl Default for ChirpConfig {
    fn default() -> Self {
        Self {
            samples_per_chirp: 256,
            chirps_per_frame: 256,
            loops_per_frame: 85,
            bandwidth_hz: 4.0e9,
            duration_s: 60.0e-6,
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            near_field_bins: 5,
            peak_span: 5,
            edge_guard: 10,
            relative_threshold: 0.1,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            doppler_near_field_bins: 3,
            angle_near_field_bins: 5,
            angle_fft_size: 64,
            chirp_average_min: 10,
            normalization_percentile: 99.0,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            range_error_threshold_m: 0.5,
            angle_error_threshold_deg: 20.0,
            window_low_fraction: 0.8,
            window_high_fraction: 1.2,
        }
    }
}
