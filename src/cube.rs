//! Radar cube construction from flat capture buffers.
//!
//! A capture file holds one frame of complex baseband samples laid out
//! chirp-major, then rx channel, then ADC sample. `RadarCube` rebuilds the
//! three-dimensional view and is the read-only input to everything
//! downstream.

use log::warn;
use ndarray::{Array3, Axis};
use num_complex::Complex;

use crate::config::RadarConfig;
use crate::error::{RadarError, Result};

/// One frame (or several concatenated frames) of raw baseband samples,
/// indexed (chirp, rx channel, ADC sample).
#[derive(Debug, Clone)]
pub struct RadarCube {
    data: Array3<Complex<f32>>,
}

impl RadarCube {
    /// Reshape a flat sample buffer into a cube.
    ///
    /// A buffer matching the configured frame length becomes
    /// (chirps_per_frame, rx_channels, samples_per_chirp). A buffer of any
    /// other length that still divides evenly into whole chirps is accepted
    /// with the chirp count derived from its size; anything else is a
    /// `MalformedInput` error and the caller should skip the file.
    pub fn from_flat(samples: Vec<Complex<f32>>, config: &RadarConfig) -> Result<Self> {
        let rx = config.antenna.rx_channels;
        let samples_per_chirp = config.chirp.samples_per_chirp;
        let chirp_len = rx * samples_per_chirp;

        if chirp_len == 0 {
            return Err(RadarError::Config(
                "rx_channels and samples_per_chirp must be nonzero".to_string(),
            ));
        }

        let n_chirps = if samples.len() == config.expected_frame_len() {
            config.chirp.chirps_per_frame
        } else if !samples.is_empty() && samples.len() % chirp_len == 0 {
            let actual = samples.len() / chirp_len;
            warn!(
                "capture holds {} samples, expected {}; adjusting to {} chirps",
                samples.len(),
                config.expected_frame_len(),
                actual
            );
            actual
        } else {
            return Err(RadarError::MalformedInput {
                len: samples.len(),
                rx_channels: rx,
                samples_per_chirp,
            });
        };

        let len = samples.len();
        let data = Array3::from_shape_vec((n_chirps, rx, samples_per_chirp), samples).map_err(
            |_| RadarError::MalformedInput {
                len,
                rx_channels: rx,
                samples_per_chirp,
            },
        )?;

        Ok(Self { data })
    }

    /// Concatenate several frames along the chirp axis for multi-frame
    /// processing. All frames must share rx and sample dimensions.
    pub fn concat_frames(frames: &[RadarCube]) -> Result<Self> {
        let first = frames
            .first()
            .ok_or_else(|| RadarError::Config("cannot concatenate zero frames".to_string()))?;

        let (_, rx, samples) = first.dim();
        for frame in &frames[1..] {
            let (_, frame_rx, frame_samples) = frame.dim();
            if frame_rx != rx || frame_samples != samples {
                return Err(RadarError::Config(format!(
                    "frame shape ({}, {}) does not match ({}, {})",
                    frame_rx, frame_samples, rx, samples
                )));
            }
        }

        let views: Vec<_> = frames.iter().map(|f| f.data.view()).collect();
        let data = ndarray::concatenate(Axis(0), &views)
            .map_err(|e| RadarError::Config(format!("frame concatenation failed: {}", e)))?;

        Ok(Self { data })
    }

    /// (chirps, rx channels, samples per chirp)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn n_chirps(&self) -> usize {
        self.data.dim().0
    }

    pub fn n_rx(&self) -> usize {
        self.data.dim().1
    }

    pub fn n_samples(&self) -> usize {
        self.data.dim().2
    }

    /// Read-only view of the raw cube.
    pub fn data(&self) -> &Array3<Complex<f32>> {
        &self.data
    }

    /// Flatten back to capture order (chirp-major, then rx, then sample).
    pub fn to_flat(&self) -> Vec<Complex<f32>> {
        self.data.iter().copied().collect()
    }
}
