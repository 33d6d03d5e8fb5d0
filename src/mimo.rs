//! TDM-MIMO chirp demultiplexing.
//!
//! Transmitters fire round-robin, so chirp `c` in the raw frame belongs to
//! transmitter `c % tx_count`. Selecting every `tx_count`-th chirp from
//! offset `t` recovers the chirp sequence of transmitter `t`. All functions
//! here are pure projections; the source cube is never mutated.

use ndarray::{Array2, Array3, ArrayViewMut1, s};
use num_complex::Complex;

use crate::cube::RadarCube;
use crate::error::{RadarError, Result};

/// Chirps belonging to transmitter `tx_index`, in frame order.
///
/// The result keeps all rx channels and samples; its chirp count is
/// `ceil((n_chirps - tx_index) / tx_count)`.
pub fn select_tx_chirps(
    cube: &RadarCube,
    tx_index: usize,
    tx_count: usize,
) -> Result<Array3<Complex<f32>>> {
    if tx_index >= tx_count {
        return Err(RadarError::TransmitterOutOfRange {
            requested: tx_index,
            available: tx_count,
        });
    }

    let (n_chirps, n_rx, n_samples) = cube.dim();
    if tx_index >= n_chirps {
        return Ok(Array3::zeros((0, n_rx, n_samples)));
    }

    Ok(cube.data().slice(s![tx_index..;tx_count, .., ..]).to_owned())
}

/// One transmitter's chirps on one rx channel, DC-removed per chirp.
///
/// Rows are chirps, columns ADC samples. Each row has its own complex mean
/// subtracted before any spectral transform sees it.
pub fn demux_channel(
    cube: &RadarCube,
    tx_index: usize,
    tx_count: usize,
    rx_channel: usize,
) -> Result<Array2<Complex<f32>>> {
    if rx_channel >= cube.n_rx() {
        return Err(RadarError::ChannelOutOfRange {
            requested: rx_channel,
            available: cube.n_rx(),
        });
    }

    let tx_chirps = select_tx_chirps(cube, tx_index, tx_count)?;
    let mut data = tx_chirps.slice(s![.., rx_channel, ..]).to_owned();

    for chirp in data.outer_iter_mut() {
        subtract_mean(chirp);
    }

    Ok(data)
}

/// One transmitter's chirps on every rx channel, DC-removed per chirp
/// and channel.
pub fn demux_all(
    cube: &RadarCube,
    tx_index: usize,
    tx_count: usize,
) -> Result<Array3<Complex<f32>>> {
    let mut data = select_tx_chirps(cube, tx_index, tx_count)?;

    for mut chirp_plane in data.outer_iter_mut() {
        for row in chirp_plane.outer_iter_mut() {
            subtract_mean(row);
        }
    }

    Ok(data)
}

fn subtract_mean(mut row: ArrayViewMut1<Complex<f32>>) {
    let mean = row.mean().unwrap_or(Complex::new(0.0, 0.0));
    row.mapv_inplace(|v| v - mean);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RadarConfig;
    use approx::assert_relative_eq;

    fn cube_with(chirps: usize, rx: usize, samples: usize) -> RadarCube {
        let mut config = RadarConfig::default();
        config.antenna.rx_channels = rx;
        config.chirp.chirps_per_frame = chirps;
        config.chirp.samples_per_chirp = samples;

        // Encode the chirp index in the real part so selection is visible
        let flat: Vec<Complex<f32>> = (0..chirps * rx * samples)
            .map(|i| {
                let chirp = i / (rx * samples);
                Complex::new(chirp as f32, 0.0)
            })
            .collect();
        RadarCube::from_flat(flat, &config).unwrap()
    }

    #[test]
    fn test_tdm_selection_offsets() {
        let cube = cube_with(7, 2, 4);

        let tx0 = select_tx_chirps(&cube, 0, 3).unwrap();
        let tx1 = select_tx_chirps(&cube, 1, 3).unwrap();
        let tx2 = select_tx_chirps(&cube, 2, 3).unwrap();

        // 7 chirps over 3 transmitters: 0,3,6 / 1,4 / 2,5
        assert_eq!(tx0.dim().0, 3);
        assert_eq!(tx1.dim().0, 2);
        assert_eq!(tx2.dim().0, 2);
        assert_relative_eq!(tx0[[1, 0, 0]].re, 3.0);
        assert_relative_eq!(tx1[[1, 0, 0]].re, 4.0);
        assert_relative_eq!(tx2[[0, 0, 0]].re, 2.0);
    }

    #[test]
    fn test_tx_index_out_of_range() {
        let cube = cube_with(6, 2, 4);
        assert!(matches!(
            select_tx_chirps(&cube, 3, 3),
            Err(RadarError::TransmitterOutOfRange {
                requested: 3,
                available: 3
            })
        ));
    }

    #[test]
    fn test_selection_beyond_available_chirps_is_empty() {
        let cube = cube_with(2, 2, 4);
        let tx2 = select_tx_chirps(&cube, 2, 3).unwrap();
        assert_eq!(tx2.dim(), (0, 2, 4));
    }

    #[test]
    fn test_demux_channel_removes_per_chirp_dc() {
        let mut config = RadarConfig::default();
        config.antenna.rx_channels = 1;
        config.chirp.chirps_per_frame = 2;
        config.chirp.samples_per_chirp = 4;

        // Chirp 0 rides on +5, chirp 1 on -2
        let flat = vec![
            Complex::new(5.0, 0.0),
            Complex::new(6.0, 0.0),
            Complex::new(4.0, 0.0),
            Complex::new(5.0, 0.0),
            Complex::new(-2.0, 0.0),
            Complex::new(-1.0, 0.0),
            Complex::new(-3.0, 0.0),
            Complex::new(-2.0, 0.0),
        ];
        let cube = RadarCube::from_flat(flat, &config).unwrap();

        let data = demux_channel(&cube, 0, 1, 0).unwrap();

        for chirp in data.outer_iter() {
            let mean: Complex<f32> = chirp.iter().sum::<Complex<f32>>() / chirp.len() as f32;
            assert_relative_eq!(mean.norm(), 0.0, epsilon = 1e-6);
        }
        // Shape and structure survive
        assert_eq!(data.dim(), (2, 4));
        assert_relative_eq!(data[[0, 1]].re, 1.0);
    }

    #[test]
    fn test_demux_all_removes_dc_per_channel() {
        let mut config = RadarConfig::default();
        config.antenna.rx_channels = 2;
        config.chirp.chirps_per_frame = 3;
        config.chirp.samples_per_chirp = 8;

        let flat: Vec<Complex<f32>> = (0..3 * 2 * 8)
            .map(|i| Complex::new(1.0 + (i % 8) as f32, 0.5))
            .collect();
        let cube = RadarCube::from_flat(flat, &config).unwrap();

        let data = demux_all(&cube, 0, 3).unwrap();

        assert_eq!(data.dim(), (1, 2, 8));
        for chirp_plane in data.outer_iter() {
            for row in chirp_plane.outer_iter() {
                let mean: Complex<f32> = row.iter().sum::<Complex<f32>>() / row.len() as f32;
                assert_relative_eq!(mean.norm(), 0.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_source_cube_is_untouched() {
        let cube = cube_with(6, 2, 4);
        let before = cube.to_flat();

        let _ = demux_all(&cube, 0, 3).unwrap();
        let _ = demux_channel(&cube, 1, 3, 1).unwrap();

        assert_eq!(cube.to_flat(), before);
    }

    #[test]
    fn test_rx_channel_out_of_range() {
        let cube = cube_with(6, 2, 4);
        assert!(matches!(
            demux_channel(&cube, 0, 3, 2),
            Err(RadarError::ChannelOutOfRange {
                requested: 2,
                available: 2
            })
        ));
    }
}
