//! Windowed per-row FFT, the shared primitive behind both map types.
//!
//! Every spectral stage in the pipeline is the same operation with
//! different knobs: window the rows of a 2-D block, transform along the
//! row axis (optionally zero-padded), keep the physically meaningful part,
//! suppress unreliable near-field bins, and optionally rotate the zero
//! bin to the center. Range-Doppler and range-angle maps are two
//! configurations of this one primitive.

use ndarray::Array2;
use num_complex::Complex;
use rustfft::FftPlanner;

use crate::constants::{DB_EPSILON, NORMALIZATION_EPSILON};
use crate::spectral::window::Window;

/// How a magnitude map is scaled before log conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Divide by the map maximum. Straightforward, but a single hot bin
    /// sets the scale for everything.
    ByMax,
    /// Divide by the given percentile (0-100). Resists outlier bins.
    ByPercentile(f32),
}

/// One windowed FFT stage applied independently to each row.
///
/// Built with the builder methods and applied with [`AxisTransform::apply`]:
///
/// ```
/// use chirpmap::spectral::{AxisTransform, Window};
/// use ndarray::Array2;
/// use num_complex::Complex;
///
/// let block = Array2::<Complex<f32>>::zeros((4, 64));
/// let spectrum = AxisTransform::new(Window::Blackman)
///     .keep_first_half()
///     .suppress_near_field(3)
///     .apply(&block);
/// assert_eq!(spectrum.dim(), (4, 32));
/// ```
#[derive(Debug, Clone)]
pub struct AxisTransform {
    window: Window,
    fft_len: Option<usize>,
    keep_first_half: bool,
    suppress_bins: usize,
    center_dc: bool,
}

impl AxisTransform {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            fft_len: None,
            keep_first_half: false,
            suppress_bins: 0,
            center_dc: false,
        }
    }

    /// Zero-pad (or crop) each row to `len` before transforming.
    pub fn zero_padded(mut self, len: usize) -> Self {
        self.fft_len = Some(len);
        self
    }

    /// Retain only the first half of each transformed row. For real-valued
    /// beat spectra that is the non-negative range portion.
    pub fn keep_first_half(mut self) -> Self {
        self.keep_first_half = true;
        self
    }

    /// Zero the first `bins` output bins (after any halving). Suppresses
    /// DC leakage and unreliable very-near-field response.
    pub fn suppress_near_field(mut self, bins: usize) -> Self {
        self.suppress_bins = bins;
        self
    }

    /// Rotate each output row so the zero bin sits at index `len/2`.
    pub fn centered(mut self) -> Self {
        self.center_dc = true;
        self
    }

    /// Transform every row of `input`; rows are independent.
    pub fn apply(&self, input: &Array2<Complex<f32>>) -> Array2<Complex<f32>> {
        let (n_rows, in_len) = input.dim();
        let fft_len = self.fft_len.unwrap_or(in_len);
        let out_len = if self.keep_first_half {
            fft_len / 2
        } else {
            fft_len
        };

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_len);
        let coeffs = self.window.coefficients(in_len);

        let mut output = Array2::zeros((n_rows, out_len));
        let mut buffer: Vec<Complex<f32>> = Vec::with_capacity(fft_len);

        for (r, row) in input.outer_iter().enumerate() {
            buffer.clear();
            buffer.extend(row.iter().zip(coeffs.iter()).map(|(&v, &w)| v * w));
            buffer.resize(fft_len, Complex::new(0.0, 0.0));

            fft.process(&mut buffer);

            let kept = &mut buffer[..out_len];
            for bin in kept.iter_mut().take(self.suppress_bins) {
                *bin = Complex::new(0.0, 0.0);
            }
            if self.center_dc {
                kept.rotate_right(out_len / 2);
            }

            for (c, value) in kept.iter().enumerate() {
                output[[r, c]] = *value;
            }
        }

        output
    }
}

/// Magnitude, normalization, and dB conversion of a transformed block.
///
/// The normalization denominator is skipped when it is effectively zero,
/// so an all-zero spectrum maps to a uniform `20*log10(DB_EPSILON)` floor
/// instead of NaN.
pub fn log_magnitude(spectrum: &Array2<Complex<f32>>, normalization: Normalization) -> Array2<f32> {
    let mut magnitude = spectrum.mapv(|v| v.norm());

    let denominator = match normalization {
        Normalization::ByMax => magnitude.iter().copied().fold(0.0f32, f32::max),
        Normalization::ByPercentile(p) => {
            let values: Vec<f32> = magnitude.iter().copied().collect();
            percentile(&values, p)
        }
    };

    if denominator > NORMALIZATION_EPSILON {
        magnitude.mapv_inplace(|v| v / denominator);
    }

    magnitude.mapv(|v| 20.0 * (v + DB_EPSILON).log10())
}

/// Linearly interpolated percentile, `p` in 0-100. Returns 0 for an
/// empty slice.
pub fn percentile(values: &[f32], p: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f32;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let fraction = rank - lower as f32;

    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tone(n_rows: usize, len: usize, bin: usize) -> Array2<Complex<f32>> {
        Array2::from_shape_fn((n_rows, len), |(_, s)| {
            let phase = 2.0 * std::f32::consts::PI * bin as f32 * s as f32 / len as f32;
            Complex::new(phase.cos(), phase.sin())
        })
    }

    fn argmax_row(row: &[f32]) -> usize {
        let mut best = 0;
        for (i, &v) in row.iter().enumerate() {
            if v > row[best] {
                best = i;
            }
        }
        best
    }

    #[test]
    fn test_tone_lands_on_its_bin() {
        let input = tone(1, 64, 9);
        let spectrum = AxisTransform::new(Window::Rectangular).apply(&input);

        let mags: Vec<f32> = spectrum.row(0).iter().map(|v| v.norm()).collect();
        assert_eq!(argmax_row(&mags), 9);
        // A pure complex tone concentrates all its energy in one bin
        assert_relative_eq!(mags[9], 64.0, epsilon = 1e-3);
    }

    #[test]
    fn test_keep_first_half_halves_output() {
        let input = tone(3, 64, 5);
        let spectrum = AxisTransform::new(Window::Blackman)
            .keep_first_half()
            .apply(&input);
        assert_eq!(spectrum.dim(), (3, 32));
    }

    #[test]
    fn test_near_field_suppression_zeroes_leading_bins() {
        let input = tone(1, 64, 1);
        let spectrum = AxisTransform::new(Window::Rectangular)
            .keep_first_half()
            .suppress_near_field(3)
            .apply(&input);

        for c in 0..3 {
            assert_relative_eq!(spectrum[[0, c]].norm(), 0.0);
        }
    }

    #[test]
    fn test_zero_padding_interpolates_bins() {
        let input = Array2::from_elem((1, 4), Complex::new(1.0, 0.0));
        let spectrum = AxisTransform::new(Window::Rectangular)
            .zero_padded(64)
            .apply(&input);

        assert_eq!(spectrum.dim(), (1, 64));
        // DC energy stays at bin 0 regardless of padding
        let mags: Vec<f32> = spectrum.row(0).iter().map(|v| v.norm()).collect();
        assert_eq!(argmax_row(&mags), 0);
        assert_relative_eq!(mags[0], 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_centering_moves_dc_to_middle() {
        let input = Array2::from_elem((1, 8), Complex::new(1.0, 0.0));
        let spectrum = AxisTransform::new(Window::Rectangular)
            .centered()
            .apply(&input);

        let mags: Vec<f32> = spectrum.row(0).iter().map(|v| v.norm()).collect();
        assert_eq!(argmax_row(&mags), 4);
    }

    #[test]
    fn test_centering_odd_length() {
        let input = Array2::from_elem((1, 5), Complex::new(1.0, 0.0));
        let spectrum = AxisTransform::new(Window::Rectangular)
            .centered()
            .apply(&input);

        // Roll by floor(5/2) = 2 puts bin 0 at index 2
        let mags: Vec<f32> = spectrum.row(0).iter().map(|v| v.norm()).collect();
        assert_eq!(argmax_row(&mags), 2);
    }

    #[test]
    fn test_log_magnitude_all_zero_floor() {
        let spectrum = Array2::<Complex<f32>>::zeros((4, 8));
        let expected = 20.0 * DB_EPSILON.log10();

        for normalization in [Normalization::ByMax, Normalization::ByPercentile(99.0)] {
            let db = log_magnitude(&spectrum, normalization);
            for &v in db.iter() {
                assert_relative_eq!(v, expected, epsilon = 1e-4);
                assert!(v.is_finite());
            }
        }
    }

    #[test]
    fn test_log_magnitude_max_normalization_peaks_at_zero_db() {
        let mut spectrum = Array2::<Complex<f32>>::zeros((1, 8));
        spectrum[[0, 3]] = Complex::new(5.0, 0.0);

        let db = log_magnitude(&spectrum, Normalization::ByMax);

        // Peak normalizes to 1.0, so its dB value is 20*log10(1 + eps) ~ 0
        assert_relative_eq!(db[[0, 3]], 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_percentile_interpolation() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile(&values, 0.0), 0.0);
        assert_relative_eq!(percentile(&values, 50.0), 2.0);
        assert_relative_eq!(percentile(&values, 100.0), 4.0);
        assert_relative_eq!(percentile(&values, 75.0), 3.0);
        assert_relative_eq!(percentile(&values, 90.0), 3.6, epsilon = 1e-6);
    }

    #[test]
    fn test_percentile_unsorted_input() {
        let values = [4.0, 0.0, 3.0, 1.0, 2.0];
        assert_relative_eq!(percentile(&values, 50.0), 2.0);
    }

    #[test]
    fn test_percentile_empty() {
        assert_relative_eq!(percentile(&[], 99.0), 0.0);
    }
}
