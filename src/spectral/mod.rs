//! Spectral analysis building blocks.
//!
//! `window` and `transform` hold the windowed-FFT primitive shared by
//! every product; `maps` composes it into the range-Doppler and
//! range-angle maps.

pub mod maps;
pub mod transform;
pub mod window;

pub use maps::{SpectralMap, range_angle_map, range_doppler_map};
pub use transform::{AxisTransform, Normalization, log_magnitude, percentile};
pub use window::Window;
