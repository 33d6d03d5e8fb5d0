//! Noise injection for synthetic radar captures.
//!
//! Adds complex white Gaussian noise to a generated frame so detection
//! thresholds and normalization can be exercised against realistic
//! floors. Noise power is specified relative to the signal already in
//! the buffer, so a quiet scene stays quiet.

use num_complex::Complex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Additive white Gaussian noise at a fixed SNR relative to the
/// current signal power.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct AdditiveNoiseConfig {
    /// Signal-to-noise ratio in dB.
    pub snr_db: f32,
}

/// Noise configuration for synthetic frames.
///
/// All effects are optional; the default configuration leaves the
/// signal untouched.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Random seed for reproducible generation. `None` seeds from
    /// the OS entropy source.
    pub seed: Option<u64>,

    /// Additive white Gaussian noise.
    pub additive: Option<AdditiveNoiseConfig>,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_additive_noise(mut self, snr_db: f32) -> Self {
        self.additive = Some(AdditiveNoiseConfig { snr_db });
        self
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Mean power of a complex sample buffer.
pub fn signal_power(samples: &[Complex<f32>]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s.norm_sqr()).sum::<f32>() / samples.len() as f32
}

/// Applies the configured noise effects to a sample buffer in place.
pub fn apply_noise(samples: &mut [Complex<f32>], config: &NoiseConfig) {
    let mut rng = create_rng(config.seed);

    if let Some(additive) = &config.additive {
        apply_additive_noise(samples, additive, &mut rng);
    }
}

fn apply_additive_noise(
    samples: &mut [Complex<f32>],
    config: &AdditiveNoiseConfig,
    rng: &mut ChaCha8Rng,
) {
    let power = signal_power(samples);
    if power <= 0.0 {
        return;
    }

    let snr_linear = 10.0_f32.powf(config.snr_db / 10.0);
    let noise_power = power / snr_linear;
    // Noise power splits evenly between the I and Q components.
    let component_std = (noise_power / 2.0).sqrt();
    let normal = Normal::new(0.0, component_std).unwrap();

    for sample in samples.iter_mut() {
        *sample += Complex::new(normal.sample(rng), normal.sample(rng));
    }
}
