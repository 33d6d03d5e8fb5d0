//! Shared capture fixtures for the integration tests.

use chirpmap::config::RadarConfig;
use chirpmap::cube::RadarCube;
use chirpmap::simulation::{NoiseConfig, SceneConfig, TargetConfig, synthesize_frame};
use num_complex::Complex;

/// Reduced geometry that keeps synthesis cheap: 2 rx, single tx,
/// 32 chirps of 128 samples.
#[allow(dead_code)]
pub fn small_config() -> RadarConfig {
    let mut config = RadarConfig::default();
    config.antenna.rx_channels = 2;
    config.antenna.tx_channels = 1;
    config.chirp.chirps_per_frame = 32;
    config.chirp.samples_per_chirp = 128;
    config
}

#[allow(dead_code)]
pub fn zero_cube(config: &RadarConfig) -> RadarCube {
    let flat = vec![Complex::new(0.0, 0.0); config.expected_frame_len()];
    RadarCube::from_flat(flat, config).expect("zero cube must reshape")
}

/// One clean point target.
#[allow(dead_code)]
pub fn target_cube(
    config: &RadarConfig,
    distance_m: f32,
    angle_deg: f32,
    velocity_mps: f32,
) -> RadarCube {
    let scene = SceneConfig::default()
        .with_target(TargetConfig::at(distance_m, angle_deg).with_velocity(velocity_mps));
    synthesize_frame(&scene, config).expect("scene must synthesize")
}

/// One point target behind seeded AWGN.
#[allow(dead_code)]
pub fn noisy_target_cube(
    config: &RadarConfig,
    distance_m: f32,
    snr_db: f32,
    seed: u64,
) -> RadarCube {
    let scene = SceneConfig::default()
        .with_target(TargetConfig::at(distance_m, 0.0))
        .with_noise(NoiseConfig::default().with_seed(seed).with_additive_noise(snr_db));
    synthesize_frame(&scene, config).expect("scene must synthesize")
}
