mod noise;
mod scene;

pub use noise::{AdditiveNoiseConfig, NoiseConfig, apply_noise, signal_power};
pub use scene::{SceneConfig, TargetConfig, synthesize_frame, synthesize_frame_at};
