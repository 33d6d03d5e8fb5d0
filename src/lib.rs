pub mod calib;
pub mod cf32;
pub mod config;
pub mod constants;
pub mod cube;
pub mod error;
pub mod meta;
pub mod mimo;
pub mod output;
pub mod processing;
pub mod profile;
pub mod spectral;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::RadarConfig;
pub use cube::RadarCube;
pub use error::{RadarError, Result};
