use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadarError {
    #[error(
        "Malformed capture: {len} samples cannot be reshaped with {rx_channels} rx channels x {samples_per_chirp} samples per chirp"
    )]
    MalformedInput {
        len: usize,
        rx_channels: usize,
        samples_per_chirp: usize,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Capture {} is {byte_len} bytes, not a whole number of complex samples", .path.display())]
    TruncatedCapture { path: PathBuf, byte_len: usize },

    #[error("Rx channel {requested} out of range: cube has {available} channels")]
    ChannelOutOfRange { requested: usize, available: usize },

    #[error("Transmitter {requested} out of range: schedule has {available} transmitters")]
    TransmitterOutOfRange { requested: usize, available: usize },

    #[error("Scenario '{0}' contains no usable capture files")]
    EmptyScenario(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RadarError>;
