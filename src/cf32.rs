//! Raw `.cf32` capture file I/O.
//!
//! A capture file is a flat little-endian stream of f32 pairs, one
//! (real, imaginary) pair per complex sample, with no header. Sample order
//! is chirp-major, then rx channel, then ADC sample.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use num_complex::Complex;

use crate::error::{RadarError, Result};

const BYTES_PER_SAMPLE: usize = 8;

/// Read a whole capture file into memory.
pub fn load_cf32<P: AsRef<Path>>(path: P) -> Result<Vec<Complex<f32>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| RadarError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut bytes = Vec::new();
    BufReader::new(file)
        .read_to_end(&mut bytes)
        .map_err(|source| RadarError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    if bytes.len() % BYTES_PER_SAMPLE != 0 {
        return Err(RadarError::TruncatedCapture {
            path: path.to_path_buf(),
            byte_len: bytes.len(),
        });
    }

    let samples = bytes
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|c| {
            let re = f32::from_le_bytes([c[0], c[1], c[2], c[3]]);
            let im = f32::from_le_bytes([c[4], c[5], c[6], c[7]]);
            Complex::new(re, im)
        })
        .collect();

    Ok(samples)
}

/// Write samples out in capture order.
pub fn save_cf32<P: AsRef<Path>>(path: P, samples: &[Complex<f32>]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| RadarError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = BufWriter::new(file);
    for sample in samples {
        writer
            .write_all(&sample.re.to_le_bytes())
            .and_then(|_| writer.write_all(&sample.im.to_le_bytes()))
            .map_err(|source| RadarError::Io {
                path: path.to_path_buf(),
                source,
            })?;
    }

    writer.flush().map_err(|source| RadarError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
