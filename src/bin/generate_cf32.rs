use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use chirpmap::cf32::save_cf32;
use chirpmap::config::{Bandwidth, RadarConfig};
use chirpmap::simulation::{
    AdditiveNoiseConfig, NoiseConfig, SceneConfig, TargetConfig, synthesize_frame_at,
};

#[derive(Parser, Debug)]
#[command(name = "generate_cf32")]
#[command(about = "Generate synthetic radar captures for analyzer testing")]
struct Args {
    /// TOML noise configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Target distances in meters: comma-separated (e.g. "0.9,2,4") or
    /// range (e.g. "1-4:1")
    #[arg(short, long, default_value = "1,2,3")]
    distances: String,

    /// Target angles in degrees: comma-separated or range
    #[arg(short, long, default_value = "0,45")]
    angles: String,

    /// Frames per scenario
    #[arg(long, default_value_t = 3)]
    frames: u32,

    /// Radial target velocity in m/s
    #[arg(long, default_value_t = 0.0)]
    velocity: f32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// AWGN SNR in dB (CLI override)
    #[arg(long)]
    snr: Option<f32>,

    /// Receive channels
    #[arg(long)]
    rx: Option<usize>,

    /// Transmitters in the TDM schedule
    #[arg(long)]
    tx: Option<usize>,

    /// ADC samples per chirp
    #[arg(long)]
    samples: Option<usize>,

    /// Chirps per frame
    #[arg(long)]
    chirps: Option<usize>,

    /// Sweep bandwidth (e.g. "4ghz")
    #[arg(short = 'b', long)]
    bandwidth: Option<Bandwidth>,

    /// Scenario folder prefix
    #[arg(long, default_value = "LAB")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,
}

#[derive(Debug, serde::Serialize)]
struct ManifestEntry {
    scenario: String,
    file: String,
    distance_m: f32,
    angle_deg: f32,
    velocity_mps: f32,
    seed: u64,
}

#[derive(Debug, serde::Serialize)]
struct Manifest {
    rx_channels: usize,
    tx_channels: usize,
    samples_per_chirp: usize,
    chirps_per_frame: usize,
    bandwidth_hz: f32,
    files: Vec<ManifestEntry>,
}

/// Parses "1,2,3" lists and "start-end:step" ranges.
fn parse_grid_values(s: &str) -> Result<Vec<f32>> {
    if s.contains(':') {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid range format. Use 'start-end:step'");
        }
        let step: f32 = parts[1].parse().context("Invalid step value")?;
        if step <= 0.0 {
            anyhow::bail!("Range step must be positive");
        }
        let range_parts: Vec<&str> = parts[0].split('-').collect();
        if range_parts.len() != 2 {
            anyhow::bail!("Invalid range format. Use 'start-end:step'");
        }
        let start: f32 = range_parts[0].parse().context("Invalid start value")?;
        let end: f32 = range_parts[1].parse().context("Invalid end value")?;

        let mut values = Vec::new();
        let mut v = start;
        while v <= end {
            values.push(v);
            v += step;
        }
        Ok(values)
    } else {
        s.split(',')
            .map(|p| p.trim().parse::<f32>().context("Invalid grid value"))
            .collect()
    }
}

/// "2m" for whole meters, "0.9m" otherwise, matching the capture folder
/// naming the analyzer parses.
fn format_distance(distance: f32) -> String {
    if distance.fract() == 0.0 {
        format!("{}m", distance as i32)
    } else {
        format!("{}m", distance)
    }
}

fn build_config(args: &Args) -> RadarConfig {
    let mut config = RadarConfig::default();
    if let Some(rx) = args.rx {
        config.antenna.rx_channels = rx;
    }
    if let Some(tx) = args.tx {
        config.antenna.tx_channels = tx;
    }
    if let Some(samples) = args.samples {
        config.chirp.samples_per_chirp = samples;
    }
    if let Some(chirps) = args.chirps {
        config.chirp.chirps_per_frame = chirps;
    }
    if let Some(bandwidth) = args.bandwidth {
        config.chirp.bandwidth_hz = bandwidth.as_hz();
    }
    // Keep the derived frame timing consistent with overridden geometry
    if config.antenna.tx_channels > 0 {
        config.chirp.loops_per_frame =
            config.chirp.chirps_per_frame / config.antenna.tx_channels;
    }
    config
}

fn main() -> Result<()> {
    let args = Args::parse();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let noise_base = if let Some(ref config_path) = args.config {
        let content = fs::read_to_string(config_path).context("Failed to read config file")?;
        toml::from_str::<NoiseConfig>(&content).context("Failed to parse config file")?
    } else {
        NoiseConfig::default()
    };

    let config = build_config(&args);
    let distances = parse_grid_values(&args.distances)?;
    let angles = parse_grid_values(&args.angles)?;
    let base_seed = args.seed.unwrap_or(0);

    let total = distances.len() * angles.len() * args.frames as usize;
    let mut written = 0;
    let mut manifest_entries = Vec::new();

    let mut scenario_index = 0u64;
    for &distance in &distances {
        for &angle in &angles {
            let folder = format!(
                "{}_{}_{}_degres",
                args.prefix,
                format_distance(distance),
                angle as i32
            );
            let scenario_dir = args.output_dir.join(&folder);
            fs::create_dir_all(&scenario_dir).context("Failed to create scenario directory")?;

            for frame in 0..args.frames {
                let seed = base_seed + scenario_index * 1000 + frame as u64;
                let mut noise = noise_base.clone().with_seed(seed);
                if let Some(snr) = args.snr {
                    noise.additive = Some(AdditiveNoiseConfig { snr_db: snr });
                }

                let scene = SceneConfig::default()
                    .with_target(
                        TargetConfig::at(distance, angle).with_velocity(args.velocity),
                    )
                    .with_noise(noise);

                let cube = synthesize_frame_at(
                    &scene,
                    &config,
                    frame as usize * config.chirp.chirps_per_frame,
                )?;

                let filename = format!("frame_{}.cf32", frame);
                save_cf32(scenario_dir.join(&filename), &cube.to_flat())
                    .context("Failed to write capture file")?;

                manifest_entries.push(ManifestEntry {
                    scenario: folder.clone(),
                    file: filename,
                    distance_m: distance,
                    angle_deg: angle,
                    velocity_mps: args.velocity,
                    seed,
                });

                written += 1;
                eprint!("\rGenerating: {}/{}", written, total);
            }
            scenario_index += 1;
        }
    }
    eprintln!();

    if args.manifest {
        let manifest = Manifest {
            rx_channels: config.antenna.rx_channels,
            tx_channels: config.antenna.tx_channels,
            samples_per_chirp: config.chirp.samples_per_chirp,
            chirps_per_frame: config.chirp.chirps_per_frame,
            bandwidth_hz: config.chirp.bandwidth_hz,
            files: manifest_entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    eprintln!(
        "Generated {} frames of {:.1} ms in {}",
        total,
        config.frame_period() * 1e3,
        args.output_dir.display()
    );
    Ok(())
}
