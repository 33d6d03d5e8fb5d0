use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chirpmap::cf32::load_cf32;
use chirpmap::config::{Bandwidth, RadarConfig};
use chirpmap::cube::RadarCube;
use chirpmap::error::RadarError;
use chirpmap::meta::ScenarioMeta;
use chirpmap::output::{self, OutputFormat, ScenarioAnalysis, create_formatter};
use chirpmap::processing::{ScenarioProcessor, ScenarioReport};

/// Distances and angles worth contrasting when only a handful of
/// scenarios can be shown.
const COMPARE_DISTANCES: [&str; 5] = ["0.9m", "1m", "2m", "3m", "4m"];
const COMPARE_ANGLES: [&str; 6] = ["0", "23", "45", "68", "112", "136"];
const COMPARE_LIMIT: usize = 4;

const LARGE_ANGLE_TAGS: [&str; 2] = ["112_degres", "136_degres"];
const LARGE_ANGLE_LIMIT: usize = 3;

/// Capture files concatenated per scenario in multi-frame mode.
const MULTI_FRAME_LIMIT: usize = 3;

#[derive(Parser, Debug)]
#[command(name = "chirpmap")]
#[command(
    about = "Analyze FMCW radar captures into range-Doppler and range-angle maps",
    long_about = None
)]
struct Args {
    /// Directory scanned recursively for .cf32 capture files
    #[arg(required = true)]
    data_dir: PathBuf,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Concatenate up to three capture files per scenario
    #[arg(short = 'm', long)]
    multi_frame: bool,

    /// Analyze a spread of distances and angles (at most four scenarios)
    #[arg(long)]
    compare: bool,

    /// Only analyze scenarios beyond 90 degrees (at most three)
    #[arg(long)]
    large_angles: bool,

    /// Stop after this many scenarios
    #[arg(long)]
    max_scenarios: Option<usize>,

    /// Write every generated map as CSV into this directory
    #[arg(long)]
    export_maps: Option<PathBuf>,

    /// TOML file overriding the default radar configuration
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Receive channels in the capture
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

    /// Sweep bandwidth (e.g. "4ghz", "2000mhz")
    #[arg(short = 'b', long)]
    bandwidth: Option<Bandwidth>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// One capture folder and its .cf32 files, sorted by name.
#[derive(Debug)]
struct Scenario {
    name: String,
    files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = build_config(&args)?;

    let mut scenarios = discover_scenarios(&args.data_dir)?;
    if scenarios.is_empty() {
        anyhow::bail!(
            "no .cf32 captures found under {}",
            args.data_dir.display()
        );
    }

    if args.compare {
        scenarios = select_comparison_set(scenarios);
    } else if args.large_angles {
        scenarios = select_large_angles(scenarios);
    }
    if let Some(max) = args.max_scenarios {
        scenarios.truncate(max);
    }

    info!(
        "analyzing {} scenarios at {:.4} m resolution",
        scenarios.len(),
        config.range_resolution()
    );

    let processor = ScenarioProcessor::new(&config);
    let formatter = create_formatter(args.format, args.verbose > 0);

    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    let mut failures = 0;
    for scenario in &scenarios {
        let analysis = analyze_scenario(
            &processor,
            &config,
            scenario,
            args.multi_frame,
            args.export_maps.as_deref(),
        );
        if analysis.error.is_some() {
            failures += 1;
        }
        println!("{}", formatter.format(&analysis));
    }

    eprintln!("Analyzed {} scenarios ({} failed)", scenarios.len(), failures);
    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<RadarConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => RadarConfig::default(),
    };

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
    Ok(config)
}

/// Walks the data directory and groups every .cf32 file by the name of
/// its containing folder. Scenarios come back in folder-name order with
/// their files sorted.
fn discover_scenarios(root: &Path) -> anyhow::Result<Vec<Scenario>> {
    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_captures(root, &mut groups)
        .with_context(|| format!("scanning {}", root.display()))?;

    Ok(groups
        .into_iter()
        .map(|(name, mut files)| {
            files.sort();
            Scenario { name, files }
        })
        .collect())
}

fn collect_captures(
    dir: &Path,
    groups: &mut BTreeMap<String, Vec<PathBuf>>,
) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_captures(&path, groups)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("cf32"))
        {
            let folder = path
                .parent()
                .and_then(|parent| parent.file_name())
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            groups.entry(folder).or_default().push(path);
        }
    }
    Ok(())
}

/// Picks at most four scenarios covering distinct distance and angle
/// combinations, preferring the comparison grid and topping up with
/// whatever else is available.
fn select_comparison_set(mut scenarios: Vec<Scenario>) -> Vec<Scenario> {
    let mut picked = Vec::new();

    'grid: for distance in COMPARE_DISTANCES {
        for angle in COMPARE_ANGLES {
            let tag = format!("{}_degres", angle);
            if let Some(pos) = scenarios
                .iter()
                .position(|s| s.name.contains(distance) && s.name.contains(&tag))
            {
                picked.push(scenarios.remove(pos));
                if picked.len() >= COMPARE_LIMIT {
                    break 'grid;
                }
            }
        }
    }

    while picked.len() < COMPARE_LIMIT && !scenarios.is_empty() {
        picked.push(scenarios.remove(0));
    }
    picked
}

/// Keeps only scenarios recorded beyond 90 degrees, capped at three.
fn select_large_angles(scenarios: Vec<Scenario>) -> Vec<Scenario> {
    scenarios
        .into_iter()
        .filter(|s| LARGE_ANGLE_TAGS.iter().any(|tag| s.name.contains(tag)))
        .take(LARGE_ANGLE_LIMIT)
        .collect()
}

fn analyze_scenario(
    processor: &ScenarioProcessor,
    config: &RadarConfig,
    scenario: &Scenario,
    multi_frame: bool,
    export_dir: Option<&Path>,
) -> ScenarioAnalysis {
    match analyze_scenario_impl(processor, config, scenario, multi_frame, export_dir) {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("{}: {:#}", scenario.name, e);
            let source = scenario
                .files
                .first()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            ScenarioAnalysis::failed(&scenario.name, &source, e)
        }
    }
}

fn analyze_scenario_impl(
    processor: &ScenarioProcessor,
    config: &RadarConfig,
    scenario: &Scenario,
    multi_frame: bool,
    export_dir: Option<&Path>,
) -> anyhow::Result<ScenarioAnalysis> {
    if scenario.files.is_empty() {
        return Err(RadarError::EmptyScenario(scenario.name.clone()).into());
    }

    let count = if multi_frame {
        scenario.files.len().min(MULTI_FRAME_LIMIT)
    } else {
        1
    };
    let selected = &scenario.files[..count];

    let mut frames = Vec::with_capacity(count);
    for path in selected {
        let samples = load_cf32(path)?;
        frames.push(RadarCube::from_flat(samples, config)?);
    }
    let cube = if frames.len() > 1 {
        RadarCube::concat_frames(&frames)?
    } else {
        frames.remove(0)
    };

    let source = if selected.len() == 1 {
        selected[0].display().to_string()
    } else {
        format!("{} ({} files)", scenario.name, selected.len())
    };

    let meta = ScenarioMeta::parse(&scenario.name);
    let report = processor.process(&cube, &meta)?;

    if let Some(dir) = export_dir {
        export_maps(&report, &scenario.name, dir)?;
    }

    Ok(ScenarioAnalysis::from_report(&report, source, selected.len()))
}

/// Writes every map of the report as `<scenario>_<kind>_<label>.csv`.
fn export_maps(report: &ScenarioReport, scenario: &str, dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    for labeled in &report.range_doppler {
        let file = format!("{}_rd_{}.csv", scenario, labeled.label.replace('/', "-"));
        output::export_map_csv(&labeled.map, &dir.join(file))?;
    }
    for labeled in &report.range_angle {
        let file = format!("{}_ra_{}.csv", scenario, labeled.label.replace('/', "-"));
        output::export_map_csv(&labeled.map, &dir.join(file))?;
    }
    Ok(())
}
