mod test_cubes;

use approx::assert_relative_eq;
use chirpmap::calib::CalibrationState;
use chirpmap::cf32::{load_cf32, save_cf32};
use chirpmap::config::RadarConfig;
use chirpmap::cube::RadarCube;
use chirpmap::error::RadarError;
use chirpmap::meta::ScenarioMeta;
use chirpmap::processing::ScenarioProcessor;

#[test]
fn test_quiet_capture_produces_complete_report() {
    let config = RadarConfig::default();
    let processor = ScenarioProcessor::new(&config);
    let cube = test_cubes::zero_cube(&config);

    let report = processor
        .process(&cube, &ScenarioMeta::parse("quiet_capture"))
        .unwrap();

    // 256 samples keep 128 range bins; 256 chirps over 3 tx leave 86
    // Doppler bins; the angle FFT is padded to 64
    assert_eq!(report.profile.len(), 128);
    let rd = &report.range_doppler[0].map;
    assert_eq!(rd.values.dim(), (128, 86));
    assert_eq!(rd.range_axis.len(), 128);
    assert_eq!(rd.cross_axis.len(), 86);
    assert_relative_eq!(rd.cross_axis[43], 0.0);
    assert_relative_eq!(rd.range_axis[1], config.range_resolution());

    let ra = &report.range_angle[0].map;
    assert_eq!(ra.values.dim(), (128, 64));
    assert_relative_eq!(ra.cross_axis[0], -180.0);
    assert_relative_eq!(ra.cross_axis[63], 180.0);

    // silence floors every cell instead of going to -inf
    let floor = 20.0 * 1e-6f32.log10();
    assert!(rd.values.iter().all(|&v| (v - floor).abs() < 1e-3));
    assert!(ra.values.iter().all(|&v| (v - floor).abs() < 1e-3));

    assert!(report.peaks.is_empty());
    assert_eq!(report.calibration, CalibrationState::from_config(&config));
}

#[test]
fn test_point_targets_detected_across_ranges() {
    let config = RadarConfig::default();
    let processor = ScenarioProcessor::new(&config);

    // bins 20, 40, 60, 80 at the default 0.0375 m resolution
    for distance in [0.75f32, 1.5, 2.25, 3.0] {
        let cube = test_cubes::target_cube(&config, distance, 0.0, 0.0);
        let name = format!("{}m_0_degres", distance);

        let report = processor
            .process(&cube, &ScenarioMeta::parse(&name))
            .unwrap();

        let peak = report
            .peaks
            .strongest()
            .unwrap_or_else(|| panic!("no peak for target at {} m", distance));
        assert_relative_eq!(peak.range_m, distance, epsilon = 1e-4);

        // detection matches the folder expectation, so no correction
        assert!(!report.range_corrected, "unexpected rescale at {} m", distance);
        assert_relative_eq!(report.calibration.angle_offset_deg, 0.0);
        assert_relative_eq!(
            report.detected_range_m.unwrap(),
            distance,
            epsilon = 1e-4
        );
    }
}

#[test]
fn test_mislabeled_range_rescales_axes() {
    let config = RadarConfig::default();
    let processor = ScenarioProcessor::new(&config);

    // target at 1.2 m in a folder claiming 2.4 m doubles the scale
    let cube = test_cubes::target_cube(&config, 1.2, 0.0, 0.0);
    let report = processor
        .process(&cube, &ScenarioMeta::parse("2.4m_0_degres"))
        .unwrap();

    assert!(report.range_corrected);
    assert_relative_eq!(
        report.calibration.range_resolution,
        2.0 * config.range_resolution(),
        epsilon = 1e-6
    );
    assert_relative_eq!(
        report.calibration.max_range,
        2.0 * config.max_range(),
        epsilon = 1e-4
    );
    // peaks were found on the nominal axis, before the rescale
    assert_relative_eq!(report.peaks.strongest().unwrap().range_m, 1.2, epsilon = 1e-4);
    // the reported profile axis follows the corrected scale
    assert_relative_eq!(
        report.profile_axis[1],
        report.calibration.range_resolution,
        epsilon = 1e-6
    );
}

#[test]
fn test_moving_target_lands_off_doppler_center() {
    let config = RadarConfig::default();
    let processor = ScenarioProcessor::new(&config);

    let cube = test_cubes::target_cube(&config, 0.75, 0.0, 1.0);
    let report = processor
        .process(&cube, &ScenarioMeta::parse("0.75m_0_degres"))
        .unwrap();

    let rd = &report.range_doppler[0].map;
    let (row, col, _) = rd.strongest_cell().unwrap();
    assert_eq!(row, 20);

    let velocity = rd.cross_axis[col];
    assert!(
        (velocity - 1.0).abs() < 2.0 * report.doppler.velocity_resolution_mps,
        "expected ~1 m/s, read {} m/s",
        velocity
    );
}

#[test]
fn test_multi_frame_capture_round_trips_through_cf32() {
    let config = test_cubes::small_config();
    let processor = ScenarioProcessor::new(&config);
    let dir = tempfile::tempdir().unwrap();

    for frame in 0..2 {
        let cube = test_cubes::target_cube(&config, 1.5, 0.0, 0.0);
        let path = dir.path().join(format!("frame_{}.cf32", frame));
        save_cf32(&path, &cube.to_flat()).unwrap();
    }

    let mut frames = Vec::new();
    for frame in 0..2 {
        let samples = load_cf32(dir.path().join(format!("frame_{}.cf32", frame))).unwrap();
        frames.push(RadarCube::from_flat(samples, &config).unwrap());
    }
    let combined = RadarCube::concat_frames(&frames).unwrap();
    assert_eq!(combined.dim(), (64, 2, 128));

    let report = processor
        .process(&combined, &ScenarioMeta::parse("1.5m_0_degres"))
        .unwrap();

    // doubled chirp count doubles the Doppler bins of the single-tx setup
    assert_eq!(report.range_doppler[0].map.cross_axis.len(), 64);
    assert_relative_eq!(
        report.peaks.strongest().unwrap().range_m,
        1.5,
        epsilon = 1e-4
    );
}

#[test]
fn test_noisy_target_still_detected() {
    let config = test_cubes::small_config();
    let processor = ScenarioProcessor::new(&config);

    let cube = test_cubes::noisy_target_cube(&config, 1.5, 10.0, 42);
    let report = processor
        .process(&cube, &ScenarioMeta::parse("1.5m_0_degres"))
        .unwrap();

    assert_eq!(report.peaks.len(), 1);
    assert_relative_eq!(
        report.peaks.strongest().unwrap().range_m,
        1.5,
        epsilon = 1e-4
    );
}

#[test]
fn test_truncated_capture_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.cf32");
    std::fs::write(&path, [0u8; 10]).unwrap();

    let err = load_cf32(&path).unwrap_err();
    assert!(matches!(err, RadarError::TruncatedCapture { byte_len: 10, .. }));
}

#[test]
fn test_indivisible_sample_count_is_rejected() {
    let config = test_cubes::small_config();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.cf32");

    let samples = vec![num_complex::Complex::new(0.0f32, 0.0); 100];
    save_cf32(&path, &samples).unwrap();

    let loaded = load_cf32(&path).unwrap();
    let err = RadarCube::from_flat(loaded, &config).unwrap_err();
    assert!(matches!(err, RadarError::MalformedInput { len: 100, .. }));
}
