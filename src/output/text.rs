use super::{Formatter, ScenarioAnalysis};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, analysis: &ScenarioAnalysis) -> String {
        if let Some(ref err) = analysis.error {
            return format!("{:<40} ERROR: {}", analysis.scenario, err);
        }

        let strongest = analysis
            .strongest_peak()
            .map_or("-".to_string(), |p| format!("{:.2} m", p.range_m));
        let summary = format!(
            "{:<40} res {:.4} m/bin  max {:>5.1} m  offset {:>+6.1}°  peaks {:>2}  strongest {}",
            analysis.scenario,
            analysis.range_resolution_m,
            analysis.max_range_m,
            analysis.angle_offset_deg,
            analysis.peaks.len(),
            strongest
        );
        if !self.verbose {
            return summary;
        }

        let mut lines = vec![summary];
        lines.push(format!(
            "  source: {} ({} frame{})",
            analysis.source,
            analysis.frames,
            if analysis.frames == 1 { "" } else { "s" }
        ));
        lines.push(format!(
            "  doppler: PRF {:.1} Hz, res {:.3} m/s, max ±{:.1} m/s (±{:.0} km/h)",
            analysis.prf_hz,
            analysis.velocity_resolution_mps,
            analysis.max_velocity_mps,
            analysis.max_velocity_kmh
        ));

        if let (Some(distance), Some(angle)) =
            (analysis.expected_distance_m, analysis.expected_angle_deg)
        {
            lines.push(format!("  expected: {:.1}° at {:.2} m", angle, distance));
        }
        if let (Some(angle), Some(range)) =
            (analysis.detected_angle_deg, analysis.detected_range_m)
        {
            lines.push(format!("  detected: {:.1}° at {:.2} m", angle, range));
        }

        for peak in &analysis.peaks {
            lines.push(format!(
                "  peak: {:.2} m (magnitude {:.2})",
                peak.range_m, peak.magnitude
            ));
        }

        if !analysis.strong_reflections.is_empty() {
            let cells: Vec<String> = analysis
                .strong_reflections
                .iter()
                .map(|c| format!("({:.0}°, {:.1} m)", c.angle_deg, c.range_m))
                .collect();
            lines.push(format!("  strong reflections: {}", cells.join(", ")));
        }

        for map in &analysis.maps {
            let peak = match (map.peak_cross, map.peak_range_m, map.peak_db) {
                (Some(cross), Some(range), Some(db)) => {
                    format!("peak {:.1} dB at ({:.1}, {:.2} m)", db, cross, range)
                }
                _ => "empty".to_string(),
            };
            lines.push(format!(
                "  map {}: {}x{}, {}",
                map.label, map.rows, map.cols, peak
            ));
        }

        lines.join("\n")
    }
}
