use super::{Formatter, ScenarioAnalysis};

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, analysis: &ScenarioAnalysis) -> String {
        let expected_distance = analysis
            .expected_distance_m
            .map_or(String::new(), |v| format!("{:.2}", v));
        let expected_angle = analysis
            .expected_angle_deg
            .map_or(String::new(), |v| format!("{:.1}", v));
        let detected_angle = analysis
            .detected_angle_deg
            .map_or(String::new(), |v| format!("{:.1}", v));
        let detected_range = analysis
            .detected_range_m
            .map_or(String::new(), |v| format!("{:.2}", v));
        let strongest_peak = analysis
            .strongest_peak()
            .map_or(String::new(), |p| format!("{:.3}", p.range_m));
        let error = analysis.error.as_deref().unwrap_or("");

        format!(
            "{},{},{},{},{},{},{:.4},{:.2},{:.1},{},{},{},{:.1},{:.4},{:.2},{},{},{}",
            analysis.timestamp,
            analysis.scenario,
            analysis.source,
            analysis.frames,
            expected_distance,
            expected_angle,
            analysis.range_resolution_m,
            analysis.max_range_m,
            analysis.angle_offset_deg,
            analysis.range_corrected,
            detected_angle,
            detected_range,
            analysis.prf_hz,
            analysis.velocity_resolution_mps,
            analysis.max_velocity_mps,
            analysis.peaks.len(),
            strongest_peak,
            error
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some(
            "timestamp,scenario,source,frames,expected_distance_m,expected_angle_deg,range_resolution_m,max_range_m,angle_offset_deg,range_corrected,detected_angle_deg,detected_range_m,prf_hz,velocity_resolution_mps,max_velocity_mps,peak_count,strongest_peak_m,error",
        )
    }
}
