use super::{Formatter, ScenarioAnalysis};

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, analysis: &ScenarioAnalysis) -> String {
        serde_json::to_string(analysis).unwrap_or_else(|e| {
            format!(
                r#"{{"scenario":"{}","error":"serialization failed: {}"}}"#,
                analysis.scenario, e
            )
        })
    }
}
