//! Scenario metadata recovered from capture folder names.
//!
//! Capture folders encode the measurement setup in underscore-separated
//! tokens, e.g. `LAB_2m_45_degres_rep1`. Parsing is deliberately loose:
//! tokens that fail to match or parse simply leave their field empty, and
//! a later token overrides an earlier one of the same kind.

/// Raw tokens recognized in a folder name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioMeta {
    /// Folder name the tokens came from
    pub name: String,
    /// Distance token such as `2m` or `0.9m`
    pub distance_token: Option<String>,
    /// Angle token, the part preceding a `degres` marker
    pub angle_token: Option<String>,
    /// Repetition marker such as `rep1`
    pub repetition: Option<String>,
    /// Lab marker such as `LAB`
    pub lab: Option<String>,
}

/// Ground-truth target position, where the folder name provides one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScenarioExpectation {
    pub distance_m: Option<f32>,
    pub angle_deg: Option<f32>,
}

impl ScenarioMeta {
    /// Recognize tokens in an underscore-separated folder name.
    ///
    /// A token containing `degres` marks the preceding token as the
    /// angle; a token with an `m` and at least one digit is a distance;
    /// `rep` and `LAB` substrings mark repetition and lab tokens. Each
    /// token matches at most one rule, in that order.
    pub fn parse(folder_name: &str) -> Self {
        let parts: Vec<&str> = folder_name.split('_').collect();
        let mut meta = Self {
            name: folder_name.to_string(),
            ..Self::default()
        };

        for (i, part) in parts.iter().enumerate() {
            if part.contains("degres") && i > 0 {
                meta.angle_token = Some(parts[i - 1].to_string());
            } else if part.contains('m') && part.chars().any(|c| c.is_ascii_digit()) {
                meta.distance_token = Some(part.to_string());
            } else if part.contains("rep") {
                meta.repetition = Some(part.to_string());
            } else if part.contains("LAB") {
                meta.lab = Some(part.to_string());
            }
        }

        meta
    }

    /// Numeric expectations parsed out of the raw tokens. Unparseable
    /// tokens yield `None` rather than an error.
    pub fn expectation(&self) -> ScenarioExpectation {
        let distance_m = self
            .distance_token
            .as_deref()
            .and_then(|t| t.replace('m', "").parse().ok());
        let angle_deg = self
            .angle_token
            .as_deref()
            .and_then(|t| t.replace('°', "").parse().ok());

        ScenarioExpectation {
            distance_m,
            angle_deg,
        }
    }
}
