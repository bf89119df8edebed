use regex::Regex;

use super::error::ExtractError;

/// Token shapes of hierarchy and condition cells, compiled once per
/// extraction and shared by every table of it.
#[derive(Debug, Clone)]
pub struct Patterns {
    pub(crate) segment_group: Regex,
    pub(crate) segment: Regex,
    pub(crate) data_element: Regex,
    pub(crate) segment_id: Regex,
    pub(crate) condition_marker: Regex,
}

impl Patterns {
    pub fn compile() -> Result<Self, ExtractError> {
        Ok(Self {
            segment_group: compile(r"^SG\d+$")?,
            segment: compile(r"^[A-Z]{3}$")?,
            data_element: compile(r"^\d{4}$")?,
            segment_id: compile(r"^[A-Z\d]\d{4}$")?,
            condition_marker: compile(r"\[(\d+)\]")?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex, ExtractError> {
    Regex::new(pattern).map_err(|error| ExtractError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: error.to_string(),
    })
}
