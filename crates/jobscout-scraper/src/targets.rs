//! Scrape-target configuration.
//!
//! Each target names a board, its listing URL, and the extraction
//! patterns for that site's markup: `item_pattern` isolates one posting
//! block, and the field patterns are applied within each block with their
//! first capture group as the value.

use std::path::Path;

use serde::Deserialize;

use crate::error::ScrapeError;

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeTarget {
    pub name: String,
    pub url: String,
    /// Matches one posting block; usually a `(?s)` pattern spanning lines.
    pub item_pattern: String,
    pub title_pattern: String,
    pub company_pattern: Option<String>,
    pub location_pattern: Option<String>,
    pub description_pattern: Option<String>,
    pub link_pattern: Option<String>,
    /// Prefixed onto relative links extracted by `link_pattern`.
    pub link_base: Option<String>,
}

/// Load scrape targets from a YAML file.
///
/// # Errors
///
/// Returns [`ScrapeError::TargetsRead`] if the file cannot be read or
/// [`ScrapeError::TargetsParse`] if it is not valid YAML of the expected
/// shape.
pub fn load_targets(path: &Path) -> Result<Vec<ScrapeTarget>, ScrapeError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ScrapeError::TargetsRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let targets: Vec<ScrapeTarget> = serde_yaml::from_str(&raw)?;
    Ok(targets)
}
