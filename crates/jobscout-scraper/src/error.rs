use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{site} returned status {status}")]
    Status { site: String, status: u16 },

    #[error("cannot read scrape targets from {path}: {reason}")]
    TargetsRead { path: String, reason: String },

    #[error("invalid scrape targets file: {0}")]
    TargetsParse(#[from] serde_yaml::Error),

    #[error("invalid {field} pattern for target '{target}': {reason}")]
    Pattern {
        target: String,
        field: &'static str,
        reason: String,
    },
}
