//! Canonical domain types and application configuration for jobscout.
//!
//! Every source adapter maps its provider payload into the types defined
//! here; everything downstream (orchestrator, scorer, recommendation
//! generator, persistence) speaks only this shape.

mod app_config;
mod config;
mod error;
mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use types::{
    DatePostedWindow, ExperienceSummary, JobPosting, JobSource, Recommendation, SchedulerConfig,
    SearchFilters, SortBy, UserProfileSummary,
};
