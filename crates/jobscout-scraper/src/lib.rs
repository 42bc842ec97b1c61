//! HTML-harvesting adapter for job boards without a search API.
//!
//! Target sites and their extraction patterns are configured in YAML; the
//! client rotates realistic browser user agents, retries transport
//! failures with exponential backoff, and spaces requests to different
//! sites with a randomized delay. Extracted candidates without a title are
//! skipped, and skills/contract type are derived heuristically since the
//! source pages expose neither as structured fields.

pub mod client;
pub mod error;
pub mod harvest;
pub mod heuristics;
pub mod parse;
pub mod targets;

pub use client::ScrapeClient;
pub use error::ScrapeError;
pub use harvest::harvest_all;
pub use targets::{load_targets, ScrapeTarget};
