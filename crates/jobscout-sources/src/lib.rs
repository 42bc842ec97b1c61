//! Job-search source adapters and the search orchestrator.
//!
//! One module per external provider. Each adapter translates
//! [`jobscout_core::SearchFilters`] into its provider's parameter shape,
//! fetches, and maps the response into canonical [`jobscout_core::JobPosting`]s.
//! Adapter failures never reach orchestrator callers: the orchestrator
//! absorbs them into empty result sets with a logged diagnostic.

pub mod error;
pub mod orchestrator;

mod adzuna;
mod arbeitnow;
mod helpers;
mod jooble;
mod remotive;
mod usajobs;
mod wwr_rss;

pub use error::SourceError;
pub use orchestrator::{JobSearchClient, SearchOutcome, SourceCredentials};
