//! Arbeitnow job-board API adapter (free, no credentials).
//!
//! The endpoint takes no search parameters, so this adapter fetches the
//! provider's first page and filters client-side: every query term must
//! occur in the title or description before a posting is kept.

use chrono::DateTime;
use serde::Deserialize;

use jobscout_core::{JobPosting, JobSource, SearchFilters};

use crate::error::SourceError;
use crate::helpers::{matches_query, strip_html};

const BASE_URL: &str = "https://www.arbeitnow.com/api/job-board-api";

#[derive(Debug, Deserialize)]
struct ArbeitnowResponse {
    #[serde(default)]
    data: Vec<ArbeitnowJob>,
}

#[derive(Debug, Deserialize)]
struct ArbeitnowJob {
    slug: Option<String>,
    company_name: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    job_types: Vec<String>,
    location: Option<String>,
    created_at: Option<i64>,
}

/// Fetch postings from Arbeitnow.
///
/// # Errors
///
/// Returns [`SourceError::Http`] on transport failure or
/// [`SourceError::Status`] on a non-2xx response.
pub(crate) async fn fetch(
    client: &reqwest::Client,
    filters: &SearchFilters,
    limit: usize,
) -> Result<Vec<JobPosting>, SourceError> {
    let response = client.get(BASE_URL).send().await?;
    if !response.status().is_success() {
        return Err(SourceError::Status {
            provider: "arbeitnow",
            status: response.status().as_u16(),
        });
    }

    let payload: ArbeitnowResponse = response.json().await?;
    Ok(filter_and_map(payload.data, filters, limit))
}

fn filter_and_map(
    raw: Vec<ArbeitnowJob>,
    filters: &SearchFilters,
    limit: usize,
) -> Vec<JobPosting> {
    raw.into_iter()
        .map(map_job)
        .filter(|job| match &filters.query {
            Some(query) => {
                let haystack = format!(
                    "{} {}",
                    job.title,
                    job.description.as_deref().unwrap_or("")
                );
                matches_query(&haystack, query)
            }
            None => true,
        })
        .take(limit)
        .collect()
}

fn map_job(raw: ArbeitnowJob) -> JobPosting {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    JobPosting {
        id: raw.slug.unwrap_or_default(),
        source: JobSource::Arbeitnow,
        title: non_empty(raw.title).unwrap_or_else(|| "Untitled Position".to_string()),
        company: non_empty(raw.company_name),
        location: non_empty(raw.location),
        description: non_empty(raw.description).map(|html| strip_html(&html)),
        salary: None,
        url: non_empty(raw.url),
        date_posted: raw.created_at.and_then(|secs| DateTime::from_timestamp(secs, 0)),
        job_type: raw.job_types.into_iter().next(),
        skills: raw.tags,
    }
}
