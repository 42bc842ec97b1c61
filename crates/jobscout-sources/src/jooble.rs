//! Jooble search API adapter.
//!
//! Jooble takes the API key as a URL path segment and the search as a JSON
//! request body. Responses carry display-ready salary and job-type strings,
//! which are passed through as-is (empty strings become absent).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobscout_core::{JobPosting, JobSource, SearchFilters};

use crate::error::SourceError;

const BASE_URL: &str = "https://jooble.org/api";

#[derive(Debug, Serialize)]
struct JoobleRequest<'a> {
    keywords: &'a str,
    location: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    salary: Option<u64>,
    page: u32,
}

#[derive(Debug, Deserialize)]
struct JoobleResponse {
    #[serde(default)]
    jobs: Vec<JoobleJob>,
}

#[derive(Debug, Deserialize)]
struct JoobleJob {
    id: Option<serde_json::Value>,
    title: Option<String>,
    location: Option<String>,
    snippet: Option<String>,
    salary: Option<String>,
    #[serde(rename = "type")]
    job_type: Option<String>,
    link: Option<String>,
    company: Option<String>,
    updated: Option<String>,
}

/// Fetch postings from Jooble.
///
/// # Errors
///
/// Returns [`SourceError::MissingCredentials`] when no API key is
/// configured, [`SourceError::Http`] on transport failure, or
/// [`SourceError::Status`] on a non-2xx response.
pub(crate) async fn fetch(
    client: &reqwest::Client,
    api_key: Option<&str>,
    filters: &SearchFilters,
    limit: usize,
) -> Result<Vec<JobPosting>, SourceError> {
    let Some(api_key) = api_key else {
        return Err(SourceError::MissingCredentials { provider: "jooble" });
    };

    let body = JoobleRequest {
        keywords: filters.query.as_deref().unwrap_or(""),
        location: filters.location.as_deref().unwrap_or(""),
        radius: filters.distance_km,
        salary: filters.min_salary,
        page: 1,
    };

    let url = format!("{BASE_URL}/{api_key}");
    let response = client.post(&url).json(&body).send().await?;
    if !response.status().is_success() {
        return Err(SourceError::Status {
            provider: "jooble",
            status: response.status().as_u16(),
        });
    }

    let payload: JoobleResponse = response.json().await?;
    Ok(payload.jobs.into_iter().take(limit).map(map_job).collect())
}

fn map_job(raw: JoobleJob) -> JobPosting {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    JobPosting {
        id: raw
            .id
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or_default(),
        source: JobSource::Jooble,
        title: non_empty(raw.title).unwrap_or_else(|| "Untitled Position".to_string()),
        company: non_empty(raw.company),
        location: non_empty(raw.location),
        description: non_empty(raw.snippet),
        salary: non_empty(raw.salary),
        url: non_empty(raw.link),
        date_posted: raw
            .updated
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
        job_type: non_empty(raw.job_type),
        skills: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "totalCount": 2,
        "jobs": [
            {
                "id": 998877,
                "title": "Data Engineer",
                "location": "Berlin",
                "snippet": "Pipelines and warehouses.",
                "salary": "€65,000",
                "type": "Full-time",
                "link": "https://jooble.example/998877",
                "company": "DataWorks",
                "updated": "2025-05-18T00:00:00.0000000+00:00"
            },
            {
                "id": "abc-1",
                "title": "Courier",
                "location": "",
                "snippet": "",
                "salary": "",
                "type": "",
                "link": "https://jooble.example/abc-1",
                "company": "",
                "updated": null
            }
        ]
    }"#;

    #[test]
    fn maps_display_strings_through() {
        let payload: JoobleResponse = serde_json::from_str(SAMPLE).unwrap();
        let job = map_job(payload.jobs.into_iter().next().unwrap());

        assert_eq!(job.id, "998877");
        assert_eq!(job.source, JobSource::Jooble);
        assert_eq!(job.salary.as_deref(), Some("€65,000"));
        assert_eq!(job.job_type.as_deref(), Some("Full-time"));
    }

    #[test]
    fn empty_strings_become_absent() {
        let payload: JoobleResponse = serde_json::from_str(SAMPLE).unwrap();
        let job = map_job(payload.jobs.into_iter().nth(1).unwrap());

        assert!(job.company.is_none());
        assert!(job.location.is_none());
        assert!(job.salary.is_none());
        assert!(job.job_type.is_none());
        assert_eq!(job.salary_display(), "Negotiable");
    }
}
