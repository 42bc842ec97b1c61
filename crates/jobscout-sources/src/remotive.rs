//! Remotive remote-jobs API adapter (free, no credentials).

use chrono::NaiveDateTime;
use serde::Deserialize;

use jobscout_core::{JobPosting, JobSource, SearchFilters};

use crate::error::SourceError;
use crate::helpers::strip_html;

const BASE_URL: &str = "https://remotive.com/api/remote-jobs";

#[derive(Debug, Deserialize)]
struct RemotiveResponse {
    #[serde(default)]
    jobs: Vec<RemotiveJob>,
}

#[derive(Debug, Deserialize)]
struct RemotiveJob {
    id: Option<i64>,
    url: Option<String>,
    title: Option<String>,
    company_name: Option<String>,
    job_type: Option<String>,
    // No timezone offset in Remotive timestamps; interpreted as UTC.
    publication_date: Option<String>,
    candidate_required_location: Option<String>,
    salary: Option<String>,
    description: Option<String>,
}

/// Fetch postings from Remotive.
///
/// Remotive supports `search` and `limit` server-side; everything else is
/// left to the orchestrator's post-filters.
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
    let mut params: Vec<(&str, String)> = vec![("limit", limit.to_string())];
    if let Some(query) = &filters.query {
        params.push(("search", query.clone()));
    }

    let response = client.get(BASE_URL).query(&params).send().await?;
    if !response.status().is_success() {
        return Err(SourceError::Status {
            provider: "remotive",
            status: response.status().as_u16(),
        });
    }

    let payload: RemotiveResponse = response.json().await?;
    Ok(payload.jobs.into_iter().take(limit).map(map_job).collect())
}

fn map_job(raw: RemotiveJob) -> JobPosting {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    JobPosting {
        id: raw.id.map(|id| id.to_string()).unwrap_or_default(),
        source: JobSource::Remotive,
        title: non_empty(raw.title).unwrap_or_else(|| "Untitled Position".to_string()),
        company: non_empty(raw.company_name),
        location: non_empty(raw.candidate_required_location),
        description: non_empty(raw.description).map(|html| strip_html(&html)),
        salary: non_empty(raw.salary),
        url: non_empty(raw.url),
        date_posted: raw
            .publication_date
            .as_deref()
            .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
            .map(|naive| naive.and_utc()),
        job_type: non_empty(raw.job_type).map(|jt| normalize_job_type(&jt)),
        skills: Vec::new(),
    }
}

fn normalize_job_type(raw: &str) -> String {
    match raw {
        "full_time" => "Full-time".to_string(),
        "part_time" => "Part-time".to_string(),
        "contract" => "Contract".to_string(),
        "internship" => "Internship".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "job-count": 1,
        "jobs": [
            {
                "id": 1907000,
                "url": "https://remotive.com/remote-jobs/software-dev/rust-engineer-1907000",
                "title": "Rust Engineer",
                "company_name": "Ferrous Systems",
                "category": "Software Development",
                "job_type": "full_time",
                "publication_date": "2025-05-21T09:02:26",
                "candidate_required_location": "Worldwide",
                "salary": "",
                "description": "<p>Work on <b>async</b> services.</p>"
            }
        ]
    }"#;

    #[test]
    fn maps_and_strips_html_description() {
        let payload: RemotiveResponse = serde_json::from_str(SAMPLE).unwrap();
        let job = map_job(payload.jobs.into_iter().next().unwrap());

        assert_eq!(job.id, "1907000");
        assert_eq!(job.source, JobSource::Remotive);
        assert_eq!(job.description.as_deref(), Some("Work on async services."));
        assert_eq!(job.job_type.as_deref(), Some("Full-time"));
        assert!(job.salary.is_none(), "empty salary string must become absent");
        assert!(job.date_posted.is_some());
    }
}
