//! Adzuna search API adapter.
//!
//! Requires an application id + key pair. Adzuna supports most filter
//! fields server-side (`what`, `where`, `distance`, `salary_min`,
//! `max_days_old`, `sort_by`, contract-time flags), so this adapter pushes
//! as much of the request down to the provider as possible.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use jobscout_core::{JobPosting, JobSource, SearchFilters, SortBy};

use crate::error::SourceError;
use crate::helpers::format_salary_range;

const BASE_URL: &str = "https://api.adzuna.com/v1/api/jobs/us/search/1";

#[derive(Debug, Deserialize)]
struct AdzunaResponse {
    #[serde(default)]
    results: Vec<AdzunaJob>,
}

#[derive(Debug, Deserialize)]
struct AdzunaJob {
    id: Option<serde_json::Value>,
    title: Option<String>,
    description: Option<String>,
    company: Option<AdzunaCompany>,
    location: Option<AdzunaLocation>,
    salary_min: Option<f64>,
    salary_max: Option<f64>,
    redirect_url: Option<String>,
    created: Option<String>,
    contract_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdzunaCompany {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdzunaLocation {
    display_name: Option<String>,
}

/// Fetch postings from Adzuna.
///
/// # Errors
///
/// Returns [`SourceError::MissingCredentials`] when no app id/key pair is
/// configured, [`SourceError::Http`] on transport failure, or
/// [`SourceError::Status`] on a non-2xx response.
pub(crate) async fn fetch(
    client: &reqwest::Client,
    app_id: Option<&str>,
    app_key: Option<&str>,
    filters: &SearchFilters,
    limit: usize,
) -> Result<Vec<JobPosting>, SourceError> {
    let (Some(app_id), Some(app_key)) = (app_id, app_key) else {
        return Err(SourceError::MissingCredentials { provider: "adzuna" });
    };

    let mut params: Vec<(&str, String)> = vec![
        ("app_id", app_id.to_string()),
        ("app_key", app_key.to_string()),
        ("results_per_page", limit.to_string()),
        ("content-type", "application/json".to_string()),
    ];
    if let Some(query) = &filters.query {
        params.push(("what", query.clone()));
    }
    if let Some(location) = &filters.location {
        params.push(("where", location.clone()));
    }
    if let Some(distance) = filters.distance_km {
        params.push(("distance", distance.to_string()));
    }
    if let Some(min_salary) = filters.min_salary {
        params.push(("salary_min", min_salary.to_string()));
    }
    if let Some(days) = filters.date_posted.max_days_old() {
        params.push(("max_days_old", days.to_string()));
    }
    match filters.sort_by {
        SortBy::Date => params.push(("sort_by", "date".to_string())),
        SortBy::Salary => params.push(("sort_by", "salary".to_string())),
        SortBy::Relevance => {}
    }
    // Adzuna expresses job type as boolean contract flags rather than an enum.
    match filters.job_type.as_deref() {
        Some("full-time") => params.push(("full_time", "1".to_string())),
        Some("part-time") => params.push(("part_time", "1".to_string())),
        Some("contract") => params.push(("contract", "1".to_string())),
        _ => {}
    }

    let response = client.get(BASE_URL).query(&params).send().await?;
    if !response.status().is_success() {
        return Err(SourceError::Status {
            provider: "adzuna",
            status: response.status().as_u16(),
        });
    }

    let payload: AdzunaResponse = response.json().await?;
    Ok(payload
        .results
        .into_iter()
        .take(limit)
        .map(map_job)
        .collect())
}

fn map_job(raw: AdzunaJob) -> JobPosting {
    let id = raw
        .id
        .map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
        .unwrap_or_default();
    JobPosting {
        id,
        source: JobSource::Adzuna,
        title: raw
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled Position".to_string()),
        company: raw.company.and_then(|c| c.display_name),
        location: raw.location.and_then(|l| l.display_name),
        description: raw.description,
        salary: format_salary_range(raw.salary_min, raw.salary_max),
        url: raw.redirect_url,
        date_posted: raw
            .created
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
        job_type: raw.contract_time.map(|ct| normalize_contract_time(&ct)),
        skills: Vec::new(),
    }
}

fn normalize_contract_time(raw: &str) -> String {
    match raw {
        "full_time" => "Full-time".to_string(),
        "part_time" => "Part-time".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "results": [
            {
                "id": "4321",
                "title": "Backend Developer",
                "description": "Build services in Rust.",
                "company": {"display_name": "Acme Corp"},
                "location": {"display_name": "Austin, TX"},
                "salary_min": 95000.0,
                "salary_max": 120000.0,
                "redirect_url": "https://adzuna.example/4321",
                "created": "2025-05-20T08:00:00Z",
                "contract_time": "full_time"
            },
            {
                "id": 8765,
                "title": null,
                "description": null,
                "company": null,
                "location": null,
                "salary_min": null,
                "salary_max": null,
                "redirect_url": null,
                "created": null,
                "contract_time": null
            }
        ]
    }"#;

    #[test]
    fn maps_complete_posting() {
        let payload: AdzunaResponse = serde_json::from_str(SAMPLE).unwrap();
        let job = map_job(payload.results.into_iter().next().unwrap());

        assert_eq!(job.id, "4321");
        assert_eq!(job.source, JobSource::Adzuna);
        assert_eq!(job.title, "Backend Developer");
        assert_eq!(job.company.as_deref(), Some("Acme Corp"));
        assert_eq!(job.salary.as_deref(), Some("$95,000 - $120,000"));
        assert_eq!(job.job_type.as_deref(), Some("Full-time"));
        assert!(job.date_posted.is_some());
    }

    #[test]
    fn missing_fields_map_to_absent_with_title_default() {
        let payload: AdzunaResponse = serde_json::from_str(SAMPLE).unwrap();
        let job = map_job(payload.results.into_iter().nth(1).unwrap());

        assert_eq!(job.id, "8765");
        assert_eq!(job.title, "Untitled Position");
        assert!(job.company.is_none());
        assert!(job.salary.is_none(), "absent min/max must not fabricate a salary");
        assert_eq!(job.salary_display(), "Negotiable");
        assert!(job.date_posted.is_none());
    }
}
