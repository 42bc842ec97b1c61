//! USAJobs search API adapter.
//!
//! USAJobs authenticates with an `Authorization-Key` header and requires
//! the registered contact email as the `User-Agent` value. Remuneration
//! comes as string-typed min/max ranges that are formatted into the
//! canonical display salary.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use jobscout_core::{JobPosting, JobSource, SearchFilters};

use crate::error::SourceError;
use crate::helpers::format_salary_range;

const BASE_URL: &str = "https://data.usajobs.gov/api/search";

#[derive(Debug, Deserialize)]
struct UsaJobsResponse {
    #[serde(rename = "SearchResult")]
    search_result: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "SearchResultItems", default)]
    items: Vec<SearchResultItem>,
}

#[derive(Debug, Deserialize)]
struct SearchResultItem {
    #[serde(rename = "MatchedObjectId")]
    id: Option<String>,
    #[serde(rename = "MatchedObjectDescriptor")]
    descriptor: Descriptor,
}

#[derive(Debug, Deserialize)]
struct Descriptor {
    #[serde(rename = "PositionTitle")]
    title: Option<String>,
    #[serde(rename = "OrganizationName")]
    organization: Option<String>,
    #[serde(rename = "PositionLocationDisplay")]
    location: Option<String>,
    #[serde(rename = "PositionURI")]
    uri: Option<String>,
    #[serde(rename = "PublicationStartDate")]
    published: Option<String>,
    #[serde(rename = "PositionRemuneration", default)]
    remuneration: Vec<Remuneration>,
    #[serde(rename = "PositionSchedule", default)]
    schedule: Vec<Schedule>,
    #[serde(rename = "UserArea")]
    user_area: Option<UserArea>,
}

#[derive(Debug, Deserialize)]
struct Remuneration {
    #[serde(rename = "MinimumRange")]
    min: Option<String>,
    #[serde(rename = "MaximumRange")]
    max: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Schedule {
    #[serde(rename = "Name")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserArea {
    #[serde(rename = "Details")]
    details: Option<Details>,
}

#[derive(Debug, Deserialize)]
struct Details {
    #[serde(rename = "JobSummary")]
    summary: Option<String>,
}

/// Fetch postings from USAJobs.
///
/// # Errors
///
/// Returns [`SourceError::MissingCredentials`] when the API key or contact
/// email is not configured, [`SourceError::Http`] on transport failure, or
/// [`SourceError::Status`] on a non-2xx response.
pub(crate) async fn fetch(
    client: &reqwest::Client,
    api_key: Option<&str>,
    contact_email: Option<&str>,
    filters: &SearchFilters,
    limit: usize,
) -> Result<Vec<JobPosting>, SourceError> {
    let (Some(api_key), Some(contact_email)) = (api_key, contact_email) else {
        return Err(SourceError::MissingCredentials { provider: "usajobs" });
    };

    let mut params: Vec<(&str, String)> = vec![("ResultsPerPage", limit.to_string())];
    if let Some(query) = &filters.query {
        params.push(("Keyword", query.clone()));
    }
    if let Some(location) = &filters.location {
        params.push(("LocationName", location.clone()));
        if let Some(distance) = filters.distance_km {
            // USAJobs takes radius in miles.
            params.push(("Radius", (f64::from(distance) / 1.609).round().to_string()));
        }
    }
    if let Some(days) = filters.date_posted.max_days_old() {
        params.push(("DatePosted", days.to_string()));
    }
    match filters.job_type.as_deref() {
        Some("full-time") => params.push(("PositionScheduleTypeCode", "1".to_string())),
        Some("part-time") => params.push(("PositionScheduleTypeCode", "2".to_string())),
        _ => {}
    }

    let response = client
        .get(BASE_URL)
        .query(&params)
        .header("Authorization-Key", api_key)
        .header("User-Agent", contact_email)
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(SourceError::Status {
            provider: "usajobs",
            status: response.status().as_u16(),
        });
    }

    let payload: UsaJobsResponse = response.json().await?;
    let items = payload.search_result.map(|r| r.items).unwrap_or_default();
    Ok(items.into_iter().take(limit).map(map_item).collect())
}

fn map_item(raw: SearchResultItem) -> JobPosting {
    let descriptor = raw.descriptor;
    let salary = descriptor
        .remuneration
        .first()
        .and_then(|r| format_salary_range(parse_range(r.min.as_deref()), parse_range(r.max.as_deref())));
    JobPosting {
        id: raw.id.unwrap_or_default(),
        source: JobSource::UsaJobs,
        title: descriptor
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled Position".to_string()),
        company: descriptor.organization,
        location: descriptor.location,
        description: descriptor
            .user_area
            .and_then(|ua| ua.details)
            .and_then(|d| d.summary),
        salary,
        url: descriptor.uri,
        date_posted: descriptor.published.as_deref().and_then(parse_publication_date),
        job_type: descriptor.schedule.into_iter().find_map(|s| s.name),
        skills: Vec::new(),
    }
}

fn parse_range(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| *v > 0.0)
}

/// USAJobs publication dates arrive as either a bare date or a local
/// datetime without offset; both are interpreted as UTC.
fn parse_publication_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
