use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External providers a posting can originate from. One tag per adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSource {
    Adzuna,
    Jooble,
    UsaJobs,
    Remotive,
    Arbeitnow,
    WeWorkRemotely,
    /// Postings harvested from scraped boards rather than a search API.
    Scraped,
}

impl JobSource {
    /// All API-backed adapters, in dispatch order. Excludes [`JobSource::Scraped`],
    /// which is driven by its own aggregation path.
    pub const ALL_APIS: [JobSource; 6] = [
        JobSource::Adzuna,
        JobSource::Jooble,
        JobSource::UsaJobs,
        JobSource::Remotive,
        JobSource::Arbeitnow,
        JobSource::WeWorkRemotely,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            JobSource::Adzuna => "adzuna",
            JobSource::Jooble => "jooble",
            JobSource::UsaJobs => "usa_jobs",
            JobSource::Remotive => "remotive",
            JobSource::Arbeitnow => "arbeitnow",
            JobSource::WeWorkRemotely => "we_work_remotely",
            JobSource::Scraped => "scraped",
        }
    }
}

impl std::fmt::Display for JobSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adzuna" => Ok(JobSource::Adzuna),
            "jooble" => Ok(JobSource::Jooble),
            "usa_jobs" => Ok(JobSource::UsaJobs),
            "remotive" => Ok(JobSource::Remotive),
            "arbeitnow" => Ok(JobSource::Arbeitnow),
            "we_work_remotely" => Ok(JobSource::WeWorkRemotely),
            "scraped" => Ok(JobSource::Scraped),
            other => Err(format!("unknown job source '{other}'")),
        }
    }
}

/// A job posting normalized from any provider.
///
/// Providers do not produce globally unique identifiers, so identity is the
/// `(source, id)` pair — see [`JobPosting::fingerprint`]. `title` and
/// `source` are always present; every other field may be absent and absence
/// means *unknown*, not empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    /// Provider-local identifier. Unique only within `source`.
    pub id: String,
    pub source: JobSource,
    /// Always present. Adapters substitute `"Untitled Position"` when the
    /// provider omits a title rather than emitting an empty string.
    pub title: String,
    pub company: Option<String>,
    /// Free-text location as the provider rendered it.
    pub location: Option<String>,
    pub description: Option<String>,
    /// Pre-formatted display string (e.g. `"$70,000 - $90,000"`). No
    /// canonical numeric form is guaranteed across providers.
    pub salary: Option<String>,
    pub url: Option<String>,
    pub date_posted: Option<DateTime<Utc>>,
    /// Loosely normalized per source (`"Full-time"`, `"Contract"`, ...).
    pub job_type: Option<String>,
    /// Technology keywords. Populated only by the scraping adapter, which
    /// derives them heuristically; API adapters leave this empty.
    #[serde(default)]
    pub skills: Vec<String>,
}

impl JobPosting {
    /// Source-qualified identity used as the cache and dedup key.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        format!("{}:{}", self.source, self.id)
    }

    /// Display salary, rendering absent values as `"Negotiable"`.
    #[must_use]
    pub fn salary_display(&self) -> &str {
        self.salary.as_deref().unwrap_or("Negotiable")
    }
}

/// Relative posting-age window for search filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePostedWindow {
    Today,
    Yesterday,
    Week,
    Month,
    #[default]
    Any,
}

impl DatePostedWindow {
    /// Oldest acceptable posting date for this window, or `None` for [`Self::Any`].
    #[must_use]
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = match self {
            DatePostedWindow::Today => 1,
            DatePostedWindow::Yesterday => 2,
            DatePostedWindow::Week => 7,
            DatePostedWindow::Month => 30,
            DatePostedWindow::Any => return None,
        };
        Some(now - chrono::Duration::days(days))
    }

    /// Window length in days, where the provider API takes a `max_days_old`
    /// style parameter. `None` for [`Self::Any`].
    #[must_use]
    pub const fn max_days_old(self) -> Option<u32> {
        match self {
            DatePostedWindow::Today => Some(1),
            DatePostedWindow::Yesterday => Some(2),
            DatePostedWindow::Week => Some(7),
            DatePostedWindow::Month => Some(30),
            DatePostedWindow::Any => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Relevance,
    Date,
    Salary,
}

/// A search request as issued by callers and fanned out to adapters.
///
/// Each adapter translates these fields into its provider's own parameter
/// shape; fields a provider cannot express are enforced client-side by the
/// orchestrator's post-filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub location: Option<String>,
    /// Canonical job-type text (`"full-time"`, `"part-time"`, `"contract"`,
    /// `"internship"`). Adapters map this onto provider enumerations.
    pub job_type: Option<String>,
    pub distance_km: Option<u32>,
    pub min_salary: Option<u64>,
    /// Substring match on company, applied client-side.
    pub company: Option<String>,
    #[serde(default)]
    pub date_posted: DatePostedWindow,
    #[serde(default)]
    pub sort_by: SortBy,
    /// Adapters to query. Absent means all API adapters.
    pub api_sources: Option<Vec<JobSource>>,
    pub limit: Option<usize>,
}

impl SearchFilters {
    /// The adapters this search should fan out to.
    #[must_use]
    pub fn sources(&self) -> Vec<JobSource> {
        self.api_sources
            .clone()
            .unwrap_or_else(|| JobSource::ALL_APIS.to_vec())
    }
}

/// Profile summary supplied by the user-profile collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfileSummary {
    pub job_title: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    /// Most recent first.
    #[serde(default)]
    pub experiences: Vec<ExperienceSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceSummary {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A single personalized recommendation, persisted per user and replaced
/// wholesale on every generation cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub job: JobPosting,
    /// 0–100 integer percentage.
    pub match_percentage: u8,
    pub match_reason: String,
    /// Profile skills found verbatim (case-insensitive) in the job description.
    #[serde(default)]
    pub skill_matches: Vec<String>,
}

/// Scheduler settings owned by the admin-config collaborator.
///
/// Read at startup and whenever the scheduler is told to re-arm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Daily trigger time, `"HH:MM"` (24h, UTC).
    pub daily_run_time: String,
    /// API sources the batch may use. Absent means all.
    pub allowed_api_sources: Option<Vec<JobSource>>,
    /// Model name passed to the local generative backend for reranking.
    pub rerank_model: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            daily_run_time: "07:00".to_string(),
            allowed_api_sources: None,
            rerank_model: "llama3.1".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn posting(source: JobSource, id: &str) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            source,
            title: "Backend Developer".to_string(),
            company: None,
            location: None,
            description: None,
            salary: None,
            url: None,
            date_posted: None,
            job_type: None,
            skills: Vec::new(),
        }
    }

    #[test]
    fn fingerprint_is_source_qualified() {
        let job = posting(JobSource::Adzuna, "12345");
        assert_eq!(job.fingerprint(), "adzuna:12345");
    }

    #[test]
    fn same_id_different_source_distinct_fingerprints() {
        let a = posting(JobSource::Adzuna, "1");
        let b = posting(JobSource::Jooble, "1");
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn absent_salary_renders_negotiable() {
        let job = posting(JobSource::Remotive, "x");
        assert_eq!(job.salary_display(), "Negotiable");
    }

    #[test]
    fn present_salary_renders_as_is() {
        let mut job = posting(JobSource::Remotive, "x");
        job.salary = Some("$70,000 - $90,000".to_string());
        assert_eq!(job.salary_display(), "$70,000 - $90,000");
    }

    #[test]
    fn any_window_has_no_cutoff() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert!(DatePostedWindow::Any.cutoff(now).is_none());
    }

    #[test]
    fn week_window_cutoff_is_seven_days_back() {
        let now = Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 0).unwrap();
        let cutoff = DatePostedWindow::Week.cutoff(now).unwrap();
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn filters_default_to_all_api_sources() {
        let filters = SearchFilters::default();
        assert_eq!(filters.sources(), JobSource::ALL_APIS.to_vec());
    }

    #[test]
    fn filters_respect_explicit_sources() {
        let filters = SearchFilters {
            api_sources: Some(vec![JobSource::Remotive]),
            ..SearchFilters::default()
        };
        assert_eq!(filters.sources(), vec![JobSource::Remotive]);
    }

    #[test]
    fn job_source_serializes_snake_case() {
        let json = serde_json::to_string(&JobSource::WeWorkRemotely).unwrap();
        assert_eq!(json, "\"we_work_remotely\"");
    }
}
