//! Search orchestration across all enabled source adapters.
//!
//! Fans a [`SearchFilters`] request out to every requested adapter
//! concurrently, absorbs per-adapter failures into empty result sets with a
//! logged diagnostic, then merges, post-filters, and sorts. A failure in
//! one adapter never cancels or delays the others.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future;

use jobscout_core::{AppConfig, JobPosting, JobSource, SearchFilters, SortBy};

use crate::error::SourceError;
use crate::helpers::extract_salary_floor;
use crate::{adzuna, arbeitnow, jooble, remotive, usajobs, wwr_rss};

/// Per-adapter result ceiling when the caller does not specify a limit.
const DEFAULT_SOURCE_LIMIT: usize = 20;

/// Provider credentials, all optional. A missing credential degrades that
/// one adapter to always-empty without affecting the others.
#[derive(Debug, Clone, Default)]
pub struct SourceCredentials {
    pub adzuna_app_id: Option<String>,
    pub adzuna_app_key: Option<String>,
    pub jooble_api_key: Option<String>,
    pub usajobs_api_key: Option<String>,
    pub usajobs_contact_email: Option<String>,
}

impl SourceCredentials {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            adzuna_app_id: config.adzuna_app_id.clone(),
            adzuna_app_key: config.adzuna_app_key.clone(),
            jooble_api_key: config.jooble_api_key.clone(),
            usajobs_api_key: config.usajobs_api_key.clone(),
            usajobs_contact_email: config.usajobs_contact_email.clone(),
        }
    }
}

/// Result of one orchestrated search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub jobs: Vec<JobPosting>,
    /// Postings contributed per source, before post-filtering. A failed
    /// source records 0 — indistinguishable here from a legitimate empty
    /// result; the distinction lives in the warn-level logs.
    pub per_source_counts: BTreeMap<JobSource, usize>,
}

/// Client for orchestrated multi-source job search.
#[derive(Clone)]
pub struct JobSearchClient {
    client: reqwest::Client,
    credentials: SourceCredentials,
}

impl JobSearchClient {
    /// Creates a client with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(credentials: SourceCredentials, timeout_secs: u64) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("jobscout/0.1 (job-search aggregation)")
            .build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    /// Run one search across every adapter named in `filters.api_sources`
    /// (default: all API adapters), concurrently.
    ///
    /// Never fails: each adapter's failure is absorbed into an empty
    /// contribution and logged. The merged list is post-filtered
    /// (company substring, salary floor, date window) and sorted by the
    /// requested strategy.
    pub async fn search(&self, filters: &SearchFilters) -> SearchOutcome {
        let limit = filters.limit.unwrap_or(DEFAULT_SOURCE_LIMIT);
        let sources = filters.sources();

        let fetches = sources.iter().map(|&source| async move {
            (source, self.fetch_source(source, filters, limit).await)
        });
        let results = future::join_all(fetches).await;

        let mut outcome = merge_source_results(results);
        apply_post_filters(&mut outcome.jobs, filters, Utc::now());
        sort_jobs(&mut outcome.jobs, filters.sort_by);
        outcome
    }

    async fn fetch_source(
        &self,
        source: JobSource,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<JobPosting>, SourceError> {
        match source {
            JobSource::Adzuna => {
                adzuna::fetch(
                    &self.client,
                    self.credentials.adzuna_app_id.as_deref(),
                    self.credentials.adzuna_app_key.as_deref(),
                    filters,
                    limit,
                )
                .await
            }
            JobSource::Jooble => {
                jooble::fetch(
                    &self.client,
                    self.credentials.jooble_api_key.as_deref(),
                    filters,
                    limit,
                )
                .await
            }
            JobSource::UsaJobs => {
                usajobs::fetch(
                    &self.client,
                    self.credentials.usajobs_api_key.as_deref(),
                    self.credentials.usajobs_contact_email.as_deref(),
                    filters,
                    limit,
                )
                .await
            }
            JobSource::Remotive => remotive::fetch(&self.client, filters, limit).await,
            JobSource::Arbeitnow => arbeitnow::fetch(&self.client, filters, limit).await,
            JobSource::WeWorkRemotely => wwr_rss::fetch(&self.client, filters, limit).await,
            // The scraping path aggregates separately; an explicit request
            // for it through the API fan-out contributes nothing here.
            JobSource::Scraped => Ok(Vec::new()),
        }
    }
}

/// Merge per-source results, absorbing failures into empty contributions.
///
/// Adapter order is preserved in the concatenated list — it already
/// reflects each provider's own relevance ranking.
fn merge_source_results(
    results: Vec<(JobSource, Result<Vec<JobPosting>, SourceError>)>,
) -> SearchOutcome {
    let mut jobs = Vec::new();
    let mut per_source_counts = BTreeMap::new();

    for (source, result) in results {
        match result {
            Ok(batch) => {
                per_source_counts.insert(source, batch.len());
                jobs.extend(batch);
            }
            Err(e) => {
                tracing::warn!(source = %source, error = %e, "source fetch failed; contributing no results");
                per_source_counts.insert(source, 0);
            }
        }
    }

    SearchOutcome {
        jobs,
        per_source_counts,
    }
}

/// Client-side filters for fields not every provider supports server-side.
///
/// When `min_salary` is set, postings whose display salary yields no
/// parseable number are excluded — "Negotiable" gives no evidence the floor
/// is met. When a date window is active, undated postings are excluded for
/// the same reason.
fn apply_post_filters(jobs: &mut Vec<JobPosting>, filters: &SearchFilters, now: DateTime<Utc>) {
    if let Some(company) = &filters.company {
        let needle = company.to_lowercase();
        jobs.retain(|job| {
            job.company
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle))
        });
    }

    if let Some(min_salary) = filters.min_salary {
        jobs.retain(|job| {
            job.salary
                .as_deref()
                .and_then(extract_salary_floor)
                .is_some_and(|floor| floor >= min_salary)
        });
    }

    if let Some(cutoff) = filters.date_posted.cutoff(now) {
        jobs.retain(|job| job.date_posted.is_some_and(|posted| posted >= cutoff));
    }
}

/// Sort the merged list by the requested strategy.
///
/// `Date` sorts descending with undated postings last (stable among ties).
/// `Salary` moves postings that state a salary first, with no further
/// refinement. `Relevance` preserves adapter order.
fn sort_jobs(jobs: &mut [JobPosting], sort_by: SortBy) {
    match sort_by {
        SortBy::Date => jobs.sort_by_key(|job| std::cmp::Reverse(job.date_posted)),
        SortBy::Salary => jobs.sort_by_key(|job| job.salary.is_none()),
        SortBy::Relevance => {}
    }
}

/// Deduplicate by normalized `(title, company)` lowercase pair — first
/// occurrence wins. Used by the scraping aggregation path, where the same
/// posting routinely appears on multiple boards.
#[must_use]
pub fn dedupe_by_title_company(jobs: Vec<JobPosting>) -> Vec<JobPosting> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    jobs.into_iter()
        .filter(|job| {
            seen.insert((
                job.title.to_lowercase(),
                job.company.as_deref().unwrap_or_default().to_lowercase(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jobscout_core::DatePostedWindow;

    fn posting(source: JobSource, id: &str, title: &str) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            source,
            title: title.to_string(),
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
    fn failed_source_does_not_lose_other_results() {
        let results = vec![
            (
                JobSource::Adzuna,
                Err(SourceError::MissingCredentials { provider: "adzuna" }),
            ),
            (
                JobSource::Remotive,
                Ok(vec![posting(JobSource::Remotive, "1", "Rust Engineer")]),
            ),
            (JobSource::Arbeitnow, Ok(Vec::new())),
        ];

        let outcome = merge_source_results(results);

        assert_eq!(outcome.jobs.len(), 1);
        assert_eq!(outcome.per_source_counts[&JobSource::Adzuna], 0);
        assert_eq!(outcome.per_source_counts[&JobSource::Remotive], 1);
        assert_eq!(outcome.per_source_counts[&JobSource::Arbeitnow], 0);
    }

    #[test]
    fn date_sort_places_undated_last_and_dated_descending() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let mut jobs = vec![
            posting(JobSource::Remotive, "1", "undated"),
            {
                let mut j = posting(JobSource::Remotive, "2", "older");
                j.date_posted = Some(now - chrono::Duration::days(5));
                j
            },
            {
                let mut j = posting(JobSource::Remotive, "3", "newest");
                j.date_posted = Some(now);
                j
            },
        ];

        sort_jobs(&mut jobs, SortBy::Date);

        assert_eq!(jobs[0].title, "newest");
        assert_eq!(jobs[1].title, "older");
        assert_eq!(jobs[2].title, "undated");
    }

    #[test]
    fn salary_sort_moves_priced_postings_first() {
        let mut jobs = vec![
            posting(JobSource::Remotive, "1", "no salary"),
            {
                let mut j = posting(JobSource::Remotive, "2", "priced");
                j.salary = Some("$90,000".to_string());
                j
            },
        ];

        sort_jobs(&mut jobs, SortBy::Salary);

        assert_eq!(jobs[0].title, "priced");
        assert_eq!(jobs[1].title, "no salary");
    }

    #[test]
    fn relevance_sort_preserves_adapter_order() {
        let mut jobs = vec![
            posting(JobSource::Adzuna, "1", "first"),
            posting(JobSource::Jooble, "2", "second"),
        ];
        sort_jobs(&mut jobs, SortBy::Relevance);
        assert_eq!(jobs[0].title, "first");
        assert_eq!(jobs[1].title, "second");
    }

    #[test]
    fn company_filter_is_case_insensitive_substring() {
        let mut jobs = vec![
            {
                let mut j = posting(JobSource::Remotive, "1", "keep");
                j.company = Some("Acme Corp".to_string());
                j
            },
            {
                let mut j = posting(JobSource::Remotive, "2", "drop");
                j.company = Some("Other Inc".to_string());
                j
            },
            posting(JobSource::Remotive, "3", "no company"),
        ];
        let filters = SearchFilters {
            company: Some("acme".to_string()),
            ..SearchFilters::default()
        };

        apply_post_filters(&mut jobs, &filters, Utc::now());

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "keep");
    }

    #[test]
    fn salary_floor_excludes_low_and_unparseable() {
        let mut jobs = vec![
            {
                let mut j = posting(JobSource::Remotive, "1", "high");
                j.salary = Some("$95,000 - $120,000".to_string());
                j
            },
            {
                let mut j = posting(JobSource::Remotive, "2", "low");
                j.salary = Some("$40,000".to_string());
                j
            },
            {
                let mut j = posting(JobSource::Remotive, "3", "negotiable");
                j.salary = Some("Negotiable".to_string());
                j
            },
        ];
        let filters = SearchFilters {
            min_salary: Some(90_000),
            ..SearchFilters::default()
        };

        apply_post_filters(&mut jobs, &filters, Utc::now());

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "high");
    }

    #[test]
    fn date_window_excludes_old_and_undated() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap();
        let mut jobs = vec![
            {
                let mut j = posting(JobSource::Remotive, "1", "fresh");
                j.date_posted = Some(now - chrono::Duration::days(2));
                j
            },
            {
                let mut j = posting(JobSource::Remotive, "2", "stale");
                j.date_posted = Some(now - chrono::Duration::days(20));
                j
            },
            posting(JobSource::Remotive, "3", "undated"),
        ];
        let filters = SearchFilters {
            date_posted: DatePostedWindow::Week,
            ..SearchFilters::default()
        };

        apply_post_filters(&mut jobs, &filters, now);

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "fresh");
    }

    #[test]
    fn dedup_keeps_first_occurrence_across_sources() {
        let jobs = vec![
            {
                let mut j = posting(JobSource::Remotive, "1", "Backend Developer");
                j.company = Some("Acme".to_string());
                j
            },
            {
                let mut j = posting(JobSource::Jooble, "2", "backend developer");
                j.company = Some("ACME".to_string());
                j
            },
            {
                let mut j = posting(JobSource::Jooble, "3", "Backend Developer");
                j.company = Some("Globex".to_string());
                j
            },
        ];

        let deduped = dedupe_by_title_company(jobs);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].source, JobSource::Remotive, "first occurrence wins");
        assert_eq!(deduped[1].company.as_deref(), Some("Globex"));
    }
}
