//! Embedding-based recommendation generation.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use jobscout_core::{JobPosting, Recommendation, SearchFilters, UserProfileSummary};
use jobscout_sources::{JobSearchClient, SearchOutcome};

use crate::cache::EmbeddingCache;
use crate::embeddings::EmbeddingClient;
use crate::error::MatchError;
use crate::profile::{build_strategies, profile_embedding_text, SearchStrategy, FALLBACK_BUNDLES};
use crate::scorer::score_jobs;

/// Stop collecting once this many distinct jobs are pooled.
const MAX_POOL: usize = 30;
/// Recommendations returned per generation cycle.
const DEFAULT_TOP_N: usize = 10;

/// One executed search strategy and how many postings it returned.
/// Recorded for observability — the report shows exactly which queries
/// ran and what each contributed.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyAttempt {
    pub query: String,
    pub location: Option<String>,
    pub results: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationReport {
    pub recommendations: Vec<Recommendation>,
    pub strategies: Vec<StrategyAttempt>,
    pub jobs_processed: usize,
    pub threshold: u8,
}

/// Generates personalized recommendations for a profile.
pub struct RecommendationEngine {
    search: JobSearchClient,
    embedder: EmbeddingClient,
    cache: Arc<EmbeddingCache>,
    min_match_percentage: u8,
    top_n: usize,
}

impl RecommendationEngine {
    #[must_use]
    pub fn new(
        search: JobSearchClient,
        embedder: EmbeddingClient,
        cache: Arc<EmbeddingCache>,
        min_match_percentage: u8,
    ) -> Self {
        Self {
            search,
            embedder,
            cache,
            min_match_percentage,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Generate recommendations for `profile`.
    ///
    /// Strategies are executed in order through the orchestrator,
    /// accumulating distinct jobs until the pool is full; the generic
    /// fallback bundles run only when every profile-driven strategy came
    /// back empty. Pooled jobs are scored against the profile embedding
    /// in bounded windows, filtered by the minimum match percentage, and
    /// the top N returned.
    ///
    /// An unsearchable profile (no title, no skills, no explicit query)
    /// and a search that finds nothing both produce an empty *successful*
    /// report, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Embed`] only if the profile embedding itself
    /// cannot be computed — per-job scoring failures are absorbed.
    pub async fn generate(
        &self,
        profile: &UserProfileSummary,
        filters: &SearchFilters,
    ) -> Result<RecommendationReport, MatchError> {
        let strategies = build_strategies(
            profile,
            filters.query.as_deref(),
            filters.location.as_deref(),
        );
        if strategies.is_empty() {
            tracing::info!("profile yields no searchable strategy; returning empty report");
            return Ok(RecommendationReport {
                recommendations: Vec::new(),
                strategies: Vec::new(),
                jobs_processed: 0,
                threshold: self.min_match_percentage,
            });
        }

        let profile_vector = self
            .embedder
            .embed_one(&profile_embedding_text(profile))
            .await?;

        let (pool, attempts) = collect_jobs(strategies, |strategy| {
            let search_filters = SearchFilters {
                query: Some(strategy.query),
                location: strategy.location,
                ..filters.clone()
            };
            async move { self.search.search(&search_filters).await }
        })
        .await;

        let jobs_processed = pool.len();
        let mut scored = score_jobs(&self.cache, &self.embedder, &profile_vector, pool).await;
        scored.retain(|(_, pct)| *pct >= self.min_match_percentage);
        scored.sort_by_key(|(_, pct)| Reverse(*pct));
        scored.truncate(self.top_n);

        let recommendations = scored
            .into_iter()
            .map(|(job, pct)| build_recommendation(job, pct, profile))
            .collect::<Vec<_>>();

        tracing::info!(
            jobs_processed,
            returned = recommendations.len(),
            threshold = self.min_match_percentage,
            "recommendation generation complete"
        );

        Ok(RecommendationReport {
            recommendations,
            strategies: attempts,
            jobs_processed,
            threshold: self.min_match_percentage,
        })
    }
}

/// Execute `strategies` in order via `search`, accumulating distinct jobs
/// (by fingerprint) and stopping early once the pool is full. When every
/// profile-driven strategy returns nothing, the fixed fallback bundles
/// are tried in order, stopping at the first bundle that yields any
/// result.
async fn collect_jobs<F, Fut>(
    strategies: Vec<SearchStrategy>,
    search: F,
) -> (Vec<JobPosting>, Vec<StrategyAttempt>)
where
    F: Fn(SearchStrategy) -> Fut,
    Fut: Future<Output = SearchOutcome>,
{
    let mut pool: Vec<JobPosting> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut attempts: Vec<StrategyAttempt> = Vec::new();

    for strategy in strategies {
        run_strategy(&search, strategy, &mut pool, &mut seen, &mut attempts).await;
        if pool.len() >= MAX_POOL {
            break;
        }
    }

    if pool.is_empty() {
        tracing::info!("profile-driven strategies found nothing; trying fallback bundles");
        for bundle in FALLBACK_BUNDLES {
            let before = pool.len();
            for (query, location) in *bundle {
                let strategy = SearchStrategy {
                    query: (*query).to_string(),
                    location: location.map(ToOwned::to_owned),
                };
                run_strategy(&search, strategy, &mut pool, &mut seen, &mut attempts).await;
            }
            if pool.len() > before {
                break;
            }
        }
    }

    (pool, attempts)
}

async fn run_strategy<F, Fut>(
    search: &F,
    strategy: SearchStrategy,
    pool: &mut Vec<JobPosting>,
    seen: &mut HashSet<String>,
    attempts: &mut Vec<StrategyAttempt>,
) where
    F: Fn(SearchStrategy) -> Fut,
    Fut: Future<Output = SearchOutcome>,
{
    let attempt = StrategyAttempt {
        query: strategy.query.clone(),
        location: strategy.location.clone(),
        results: 0,
    };
    let outcome = search(strategy).await;

    let mut recorded = attempt;
    recorded.results = outcome.jobs.len();
    attempts.push(recorded);

    for job in outcome.jobs {
        if seen.insert(job.fingerprint()) {
            pool.push(job);
        }
    }
}

/// Build the persisted recommendation for one scored job.
pub(crate) fn build_recommendation(
    job: JobPosting,
    match_percentage: u8,
    profile: &UserProfileSummary,
) -> Recommendation {
    let skill_matches = matching_skills(profile, job.description.as_deref());
    let match_reason = if skill_matches.is_empty() {
        format!("{match_percentage}% semantic match with your profile")
    } else {
        format!(
            "{match_percentage}% semantic match with your profile; mentions {}",
            skill_matches.join(", ")
        )
    };
    Recommendation {
        job,
        match_percentage,
        match_reason,
        skill_matches,
    }
}

/// Profile skills found verbatim (case-insensitive) in the description.
pub(crate) fn matching_skills(
    profile: &UserProfileSummary,
    description: Option<&str>,
) -> Vec<String> {
    let Some(description) = description else {
        return Vec::new();
    };
    let lowered = description.to_lowercase();
    profile
        .skills
        .iter()
        .filter(|skill| !skill.trim().is_empty() && lowered.contains(&skill.to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscout_core::JobSource;
    use std::collections::BTreeMap;

    fn posting(id: &str, title: &str) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            source: JobSource::Remotive,
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

    fn outcome(jobs: Vec<JobPosting>) -> SearchOutcome {
        SearchOutcome {
            jobs,
            per_source_counts: BTreeMap::new(),
        }
    }

    fn strategy(query: &str) -> SearchStrategy {
        SearchStrategy {
            query: query.to_string(),
            location: None,
        }
    }

    #[tokio::test]
    async fn collection_stops_early_once_pool_is_full() {
        let strategies = vec![strategy("a"), strategy("b"), strategy("c")];
        let (pool, attempts) = collect_jobs(strategies, |s| {
            let batch = (0..20)
                .map(|i| posting(&format!("{}-{i}", s.query), "Engineer"))
                .collect();
            async move { outcome(batch) }
        })
        .await;

        assert!(pool.len() >= MAX_POOL);
        assert_eq!(attempts.len(), 2, "third strategy must not run once full");
    }

    #[tokio::test]
    async fn duplicate_fingerprints_across_strategies_pool_once() {
        let strategies = vec![strategy("a"), strategy("b")];
        let (pool, attempts) = collect_jobs(strategies, |_| async {
            outcome(vec![posting("same", "Engineer")])
        })
        .await;

        assert_eq!(pool.len(), 1);
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].results, 1, "raw result counts are still recorded");
    }

    #[tokio::test]
    async fn empty_primaries_fall_through_to_first_yielding_bundle() {
        // Profile-driven strategies find nothing; the first fallback
        // bundle ("developer"/Remote) returns 2 jobs.
        let strategies = vec![strategy("Backend Developer"), strategy("Node")];
        let (pool, attempts) = collect_jobs(strategies, |s| {
            let batch = if s.query == "developer" {
                vec![posting("f1", "Developer"), posting("f2", "Developer II")]
            } else {
                Vec::new()
            };
            async move { outcome(batch) }
        })
        .await;

        assert_eq!(pool.len(), 2);
        assert!(
            attempts.iter().any(|a| a.query == "developer"
                && a.location.as_deref() == Some("Remote")),
            "first fallback bundle must have been tried"
        );
        assert!(
            !attempts.iter().any(|a| a.query == "software engineer"),
            "later bundles must not run once one yields"
        );
    }

    #[tokio::test]
    async fn exhausted_fallbacks_leave_the_pool_empty() {
        let strategies = vec![strategy("Backend Developer")];
        let (pool, attempts) = collect_jobs(strategies, |_| async { outcome(Vec::new()) }).await;

        assert!(pool.is_empty());
        // 1 primary + every strategy of every fallback bundle.
        let fallback_count: usize = FALLBACK_BUNDLES.iter().map(|b| b.len()).sum();
        assert_eq!(attempts.len(), 1 + fallback_count);
    }

    #[test]
    fn recommendation_carries_skill_matches_and_reason() {
        let profile = UserProfileSummary {
            skills: vec!["Node".to_string(), "SQL".to_string(), "Go".to_string()],
            ..UserProfileSummary::default()
        };
        let mut job = posting("1", "Backend Developer");
        job.description = Some("We run node services backed by SQL databases.".to_string());

        let rec = build_recommendation(job, 82, &profile);

        assert_eq!(rec.match_percentage, 82);
        assert_eq!(rec.skill_matches, vec!["Node", "SQL"]);
        assert!(rec.match_reason.contains("82%"));
        assert!(rec.match_reason.contains("Node, SQL"));
    }

    #[test]
    fn missing_description_means_no_skill_matches() {
        let profile = UserProfileSummary {
            skills: vec!["Rust".to_string()],
            ..UserProfileSummary::default()
        };
        assert!(matching_skills(&profile, None).is_empty());
    }
}
