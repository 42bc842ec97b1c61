//! LLM-assisted recommendation path.
//!
//! Pools a large candidate list across every source (scraped boards
//! included), filters it against the profile's title and location, and
//! asks a locally hosted generative model to rate the candidates. The
//! model's free-text reply passes through a narrow structured-extraction
//! boundary: the first JSON array found is parsed into rating tuples, and
//! a reply with no parseable array is a hard error — there is no safe
//! partial result, and callers must be able to tell "nothing met the
//! bar" from "the reply was garbage".

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use jobscout_core::{JobPosting, Recommendation, SearchFilters, UserProfileSummary};
use jobscout_scraper::{harvest_all, ScrapeClient, ScrapeTarget};
use jobscout_sources::JobSearchClient;

use crate::error::MatchError;
use crate::generator::matching_skills;

/// Candidate ceiling for the pooled list.
const MAX_RERANK_POOL: usize = 300;
/// Per-source fetch ceiling while pooling.
const POOL_SOURCE_LIMIT: usize = 50;
/// Ratings below this percentage are discarded.
const MIN_RERANK_PERCENTAGE: f64 = 65.0;
/// Description characters included per candidate in the prompt.
const PROMPT_DESCRIPTION_CHARS: usize = 200;

/// One rating tuple parsed from the model's reply.
#[derive(Debug, Deserialize)]
struct RerankEntry {
    /// 1-based index into the numbered candidate list.
    #[serde(rename = "jobIndex")]
    job_index: usize,
    #[serde(rename = "matchPercentage")]
    match_percentage: f64,
    #[serde(rename = "matchReason", default)]
    match_reason: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for the locally hosted generative backend (Ollama-style
/// `POST {base}/api/generate`, non-streaming).
pub struct RerankClient {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl RerankClient {
    #[must_use]
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/api/generate", base_url.trim_end_matches('/')),
            model: model.to_string(),
        }
    }

    /// Send a prompt and return the model's raw text reply.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::RerankModel`] if the request fails, the
    /// backend answers non-2xx, or the response envelope cannot be read.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, MatchError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| MatchError::RerankModel(format!("generate request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(MatchError::RerankModel(format!(
                "generative backend returned status {}",
                response.status()
            )));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| MatchError::RerankModel(format!("generate response parse error: {e}")))?;
        Ok(payload.response)
    }
}

/// Run the LLM-assisted generation path for one profile.
///
/// # Errors
///
/// Returns [`MatchError::RerankModel`] if the generative backend cannot
/// be reached, or [`MatchError::RerankParse`] if its reply contains no
/// parseable JSON array. An empty candidate pool or an empty (but valid)
/// array from the model are successful empty results.
pub async fn generate_reranked(
    search: &JobSearchClient,
    scrape: &ScrapeClient,
    targets: &[ScrapeTarget],
    rerank: &RerankClient,
    profile: &UserProfileSummary,
) -> Result<Vec<Recommendation>, MatchError> {
    let pool = pool_candidates(search, scrape, targets, profile).await;
    let candidates = filter_candidates(pool, profile);
    if candidates.is_empty() {
        tracing::info!("no candidates matched the profile title/location; skipping model call");
        return Ok(Vec::new());
    }

    let prompt = build_prompt(profile, &candidates);
    let reply = rerank.generate_text(&prompt).await?;
    let entries = extract_rerank_entries(&reply)?;
    Ok(apply_entries(entries, &candidates, profile))
}

/// Pool up to [`MAX_RERANK_POOL`] jobs across all API sources plus the
/// scraped boards.
async fn pool_candidates(
    search: &JobSearchClient,
    scrape: &ScrapeClient,
    targets: &[ScrapeTarget],
    profile: &UserProfileSummary,
) -> Vec<JobPosting> {
    let filters = SearchFilters {
        query: profile.job_title.clone(),
        location: profile.location.clone(),
        limit: Some(POOL_SOURCE_LIMIT),
        ..SearchFilters::default()
    };

    let mut pool = search.search(&filters).await.jobs;
    pool.extend(harvest_all(scrape, targets).await);
    pool.truncate(MAX_RERANK_POOL);
    pool
}

/// Keep candidates whose title contains the profile's job title and whose
/// location contains the profile's location (case-insensitive). An absent
/// profile field applies no constraint.
fn filter_candidates(pool: Vec<JobPosting>, profile: &UserProfileSummary) -> Vec<JobPosting> {
    let title_needle = profile.job_title.as_deref().map(str::to_lowercase);
    let location_needle = profile.location.as_deref().map(str::to_lowercase);

    pool.into_iter()
        .filter(|job| {
            let title_ok = title_needle
                .as_deref()
                .is_none_or(|needle| job.title.to_lowercase().contains(needle));
            let location_ok = location_needle.as_deref().is_none_or(|needle| {
                job.location
                    .as_deref()
                    .is_some_and(|loc| loc.to_lowercase().contains(needle))
            });
            title_ok && location_ok
        })
        .collect()
}

/// Natural-language prompt embedding the profile and a numbered candidate
/// list. The model is asked for a bare JSON array of rating objects.
fn build_prompt(profile: &UserProfileSummary, candidates: &[JobPosting]) -> String {
    let mut prompt = String::from(
        "You are a career advisor. Rate how well each job below matches the candidate.\n\n",
    );
    prompt.push_str("Candidate profile:\n");
    if let Some(title) = &profile.job_title {
        prompt.push_str(&format!("- Role: {title}\n"));
    }
    if !profile.skills.is_empty() {
        prompt.push_str(&format!("- Skills: {}\n", profile.skills.join(", ")));
    }
    if let Some(location) = &profile.location {
        prompt.push_str(&format!("- Location: {location}\n"));
    }
    if let Some(bio) = &profile.bio {
        prompt.push_str(&format!("- Bio: {bio}\n"));
    }

    prompt.push_str("\nJobs:\n");
    for (index, job) in candidates.iter().enumerate() {
        let description: String = job
            .description
            .as_deref()
            .unwrap_or("")
            .chars()
            .take(PROMPT_DESCRIPTION_CHARS)
            .collect();
        prompt.push_str(&format!(
            "{}. {} at {} — {}",
            index + 1,
            job.title,
            job.company.as_deref().unwrap_or("unknown company"),
            description,
        ));
        if !job.skills.is_empty() {
            prompt.push_str(&format!(" (skills: {})", job.skills.join(", ")));
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "\nReply with ONLY a JSON array. One object per job worth recommending, shaped as \
         {\"jobIndex\": <number from the list>, \"matchPercentage\": <0-100>, \
         \"matchReason\": \"<one sentence>\"}. Omit jobs scoring below 65.\n",
    );
    prompt
}

/// Extract the first JSON array from the model's free-text reply and
/// parse it into rating tuples.
///
/// The array is located permissively (`(?s)\[.*\]` — greedy, spanning
/// lines) so prose around it does not matter; the array itself must
/// parse strictly.
///
/// # Errors
///
/// Returns [`MatchError::RerankParse`] when no array is present or the
/// array does not parse.
fn extract_rerank_entries(reply: &str) -> Result<Vec<RerankEntry>, MatchError> {
    static ARRAY_RE: OnceLock<Regex> = OnceLock::new();
    let re = ARRAY_RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("valid array regex"));

    let raw = re
        .find(reply)
        .ok_or_else(|| MatchError::RerankParse("no JSON array in model reply".to_string()))?
        .as_str();

    serde_json::from_str(raw).map_err(|e| MatchError::RerankParse(e.to_string()))
}

/// Resolve parsed entries back into recommendations: discard ratings
/// below the bar, drop out-of-range indices, and derive skill matches
/// from the profile.
fn apply_entries(
    entries: Vec<RerankEntry>,
    candidates: &[JobPosting],
    profile: &UserProfileSummary,
) -> Vec<Recommendation> {
    entries
        .into_iter()
        .filter(|entry| entry.match_percentage >= MIN_RERANK_PERCENTAGE)
        .filter_map(|entry| {
            let job = entry
                .job_index
                .checked_sub(1)
                .and_then(|idx| candidates.get(idx))?
                .clone();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let match_percentage = entry.match_percentage.clamp(0.0, 100.0).round() as u8;
            let skill_matches = matching_skills(profile, job.description.as_deref());
            Some(Recommendation {
                job,
                match_percentage,
                match_reason: entry.match_reason,
                skill_matches,
            })
        })
        .collect()
}
