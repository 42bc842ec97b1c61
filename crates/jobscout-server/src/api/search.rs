use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use jobscout_core::{DatePostedWindow, JobPosting, JobSource, SearchFilters, SortBy};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, ResponseMeta};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub query: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub distance_km: Option<u32>,
    pub min_salary: Option<u64>,
    pub company: Option<String>,
    pub date_posted: Option<DatePostedWindow>,
    pub sort_by: Option<SortBy>,
    /// Comma-separated adapter tags, e.g. `adzuna,remotive`.
    pub sources: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, serde::Serialize)]
pub(super) struct SearchData {
    pub jobs: Vec<JobPosting>,
    pub per_source_counts: BTreeMap<JobSource, usize>,
}

pub(super) async fn search_jobs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<SearchData>>, ApiError> {
    let filters = filters_from_query(query).map_err(|reason| {
        ApiError::new(req_id.0.clone(), "validation_error", reason)
    })?;

    let outcome = state.deps.search.search(&filters).await;

    Ok(Json(ApiResponse {
        data: SearchData {
            jobs: outcome.jobs,
            per_source_counts: outcome.per_source_counts,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn filters_from_query(query: SearchQuery) -> Result<SearchFilters, String> {
    let api_sources = query
        .sources
        .as_deref()
        .map(parse_sources)
        .transpose()?;

    Ok(SearchFilters {
        query: query.query,
        location: query.location,
        job_type: query.job_type,
        distance_km: query.distance_km,
        min_salary: query.min_salary,
        company: query.company,
        date_posted: query.date_posted.unwrap_or_default(),
        sort_by: query.sort_by.unwrap_or_default(),
        api_sources,
        limit: query.limit,
    })
}

fn parse_sources(raw: &str) -> Result<Vec<JobSource>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_list_parses_known_tags() {
        let sources = parse_sources("adzuna, remotive").unwrap();
        assert_eq!(sources, vec![JobSource::Adzuna, JobSource::Remotive]);
    }

    #[test]
    fn unknown_source_tag_is_rejected() {
        assert!(parse_sources("adzuna,monster").is_err());
    }

    #[test]
    fn absent_sources_mean_all_adapters() {
        let filters = filters_from_query(SearchQuery {
            query: Some("rust".to_string()),
            location: None,
            job_type: None,
            distance_km: None,
            min_salary: None,
            company: None,
            date_posted: None,
            sort_by: None,
            sources: None,
            limit: None,
        })
        .unwrap();

        assert!(filters.api_sources.is_none());
        assert_eq!(filters.sources(), JobSource::ALL_APIS.to_vec());
    }
}
