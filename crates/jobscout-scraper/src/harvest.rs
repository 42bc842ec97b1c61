//! Harvest orchestration across all configured scrape targets.

use jobscout_core::JobPosting;
use jobscout_sources::orchestrator::dedupe_by_title_company;

use crate::client::ScrapeClient;
use crate::parse::extract_postings;
use crate::targets::ScrapeTarget;

/// Scrape every configured target site, returning whatever was harvested.
///
/// Sites are fetched sequentially with a randomized pause between them.
/// A site that fails (after the client's retries) or whose patterns are
/// invalid contributes nothing; the rest of the sites still run — partial
/// results are always preferred over none. The aggregate is deduplicated
/// by normalized `(title, company)`, first occurrence winning.
pub async fn harvest_all(client: &ScrapeClient, targets: &[ScrapeTarget]) -> Vec<JobPosting> {
    let mut postings = Vec::new();

    for (index, target) in targets.iter().enumerate() {
        if index > 0 {
            client.inter_site_pause().await;
        }

        let html = match client.fetch_page(&target.name, &target.url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(site = %target.name, error = %e, "scrape fetch failed; skipping site");
                continue;
            }
        };

        match extract_postings(target, &html) {
            Ok(batch) => {
                tracing::debug!(site = %target.name, count = batch.len(), "scraped postings");
                postings.extend(batch);
            }
            Err(e) => {
                tracing::warn!(site = %target.name, error = %e, "scrape extraction failed; skipping site");
            }
        }
    }

    dedupe_by_title_company(postings)
}
