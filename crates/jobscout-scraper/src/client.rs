//! HTTP client for scrape targets.
//!
//! Job boards block obvious bots, so every request carries a user agent
//! drawn from a small pool of current browser strings plus referer and
//! cache-control headers that mimic normal browsing. Transport failures
//! are retried with exponential backoff before the site is given up on.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScrapeError;

/// Browser user agents rotated per request.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:126.0) Gecko/20100101 Firefox/126.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

/// HTTP client for harvesting configured job boards.
pub struct ScrapeClient {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
    /// Randomized delay bounds (ms) between requests to different sites.
    inter_site_delay_ms: (u64, u64),
}

impl ScrapeClient {
    /// Creates a client with the given timeout and retry policy.
    ///
    /// The inter-site delay defaults to the 2–5s window; tests use
    /// [`ScrapeClient::with_inter_site_delay`] to zero it out.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
            inter_site_delay_ms: (2_000, 5_000),
        })
    }

    #[must_use]
    pub fn with_inter_site_delay(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.inter_site_delay_ms = (min_ms, max_ms);
        self
    }

    /// Fetch one page, rotating the user agent and retrying transport
    /// failures with exponential backoff (`base × attempt`).
    ///
    /// Non-2xx statuses are not retried — a board that answers 403 will
    /// answer 403 again, and hammering it invites a block.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] after all retries are exhausted or
    /// [`ScrapeError::Status`] on a non-2xx response.
    pub async fn fetch_page(&self, site: &str, url: &str) -> Result<String, ScrapeError> {
        let mut attempt: u32 = 0;
        loop {
            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    let retriable = matches!(e, ScrapeError::Http(_));
                    if !retriable || attempt >= self.max_retries {
                        return Err(e);
                    }
                    attempt += 1;
                    // Linear-multiplied backoff: base delay × attempt index.
                    let delay = Duration::from_secs(self.backoff_base_secs * u64::from(attempt));
                    tracing::warn!(
                        site,
                        attempt,
                        delay_secs = delay.as_secs(),
                        error = %e,
                        "scrape fetch failed; backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let user_agent = pick_user_agent();
        let response = self
            .client
            .get(url)
            .header("User-Agent", user_agent)
            .header("Referer", "https://www.google.com/")
            .header("Cache-Control", "no-cache")
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                site: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// Sleep for a randomized interval inside the configured bounds.
    /// Called between different target sites to reduce the chance of
    /// being blocked.
    pub async fn inter_site_pause(&self) {
        let (min_ms, max_ms) = self.inter_site_delay_ms;
        if max_ms == 0 {
            return;
        }
        let delay_ms = {
            let mut rng = rand::rng();
            rand::Rng::random_range(&mut rng, min_ms..=max_ms)
        };
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

fn pick_user_agent() -> &'static str {
    let idx = {
        let mut rng = rand::rng();
        rand::Rng::random_range(&mut rng, 0..USER_AGENTS.len())
    };
    USER_AGENTS[idx]
}
