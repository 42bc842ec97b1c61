use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Base URL of the text-embeddings service (`POST {embed_url}/embed`).
    pub embed_url: String,
    /// Base URL of the local generative backend used for reranking.
    pub rerank_url: String,
    pub adzuna_app_id: Option<String>,
    pub adzuna_app_key: Option<String>,
    pub jooble_api_key: Option<String>,
    pub usajobs_api_key: Option<String>,
    /// USAJobs requires a contact email as the `User-Agent` header value.
    pub usajobs_contact_email: Option<String>,
    pub scrape_targets_path: PathBuf,
    pub scraper_request_timeout_secs: u64,
    pub scraper_max_retries: u32,
    pub scraper_backoff_base_secs: u64,
    /// Minimum match percentage a recommendation must reach to be kept.
    pub min_match_percentage: u8,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("embed_url", &self.embed_url)
            .field("rerank_url", &self.rerank_url)
            .field(
                "adzuna_app_id",
                &self.adzuna_app_id.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "adzuna_app_key",
                &self.adzuna_app_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "jooble_api_key",
                &self.jooble_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "usajobs_api_key",
                &self.usajobs_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("usajobs_contact_email", &self.usajobs_contact_email)
            .field("scrape_targets_path", &self.scrape_targets_path)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field("scraper_backoff_base_secs", &self.scraper_backoff_base_secs)
            .field("min_match_percentage", &self.min_match_percentage)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
