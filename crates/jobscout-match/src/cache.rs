//! Time-bounded embedding cache keyed by job fingerprint.
//!
//! A performance memo, never a correctness dependency: a miss is always
//! computationally equivalent to a fresh computation. Entries expire 24
//! hours after insertion; when the map outgrows its capacity the oldest
//! entries by insert timestamp are evicted (not LRU-by-access); an hourly
//! background sweep removes expired entries regardless of capacity
//! pressure. Concurrent read/insert is safe with last-writer-wins on a
//! coincident insert for the same job.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use jobscout_core::JobPosting;

use crate::error::MatchError;

const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const DEFAULT_MAX_ENTRIES: usize = 10_000;
const DEFAULT_EVICT_BATCH: usize = 1_000;
const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

struct CacheEntry {
    vector: Vec<f32>,
    cached_at: Instant,
}

pub struct EmbeddingCache {
    ttl: Duration,
    max_entries: usize,
    evict_batch: usize,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingCache {
    /// Cache with the production policy: 24h expiry, 10,000-entry
    /// capacity, eviction batches of 1,000.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(DEFAULT_TTL, DEFAULT_MAX_ENTRIES, DEFAULT_EVICT_BATCH)
    }

    /// Cache with an explicit policy; used by tests and alternative
    /// deployments.
    #[must_use]
    pub fn with_policy(ttl: Duration, max_entries: usize, evict_batch: usize) -> Self {
        Self {
            ttl,
            max_entries,
            evict_batch,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached vector for `job`, or compute, store, and return
    /// a fresh one via `embed`.
    ///
    /// An entry older than the expiry window is never returned even if
    /// still physically present — it is treated as miss-and-regenerate.
    /// The lock is not held across the embedding computation; two
    /// concurrent misses for the same job both compute, and the later
    /// insert wins.
    ///
    /// # Errors
    ///
    /// Propagates whatever error `embed` resolves to. A failed
    /// computation stores nothing.
    pub async fn get_or_embed<F, Fut>(
        &self,
        job: &JobPosting,
        embed: F,
    ) -> Result<Vec<f32>, MatchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<f32>, MatchError>>,
    {
        let key = job.fingerprint();

        if let Some(vector) = self.lookup(&key) {
            return Ok(vector);
        }

        let vector = embed().await?;
        self.insert(key, vector.clone());
        Ok(vector)
    }

    fn lookup(&self, key: &str) -> Option<Vec<f32>> {
        let entries = self.entries.lock().expect("embedding cache lock poisoned");
        let entry = entries.get(key)?;
        if entry.cached_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.vector.clone())
    }

    fn insert(&self, key: String, vector: Vec<f32>) {
        let mut entries = self.entries.lock().expect("embedding cache lock poisoned");
        entries.insert(
            key,
            CacheEntry {
                vector,
                cached_at: Instant::now(),
            },
        );

        if entries.len() > self.max_entries {
            let mut by_age: Vec<(String, Instant)> = entries
                .iter()
                .map(|(k, e)| (k.clone(), e.cached_at))
                .collect();
            by_age.sort_by_key(|(_, cached_at)| *cached_at);
            for (key, _) in by_age.into_iter().take(self.evict_batch) {
                entries.remove(&key);
            }
        }
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let mut entries = self.entries.lock().expect("embedding cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| entry.cached_at.elapsed() < self.ttl);
        before - entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("embedding cache lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Start the hourly expiry sweep for `cache`.
///
/// The task runs until aborted; dropping the returned handle does not
/// stop it. A sweep racing a concurrent read costs at worst one cache
/// miss.
pub fn spawn_sweeper(cache: Arc<EmbeddingCache>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        // First tick fires immediately; skip it so a fresh cache is not
        // swept at startup.
        interval.tick().await;
        loop {
            interval.tick().await;
            let dropped = cache.sweep_expired();
            if dropped > 0 {
                tracing::debug!(dropped, remaining = cache.len(), "embedding cache sweep");
            }
        }
    })
}

/// Flattened text representation of a job for embedding: present fields
/// only, one per line.
#[must_use]
pub fn embedding_text(job: &JobPosting) -> String {
    let mut lines = vec![job.title.clone()];
    if let Some(company) = &job.company {
        lines.push(company.clone());
    }
    if let Some(description) = &job.description {
        lines.push(description.clone());
    }
    if let Some(location) = &job.location {
        lines.push(location.clone());
    }
    if let Some(job_type) = &job.job_type {
        lines.push(job_type.clone());
    }
    if let Some(salary) = &job.salary {
        lines.push(salary.clone());
    }
    if !job.skills.is_empty() {
        lines.push(job.skills.join(", "));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscout_core::JobSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn posting(id: &str) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            source: JobSource::Remotive,
            title: "Backend Developer".to_string(),
            company: Some("Acme".to_string()),
            location: None,
            description: Some("Rust services".to_string()),
            salary: None,
            url: None,
            date_posted: None,
            job_type: None,
            skills: Vec::new(),
        }
    }

    #[tokio::test]
    async fn second_lookup_within_window_computes_once() {
        let cache = EmbeddingCache::new();
        let job = posting("1");
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_embed(&job, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(vec![0.5, 0.5]) }
            })
            .await
            .unwrap();
        let second = cache
            .get_or_embed(&job, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(vec![0.9, 0.9]) }
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1, "hit must not recompute");
        assert_eq!(first, second, "hit must return the stored vector bit-identically");
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss_and_regenerates() {
        let cache = EmbeddingCache::with_policy(Duration::ZERO, 10, 1);
        let job = posting("1");
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_embed(&job, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(vec![1.0]) }
                })
                .await
                .unwrap();
        }

        assert_eq!(
            calls.load(Ordering::SeqCst),
            2,
            "an entry past the window must be treated as a miss"
        );
    }

    #[tokio::test]
    async fn failed_computation_stores_nothing() {
        let cache = EmbeddingCache::new();
        let job = posting("1");

        let err = cache
            .get_or_embed(&job, || async { Err(MatchError::Embed("down".to_string())) })
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::Embed(_)));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn capacity_overflow_evicts_oldest_batch() {
        let cache = EmbeddingCache::with_policy(DEFAULT_TTL, 3, 2);

        for i in 0..4 {
            let job = posting(&i.to_string());
            cache
                .get_or_embed(&job, || async { Ok(vec![1.0]) })
                .await
                .unwrap();
        }

        // Inserting the 4th entry exceeded capacity 3 and evicted the 2 oldest.
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn sweep_removes_expired_entries() {
        let cache = EmbeddingCache::with_policy(Duration::ZERO, 10, 1);
        let job = posting("1");
        cache
            .get_or_embed(&job, || async { Ok(vec![1.0]) })
            .await
            .unwrap();

        // TTL zero: the entry is already expired but physically present
        // (the failed lookup does not delete).
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.sweep_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn embedding_text_includes_only_present_fields() {
        let mut job = posting("1");
        job.skills = vec!["Rust".to_string(), "SQL".to_string()];
        let text = embedding_text(&job);

        assert_eq!(text, "Backend Developer\nAcme\nRust services\nRust, SQL");
    }
}
