//! Cosine similarity scoring between profile and job vectors.

use futures::future;

use jobscout_core::JobPosting;

use crate::cache::{embedding_text, EmbeddingCache};
use crate::embeddings::EmbeddingClient;

/// Jobs scored concurrently per window. Windows run sequentially to
/// bound simultaneous load on the embedding backend.
const SCORING_WINDOW: usize = 3;

/// Cosine similarity of two vectors, in `[0, 1]` for the unit-positive
/// embeddings this pipeline works with.
///
/// Returns `0.0` if either vector is empty, the dimensionalities differ,
/// or either norm is exactly zero (guards divide-by-zero).
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Convert a similarity to a 0–100 integer percentage:
/// `round(min(similarity × 100, 100))`, with negative similarities
/// clamped to 0.
#[must_use]
pub fn match_percentage(similarity: f32) -> u8 {
    let pct = (similarity * 100.0).clamp(0.0, 100.0).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        pct as u8
    }
}

/// Score `jobs` against `profile_vector` in fixed-size concurrency
/// windows, returning `(job, percentage)` pairs in input order.
///
/// A single job's embedding or scoring failure is logged and the job
/// excluded; the batch always completes.
pub async fn score_jobs(
    cache: &EmbeddingCache,
    embedder: &EmbeddingClient,
    profile_vector: &[f32],
    jobs: Vec<JobPosting>,
) -> Vec<(JobPosting, u8)> {
    let mut scored = Vec::with_capacity(jobs.len());

    for window in jobs.chunks(SCORING_WINDOW) {
        let scores = future::join_all(window.iter().map(|job| async {
            let result = cache
                .get_or_embed(job, || async {
                    let text = embedding_text(job);
                    embedder.embed_one(&text).await
                })
                .await;
            match result {
                Ok(vector) => Some(match_percentage(cosine_similarity(profile_vector, &vector))),
                Err(e) => {
                    tracing::warn!(
                        job = %job.fingerprint(),
                        error = %e,
                        "scoring failed; excluding job from batch"
                    );
                    None
                }
            }
        }))
        .await;

        for (job, score) in window.iter().zip(scores) {
            if let Some(pct) = score {
                scored.push((job.clone(), pct));
            }
        }
    }

    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn similarity_is_symmetric() {
        let a = vec![0.3, 0.8, 0.1];
        let b = vec![0.5, 0.2, 0.9];
        assert!((cosine_similarity(&a, &b) - cosine_similarity(&b, &a)).abs() < f32::EPSILON);
    }

    #[test]
    fn self_similarity_is_one_for_nonzero_vectors() {
        let v = vec![0.2, 0.4, 0.6];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[]), 0.0);
    }

    #[test]
    fn mismatched_dimensions_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn zero_norm_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn similarity_is_bounded() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.001];
        let sim = cosine_similarity(&a, &b);
        assert!((0.0..=1.0).contains(&sim));
    }

    #[test]
    fn percentage_rounds_and_caps() {
        assert_eq!(match_percentage(0.874), 87);
        assert_eq!(match_percentage(1.0), 100);
        assert_eq!(match_percentage(1.2), 100);
        assert_eq!(match_percentage(-0.3), 0);
        assert_eq!(match_percentage(0.0), 0);
    }
}
