//! Semantic matching pipeline: embeddings, similarity scoring, and
//! recommendation generation.
//!
//! Two generation paths share the search/scrape plumbing: the embedding
//! path scores every pooled job against a profile vector with cosine
//! similarity, and the rerank path asks a locally hosted generative model
//! to rate a filtered candidate list, parsing its free-text reply through
//! a narrow structured-extraction boundary.

pub mod cache;
pub mod embeddings;
pub mod error;
pub mod generator;
pub mod profile;
pub mod rerank;
pub mod scorer;

pub use cache::{spawn_sweeper, EmbeddingCache};
pub use embeddings::EmbeddingClient;
pub use error::MatchError;
pub use generator::{RecommendationEngine, RecommendationReport, StrategyAttempt};
pub use profile::{build_strategies, profile_embedding_text, SearchStrategy};
pub use rerank::{generate_reranked, RerankClient};
pub use scorer::{cosine_similarity, match_percentage};
