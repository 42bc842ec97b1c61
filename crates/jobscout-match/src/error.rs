use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("embedding backend error: {0}")]
    Embed(String),

    #[error("rerank model error: {0}")]
    RerankModel(String),

    /// The generative model's reply contained no parseable JSON array.
    /// Surfaced as a hard error: callers must be able to distinguish
    /// "no jobs met the bar" (empty success) from "the reply could not
    /// be parsed".
    #[error("rerank reply could not be parsed: {0}")]
    RerankParse(String),
}
