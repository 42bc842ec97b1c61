//! HTTP client for the text-embeddings service.
//!
//! Speaks the TEI-style `POST {base}/embed` protocol: a batch of input
//! texts in, one vector per text out, in order.

use serde::Serialize;

use crate::error::MatchError;

/// Maximum number of texts per `/embed` call.
const BATCH_SIZE: usize = 32;

#[derive(Clone)]
pub struct EmbeddingClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [&'a str],
}

impl EmbeddingClient {
    /// Create a client for the embeddings service at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/embed", base_url.trim_end_matches('/')),
        }
    }

    /// Embed a batch of texts, returning one vector per input in order.
    ///
    /// Inputs are chunked into groups of [`BATCH_SIZE`] per request.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Embed`] if a request fails, the service
    /// answers non-2xx, the response cannot be parsed, or the vector
    /// count does not match the input count.
    pub async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, MatchError> {
        let mut vectors = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let response = self
                .client
                .post(&self.url)
                .json(&EmbedRequest { inputs: chunk })
                .send()
                .await
                .map_err(|e| MatchError::Embed(format!("embed request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(MatchError::Embed(format!(
                    "embeddings service returned status {}",
                    response.status()
                )));
            }

            let batch: Vec<Vec<f32>> = response
                .json()
                .await
                .map_err(|e| MatchError::Embed(format!("embed response parse error: {e}")))?;

            if batch.len() != chunk.len() {
                return Err(MatchError::Embed(format!(
                    "embeddings service returned {} vectors for {} inputs",
                    batch.len(),
                    chunk.len()
                )));
            }

            vectors.extend(batch);
        }

        Ok(vectors)
    }

    /// Embed a single text.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`EmbeddingClient::embed`].
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, MatchError> {
        let mut vectors = self.embed(&[text]).await?;
        vectors
            .pop()
            .ok_or_else(|| MatchError::Embed("embeddings service returned no vector".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn embed_one_returns_the_single_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![vec![0.1_f32, 0.2, 0.3]]))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(&server.uri());
        let vector = client.embed_one("backend developer").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn count_mismatch_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<Vec<f32>>::new()))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(&server.uri());
        let err = client.embed(&["a", "b"]).await.unwrap_err();
        assert!(matches!(err, MatchError::Embed(_)));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(&server.uri());
        let err = client.embed_one("text").await.unwrap_err();
        assert!(matches!(err, MatchError::Embed(_)));
    }
}
