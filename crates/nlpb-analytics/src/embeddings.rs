//! TEI (Text Embeddings Inference) client for vector generation.

use std::time::Duration;

use serde::Serialize;

use crate::capabilities::Embedder;
use crate::error::AnalyticsError;

/// Maximum number of texts per /embed call.
const BATCH_SIZE: usize = 64;

/// TEI HTTP client.
pub struct TeiClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
    truncate: bool,
}

impl TeiClient {
    /// Create a new `TeiClient` for the TEI instance at `tei_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Http`] if the HTTP client cannot be built.
    pub fn new(
        tei_url: &str,
        timeout: Duration,
        api_key: Option<String>,
    ) -> Result<Self, AnalyticsError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}/embed", tei_url.trim_end_matches('/')),
            api_key,
        })
    }

    async fn embed_chunk(&self, chunk: &[String]) -> Result<Vec<Vec<f32>>, AnalyticsError> {
        let request = EmbedRequest {
            inputs: chunk,
            truncate: true,
        };
        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AnalyticsError::Tei(format!("TEI request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AnalyticsError::Tei(format!(
                "TEI returned status {}",
                response.status()
            )));
        }

        let embeddings: Vec<Vec<f32>> = response
            .json()
            .await
            .map_err(|e| AnalyticsError::Tei(format!("TEI response parse error: {e}")))?;

        if embeddings.len() != chunk.len() {
            return Err(AnalyticsError::Tei(format!(
                "TEI returned {} embeddings for {} inputs",
                embeddings.len(),
                chunk.len()
            )));
        }
        Ok(embeddings)
    }
}

#[async_trait::async_trait]
impl Embedder for TeiClient {
    /// Texts are sent in groups of [`BATCH_SIZE`] (64) per request and the
    /// vectors come back in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalyticsError> {
        let mut all_embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(BATCH_SIZE) {
            all_embeddings.extend(self.embed_chunk(chunk).await?);
        }
        tracing::debug!(texts = texts.len(), "TEI embed complete");
        Ok(all_embeddings)
    }
}
