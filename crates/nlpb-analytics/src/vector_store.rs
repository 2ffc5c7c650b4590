//! Qdrant-backed vector store for the corpus index.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capabilities::{parse_doc_id, VectorEntry, VectorMatch, VectorStore};
use crate::error::AnalyticsError;

/// Points per upsert request.
const UPSERT_BATCH: usize = 256;

const PAYLOAD_DOC_ID: &str = "doc_id";
const PAYLOAD_TEXT: &str = "text";

/// Qdrant HTTP client bound to one collection.
pub struct QdrantStore {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct CreateCollectionRequest {
    vectors: VectorsConfig,
}

#[derive(Serialize)]
struct VectorsConfig {
    size: u64,
    distance: &'static str,
}

#[derive(Serialize)]
struct UpsertPointsRequest<'a> {
    points: &'a [Point],
}

#[derive(Serialize)]
struct Point {
    id: u64,
    vector: Vec<f32>,
    payload: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Deserialize)]
struct QdrantResponse<T> {
    result: T,
}

#[derive(Deserialize)]
struct CountResult {
    count: usize,
}

#[derive(Deserialize)]
struct ScoredPoint {
    score: f32,
    #[serde(default)]
    payload: Option<BTreeMap<String, serde_json::Value>>,
}

impl QdrantStore {
    /// Connects to `collection`, creating it with cosine distance and
    /// `dim`-dimensional vectors if absent.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Qdrant`] on network or API failure.
    pub async fn open_or_create(
        qdrant_url: &str,
        collection: &str,
        dim: u64,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AnalyticsError> {
        let store = Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: qdrant_url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
            api_key,
        };
        store.ensure_collection(dim).await?;
        Ok(store)
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!("{}/collections/{}{suffix}", self.base_url, self.collection)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    async fn ensure_collection(&self, dim: u64) -> Result<(), AnalyticsError> {
        let url = self.collection_url("");
        let check = self.request(reqwest::Method::GET, &url).send().await;

        if let Ok(resp) = check {
            if resp.status().is_success() {
                tracing::debug!(collection = %self.collection, "Qdrant collection exists");
                return Ok(());
            }
        }

        let body = CreateCollectionRequest {
            vectors: VectorsConfig {
                size: dim,
                distance: "Cosine",
            },
        };
        let resp = self
            .request(reqwest::Method::PUT, &url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AnalyticsError::Qdrant(format!("collection create request failed: {e}"))
            })?;

        if !resp.status().is_success() {
            return Err(AnalyticsError::Qdrant(format!(
                "collection create returned status {}",
                resp.status()
            )));
        }
        tracing::info!(collection = %self.collection, dim, "Qdrant collection created");
        Ok(())
    }
}

#[async_trait::async_trait]
impl VectorStore for QdrantStore {
    async fn count(&self) -> Result<usize, AnalyticsError> {
        let resp = self
            .request(reqwest::Method::POST, &self.collection_url("/points/count"))
            .json(&serde_json::json!({ "exact": true }))
            .send()
            .await
            .map_err(|e| AnalyticsError::Qdrant(format!("count request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AnalyticsError::Qdrant(format!(
                "count returned status {}",
                resp.status()
            )));
        }

        let body: QdrantResponse<CountResult> = resp
            .json()
            .await
            .map_err(|e| AnalyticsError::Qdrant(format!("count response parse error: {e}")))?;
        Ok(body.result.count)
    }

    /// Point ids are the numeric record ids; the `doc_{id}` form is kept in
    /// the payload next to the text and metadata.
    async fn insert(&self, entries: Vec<VectorEntry>) -> Result<(), AnalyticsError> {
        let mut points = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = parse_doc_id(&entry.id).ok_or_else(|| {
                AnalyticsError::Qdrant(format!("entry id {:?} is not a doc id", entry.id))
            })?;
            let mut payload = entry.metadata;
            payload.insert(PAYLOAD_DOC_ID.to_string(), entry.id);
            payload.insert(PAYLOAD_TEXT.to_string(), entry.text);
            points.push(Point {
                id: id as u64,
                vector: entry.vector,
                payload,
            });
        }

        let url = self.collection_url("/points?wait=true");
        for chunk in points.chunks(UPSERT_BATCH) {
            let body = UpsertPointsRequest { points: chunk };
            let resp = self
                .request(reqwest::Method::PUT, &url)
                .json(&body)
                .send()
                .await
                .map_err(|e| AnalyticsError::Qdrant(format!("upsert request failed: {e}")))?;

            if !resp.status().is_success() {
                return Err(AnalyticsError::Qdrant(format!(
                    "upsert returned status {}",
                    resp.status()
                )));
            }
        }
        tracing::debug!(
            points = points.len(),
            collection = %self.collection,
            "Qdrant upsert complete"
        );
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<VectorMatch>, AnalyticsError> {
        let body = SearchRequest {
            vector,
            limit: k,
            with_payload: true,
        };
        let resp = self
            .request(reqwest::Method::POST, &self.collection_url("/points/search"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalyticsError::Qdrant(format!("search request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AnalyticsError::Qdrant(format!(
                "search returned status {}",
                resp.status()
            )));
        }

        let body: QdrantResponse<Vec<ScoredPoint>> = resp
            .json()
            .await
            .map_err(|e| AnalyticsError::Qdrant(format!("search response parse error: {e}")))?;

        body.result.into_iter().map(scored_point_to_match).collect()
    }
}

/// Qdrant scores cosine similarity; callers work with distance `1 - score`.
fn scored_point_to_match(point: ScoredPoint) -> Result<VectorMatch, AnalyticsError> {
    let mut metadata: BTreeMap<String, String> = point
        .payload
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => (key, s),
            other => (key, other.to_string()),
        })
        .collect();

    let id = metadata
        .remove(PAYLOAD_DOC_ID)
        .ok_or_else(|| AnalyticsError::MalformedMatch("payload has no doc_id".to_string()))?;
    let text = metadata
        .remove(PAYLOAD_TEXT)
        .ok_or_else(|| AnalyticsError::MalformedMatch(format!("{id} payload has no text")))?;

    Ok(VectorMatch {
        id,
        text,
        metadata,
        distance: 1.0 - point.score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(pairs: &[(&str, &str)]) -> Option<BTreeMap<String, serde_json::Value>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), serde_json::json!(v)))
                .collect(),
        )
    }

    #[test]
    fn scored_point_converts_similarity_to_distance() {
        let point = ScoredPoint {
            score: 0.75,
            payload: payload(&[
                ("doc_id", "doc_3"),
                ("text", "entrega rapida"),
                ("category", "elogio"),
            ]),
        };
        let matched = scored_point_to_match(point).expect("valid point");
        assert_eq!(matched.id, "doc_3");
        assert_eq!(matched.text, "entrega rapida");
        assert!((matched.distance - 0.25).abs() < 1e-6);
        assert_eq!(matched.metadata.get("category").map(String::as_str), Some("elogio"));
        assert!(!matched.metadata.contains_key("doc_id"));
    }

    #[test]
    fn scored_point_without_doc_id_is_malformed() {
        let point = ScoredPoint {
            score: 0.5,
            payload: payload(&[("text", "orphan")]),
        };
        assert!(matches!(
            scored_point_to_match(point),
            Err(AnalyticsError::MalformedMatch(_))
        ));
    }
}
