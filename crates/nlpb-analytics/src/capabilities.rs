//! Narrow interfaces to the model capabilities and the vector store.
//!
//! The pipeline only talks to these traits; concrete HTTP clients live in
//! their own modules and tests substitute in-process fakes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// Metadata key holding a record's category.
pub const META_CATEGORY: &str = "category";
/// Metadata key holding a record's language.
pub const META_LANGUAGE: &str = "language";

/// Store id for corpus record `id`.
#[must_use]
pub fn doc_id(id: usize) -> String {
    format!("doc_{id}")
}

/// Parses the record id back out of a `doc_{id}` store id.
#[must_use]
pub fn parse_doc_id(doc_id: &str) -> Option<usize> {
    doc_id.strip_prefix("doc_")?.parse().ok()
}

/// One persisted index entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorEntry {
    pub id: String,
    pub vector: Vec<f32>,
    /// The raw document text, returned by queries.
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

/// A query result, nearest first.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub id: String,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
    /// Cosine distance in `[0, 2]`.
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds every text, returning one vector per input in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalyticsError>;
}

/// A persistent vector collection in cosine-distance space.
///
/// Implementations are opened (or created) by their own constructors.
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    async fn count(&self) -> Result<usize, AnalyticsError>;

    async fn insert(&self, entries: Vec<VectorEntry>) -> Result<(), AnalyticsError>;

    /// Returns up to `k` entries ordered by ascending distance.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<VectorMatch>, AnalyticsError>;
}

#[async_trait::async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    /// Scores `text` against mutually exclusive candidate `labels`.
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<Vec<LabelScore>, AnalyticsError>;
}

#[async_trait::async_trait]
pub trait SentimentModel: Send + Sync {
    /// Star-rating label scores for `text` (`"1 star"` .. `"5 stars"`).
    async fn score(&self, text: &str) -> Result<Vec<LabelScore>, AnalyticsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_round_trips() {
        assert_eq!(doc_id(17), "doc_17");
        assert_eq!(parse_doc_id("doc_17"), Some(17));
    }

    #[test]
    fn parse_doc_id_rejects_foreign_ids() {
        assert_eq!(parse_doc_id("17"), None);
        assert_eq!(parse_doc_id("doc_"), None);
        assert_eq!(parse_doc_id("doc_x1"), None);
    }
}
