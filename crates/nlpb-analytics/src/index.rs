//! One-time construction of the corpus vector index.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::capabilities::{
    doc_id, Embedder, VectorEntry, VectorStore, META_CATEGORY, META_LANGUAGE,
};
use crate::error::AnalyticsError;
use crate::types::Corpus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndexBuildReport {
    /// The store was empty and every corpus record was inserted.
    Built { indexed: usize },
    /// The store already held entries; nothing was embedded or written.
    Skipped { existing: usize },
}

/// Embeds and inserts the whole corpus unless the store already has entries.
///
/// A non-empty store is trusted as-is, even if it was built from a different
/// dataset. All texts are embedded in one capability call.
///
/// # Errors
///
/// Returns [`AnalyticsError::IndexBuild`] if the embedder returns the wrong
/// number of vectors, and propagates embedder and store failures.
pub async fn build_index_if_empty(
    corpus: &Corpus,
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
) -> Result<IndexBuildReport, AnalyticsError> {
    let existing = store.count().await?;
    if existing > 0 {
        tracing::info!(existing, "vector index already populated, skipping build");
        return Ok(IndexBuildReport::Skipped { existing });
    }

    let texts: Vec<String> = corpus.records().iter().map(|r| r.text.clone()).collect();
    tracing::info!(records = texts.len(), "building vector index");
    let vectors = embedder.embed(&texts).await?;
    if vectors.len() != texts.len() {
        return Err(AnalyticsError::IndexBuild(format!(
            "embedder returned {} vectors for {} texts",
            vectors.len(),
            texts.len()
        )));
    }

    let entries: Vec<VectorEntry> = corpus
        .records()
        .iter()
        .zip(vectors)
        .map(|(record, vector)| VectorEntry {
            id: doc_id(record.id),
            vector,
            text: record.text.clone(),
            metadata: BTreeMap::from([
                (META_CATEGORY.to_string(), record.category.clone()),
                (META_LANGUAGE.to_string(), record.language.clone()),
            ]),
        })
        .collect();
    let indexed = entries.len();
    store.insert(entries).await?;

    tracing::info!(indexed, "vector index built");
    Ok(IndexBuildReport::Built { indexed })
}
