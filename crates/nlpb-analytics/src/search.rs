//! Nearest-neighbour search over the corpus index.

use crate::capabilities::{
    parse_doc_id, Embedder, VectorMatch, VectorStore, META_CATEGORY, META_LANGUAGE,
};
use crate::error::AnalyticsError;
use crate::normalizer::{DEFAULT_CATEGORY, DEFAULT_LANGUAGE};
use crate::types::{SearchOutcome, SimilarityHit};

pub const DEFAULT_TOP_K: usize = 5;

/// Maps a cosine distance in `[0, 2]` onto a similarity in `[0, 1]`.
#[must_use]
pub fn distance_to_similarity(distance: f32) -> f32 {
    1.0 - distance / 2.0
}

/// Finds the `top_k` corpus texts closest to `prompt`.
///
/// Never fails: embedder or store errors are logged and reported as
/// [`SearchOutcome::Unavailable`]. `top_k == 0` returns no hits without
/// calling either capability.
pub async fn search(
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    prompt: &str,
    top_k: usize,
) -> SearchOutcome {
    if top_k == 0 {
        return SearchOutcome::Hits { hits: Vec::new() };
    }
    match try_search(embedder, store, prompt, top_k).await {
        Ok(hits) => {
            tracing::debug!(top_k, hits = hits.len(), "similarity search complete");
            SearchOutcome::Hits { hits }
        }
        Err(e) => {
            tracing::warn!(error = %e, "similarity search unavailable");
            SearchOutcome::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}

async fn try_search(
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    prompt: &str,
    top_k: usize,
) -> Result<Vec<SimilarityHit>, AnalyticsError> {
    let vector = embedder
        .embed(&[prompt.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AnalyticsError::Tei("no embedding returned for prompt".to_string()))?;

    store
        .query(&vector, top_k)
        .await?
        .into_iter()
        .map(match_to_hit)
        .collect()
}

fn match_to_hit(matched: VectorMatch) -> Result<SimilarityHit, AnalyticsError> {
    let id = parse_doc_id(&matched.id).ok_or_else(|| {
        AnalyticsError::MalformedMatch(format!("unexpected id {:?}", matched.id))
    })?;
    let meta = |key: &str, default: &str| {
        matched
            .metadata
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    };
    Ok(SimilarityHit {
        id,
        category: meta(META_CATEGORY, DEFAULT_CATEGORY),
        language: meta(META_LANGUAGE, DEFAULT_LANGUAGE),
        similarity: distance_to_similarity(matched.distance),
        text: matched.text,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::index::build_index_if_empty;
    use crate::local_store::LocalVectorStore;
    use crate::testing::{corpus_of, FailingEmbedder, FakeEmbedder};

    #[test]
    fn similarity_mapping() {
        assert!((distance_to_similarity(0.0) - 1.0).abs() < f32::EPSILON);
        assert!((distance_to_similarity(1.0) - 0.5).abs() < f32::EPSILON);
        assert!(distance_to_similarity(2.0).abs() < f32::EPSILON);
        assert!((distance_to_similarity(0.4) - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn hits_are_ordered_and_bounded() {
        let corpus = corpus_of(&[
            ("great product", "elogio"),
            ("terrible delivery", "reclamacao"),
            ("great service", "elogio"),
            ("where is my order", "duvida"),
        ]);
        let embedder = FakeEmbedder::default();
        let store = LocalVectorStore::ephemeral();
        build_index_if_empty(&corpus, &embedder, &store)
            .await
            .expect("build");

        let outcome = search(&embedder, &store, "great product", 3).await;
        let hits = outcome.hits();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].text, "great product");
        assert!((hits[0].similarity - 1.0).abs() < 1e-5);
        for pair in hits.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
        for hit in hits {
            assert!((0.0..=1.0).contains(&hit.similarity));
            assert_eq!(corpus.get(hit.id).map(|r| r.text.as_str()), Some(hit.text.as_str()));
        }
    }

    #[tokio::test]
    async fn zero_top_k_makes_no_calls() {
        let embedder = FakeEmbedder::default();
        let store = LocalVectorStore::ephemeral();
        let outcome = search(&embedder, &store, "anything", 0).await;
        assert_eq!(outcome, SearchOutcome::Hits { hits: Vec::new() });
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn embedder_failure_is_unavailable_not_empty() {
        let store = LocalVectorStore::ephemeral();
        let outcome = search(&FailingEmbedder, &store, "oi", 5).await;
        assert!(outcome.is_unavailable());
    }

    #[test]
    fn missing_metadata_falls_back_to_defaults() {
        let hit = match_to_hit(VectorMatch {
            id: "doc_9".to_string(),
            text: "sem metadados".to_string(),
            metadata: BTreeMap::new(),
            distance: 0.5,
        })
        .expect("hit");
        assert_eq!(hit.id, 9);
        assert_eq!(hit.category, DEFAULT_CATEGORY);
        assert_eq!(hit.language, DEFAULT_LANGUAGE);
        assert!((hit.similarity - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn foreign_ids_are_malformed() {
        let err = match_to_hit(VectorMatch {
            id: "x-1".to_string(),
            text: String::new(),
            metadata: BTreeMap::new(),
            distance: 0.0,
        })
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedMatch(_)));
    }
}
