//! Analysis orchestration.

use std::sync::Arc;
use std::time::Duration;

use nlpb_core::{AppConfig, VectorBackend};

use crate::capabilities::{Embedder, SentimentModel, VectorStore, ZeroShotClassifier};
use crate::classifier;
use crate::embeddings::TeiClient;
use crate::error::AnalyticsError;
use crate::index::{build_index_if_empty, IndexBuildReport};
use crate::inference::{TeiSentimentClient, ZeroShotClient};
use crate::local_store::LocalVectorStore;
use crate::normalizer::normalize;
use crate::search;
use crate::sentiment;
use crate::table::load_csv;
use crate::types::{
    ClassificationOutcome, CompleteAnalysis, Corpus, SearchOutcome, SentimentOutcome,
};
use crate::vector_store::QdrantStore;
use crate::worker::{QueuedEmbedder, QueuedSentiment, QueuedZeroShot, WorkerOptions};

/// Raw capability handles before they are wrapped in workers.
pub struct Capabilities {
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<dyn VectorStore>,
    pub classifier: Arc<dyn ZeroShotClassifier>,
    pub sentiment: Arc<dyn SentimentModel>,
}

/// The initialized pipeline: corpus, populated index and model workers.
///
/// Read-only after construction and safe to share across tasks.
pub struct Analyzer {
    corpus: Corpus,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    classifier: Arc<dyn ZeroShotClassifier>,
    sentiment: Arc<dyn SentimentModel>,
    index: IndexBuildReport,
}

impl Analyzer {
    /// Loads and normalizes the dataset, connects the configured model
    /// endpoints and vector store, and builds the index if it is empty.
    ///
    /// 1. Load the dataset CSV.
    /// 2. Normalize it into a corpus of at most `max_rows` records.
    /// 3. Build the TEI, zero-shot and sentiment clients.
    /// 4. Open (or create) the Qdrant collection or local index file.
    /// 5. Populate the index and start the model workers.
    ///
    /// # Errors
    ///
    /// Any failure here is fatal for the service: unreadable dataset, no text
    /// column, empty corpus, unreachable store or a failed index build.
    pub async fn initialize(config: &AppConfig) -> Result<Self, AnalyticsError> {
        let table = load_csv(&config.dataset_path)?;
        let corpus = normalize(&table, config.max_rows)?;

        let timeout = Duration::from_secs(config.model_timeout_secs);
        let api_key = config.inference_api_key.clone();
        let embedder = TeiClient::new(&config.tei_url, timeout, api_key.clone())?;
        let classifier = ZeroShotClient::new(&config.zero_shot_url, timeout, api_key.clone())?;
        let sentiment = TeiSentimentClient::new(&config.sentiment_url, timeout, api_key)?;

        let store: Arc<dyn VectorStore> = match config.vector_backend {
            VectorBackend::Qdrant => Arc::new(
                QdrantStore::open_or_create(
                    &config.qdrant_url,
                    &config.qdrant_collection,
                    config.vector_dim,
                    config.qdrant_api_key.clone(),
                    timeout,
                )
                .await?,
            ),
            VectorBackend::Local => {
                Arc::new(LocalVectorStore::open_or_create(&config.local_index_path).await?)
            }
        };
        tracing::info!(backend = %config.vector_backend, "vector store ready");

        let capabilities = Capabilities {
            embedder: Arc::new(embedder),
            store,
            classifier: Arc::new(classifier),
            sentiment: Arc::new(sentiment),
        };
        Self::from_parts(corpus, capabilities, &WorkerOptions::from_app_config(config)).await
    }

    /// Builds the index with the raw embedder, then puts every model
    /// capability behind its own worker.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::EmptyCorpus`] if the corpus has no records,
    /// or the index build error.
    pub async fn from_parts(
        corpus: Corpus,
        capabilities: Capabilities,
        options: &WorkerOptions,
    ) -> Result<Self, AnalyticsError> {
        if corpus.is_empty() {
            return Err(AnalyticsError::EmptyCorpus(format!(
                "no non-blank text among {} source rows",
                corpus.source_rows()
            )));
        }

        let index = build_index_if_empty(
            &corpus,
            capabilities.embedder.as_ref(),
            capabilities.store.as_ref(),
        )
        .await?;

        tracing::info!(
            records = corpus.len(),
            categories = corpus.categories().len(),
            index = ?index,
            "analyzer initialized"
        );

        Ok(Self {
            embedder: Arc::new(QueuedEmbedder::spawn(capabilities.embedder, options)),
            store: capabilities.store,
            classifier: Arc::new(QueuedZeroShot::spawn(capabilities.classifier, options)),
            sentiment: Arc::new(QueuedSentiment::spawn(capabilities.sentiment, options)),
            corpus,
            index,
        })
    }

    #[must_use]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Default zero-shot labels: the corpus category snapshot.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        self.corpus.categories()
    }

    #[must_use]
    pub fn index_report(&self) -> IndexBuildReport {
        self.index
    }

    pub async fn search(&self, prompt: &str, top_k: usize) -> SearchOutcome {
        search::search(self.embedder.as_ref(), self.store.as_ref(), prompt, top_k).await
    }

    /// Classifies against `labels`, or the corpus categories when `None`.
    pub async fn classify_text(
        &self,
        text: &str,
        labels: Option<&[String]>,
    ) -> ClassificationOutcome {
        let labels = labels.unwrap_or_else(|| self.labels());
        classifier::classify_text(self.classifier.as_ref(), text, labels).await
    }

    pub async fn score_sentiment(&self, text: &str) -> SentimentOutcome {
        sentiment::score_sentiment(self.sentiment.as_ref(), text).await
    }

    /// Runs search, classification and sentiment concurrently.
    ///
    /// Each part reports its own failure; one failing never blocks the others.
    pub async fn analyze(&self, prompt: &str, top_k: usize) -> CompleteAnalysis {
        analyze(
            Pipeline {
                embedder: self.embedder.as_ref(),
                store: self.store.as_ref(),
                classifier: self.classifier.as_ref(),
                sentiment: self.sentiment.as_ref(),
            },
            prompt,
            top_k,
            self.labels(),
        )
        .await
    }
}

/// Borrowed capability handles for [`analyze`].
#[derive(Clone, Copy)]
pub struct Pipeline<'a> {
    pub embedder: &'a dyn Embedder,
    pub store: &'a dyn VectorStore,
    pub classifier: &'a dyn ZeroShotClassifier,
    pub sentiment: &'a dyn SentimentModel,
}

/// Fans out to search, classification against `labels` and sentiment, then
/// bundles the three outcomes.
pub async fn analyze(
    pipeline: Pipeline<'_>,
    prompt: &str,
    top_k: usize,
    labels: &[String],
) -> CompleteAnalysis {
    let (search, classification, sentiment) = tokio::join!(
        search::search(pipeline.embedder, pipeline.store, prompt, top_k),
        classifier::classify_text(pipeline.classifier, prompt, labels),
        sentiment::score_sentiment(pipeline.sentiment, prompt),
    );
    tracing::debug!(
        hits = search.hits().len(),
        search_unavailable = search.is_unavailable(),
        classified = classification.error().is_none(),
        scored = sentiment.error().is_none(),
        "analysis complete"
    );
    CompleteAnalysis::new(prompt, search, classification, sentiment)
}
