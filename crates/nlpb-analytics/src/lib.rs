//! Text analytics pipeline for NLPB.
//!
//! Normalizes a tabular dataset into a bounded corpus, embeds it once into a
//! cosine vector index, and answers three questions about a prompt: which
//! corpus texts are closest, which corpus category fits best (zero-shot), and
//! what sentiment it carries. [`Analyzer`] ties the pieces together.

pub mod capabilities;
pub mod classifier;
pub mod error;
pub mod index;
pub mod normalizer;
pub mod pipeline;
pub mod search;
pub mod sentiment;
pub mod table;
pub mod types;
pub mod worker;

mod embeddings;
mod inference;
mod local_store;
mod vector_store;

#[cfg(test)]
mod testing;

pub use capabilities::{
    Embedder, LabelScore, SentimentModel, VectorEntry, VectorMatch, VectorStore, ZeroShotClassifier,
};
pub use embeddings::TeiClient;
pub use error::AnalyticsError;
pub use index::{build_index_if_empty, IndexBuildReport};
pub use inference::{TeiSentimentClient, ZeroShotClient};
pub use local_store::LocalVectorStore;
pub use normalizer::normalize;
pub use pipeline::{analyze, Analyzer, Capabilities, Pipeline};
pub use search::DEFAULT_TOP_K;
pub use sentiment::POLARITY_LABELS;
pub use table::{load_csv, Cell, Column, ColumnKind, RawTable};
pub use types::{
    CategoryScore, CategorySource, ClassificationOutcome, ColumnSelection, CompleteAnalysis,
    Corpus, LanguageSource, NormalizedRecord, SearchOutcome, SentimentOutcome, SimilarityHit,
};
pub use vector_store::QdrantStore;
pub use worker::WorkerOptions;
