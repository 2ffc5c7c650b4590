use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The dataset file could not be opened or parsed as CSV.
    #[error("dataset error for {path}: {source}")]
    Dataset {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// The table has no usable text column, or its columns disagree on length.
    #[error("schema error: {0}")]
    Schema(String),

    #[error("corpus is empty: {0}")]
    EmptyCorpus(String),

    #[error("TEI embed error: {0}")]
    Tei(String),

    #[error("Qdrant error: {0}")]
    Qdrant(String),

    #[error("local index error for {path}: {reason}")]
    LocalIndex { path: String, reason: String },

    #[error("zero-shot classification error: {0}")]
    ZeroShot(String),

    #[error("sentiment model error: {0}")]
    Sentiment(String),

    /// A vector store returned a match that cannot be mapped back to a record.
    #[error("malformed vector match: {0}")]
    MalformedMatch(String),

    #[error("index build error: {0}")]
    IndexBuild(String),

    #[error("{worker} worker did not answer within {timeout_ms} ms")]
    WorkerTimeout {
        worker: &'static str,
        timeout_ms: u64,
    },

    #[error("{0} worker is not running")]
    WorkerClosed(&'static str),
}
