use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which vector store engine backs the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorBackend {
    /// Remote Qdrant collection.
    Qdrant,
    /// JSON file on local disk, searched in memory.
    Local,
}

impl std::fmt::Display for VectorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorBackend::Qdrant => write!(f, "qdrant"),
            VectorBackend::Local => write!(f, "local"),
        }
    }
}

/// Settings needed to read and normalize the dataset without any model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    pub log_level: String,
    pub dataset_path: PathBuf,
    pub max_rows: usize,
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub dataset_path: PathBuf,
    pub max_rows: usize,
    pub default_top_k: usize,
    pub tei_url: String,
    pub sentiment_url: String,
    pub zero_shot_url: String,
    pub inference_api_key: Option<String>,
    pub vector_backend: VectorBackend,
    pub qdrant_url: String,
    pub qdrant_collection: String,
    pub qdrant_api_key: Option<String>,
    pub vector_dim: u64,
    pub local_index_path: PathBuf,
    pub model_timeout_secs: u64,
    pub model_queue_depth: usize,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("dataset_path", &self.dataset_path)
            .field("max_rows", &self.max_rows)
            .field("default_top_k", &self.default_top_k)
            .field("tei_url", &self.tei_url)
            .field("sentiment_url", &self.sentiment_url)
            .field("zero_shot_url", &self.zero_shot_url)
            .field(
                "inference_api_key",
                &self.inference_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("vector_backend", &self.vector_backend)
            .field("qdrant_url", &self.qdrant_url)
            .field("qdrant_collection", &self.qdrant_collection)
            .field(
                "qdrant_api_key",
                &self.qdrant_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("vector_dim", &self.vector_dim)
            .field("local_index_path", &self.local_index_path)
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("model_queue_depth", &self.model_queue_depth)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
