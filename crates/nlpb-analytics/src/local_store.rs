//! File-backed vector store for single-node deployments and tests.
//!
//! Entries live in memory and, when a path is set, are rewritten to a JSON
//! file after every insert. Queries are an exact cosine scan.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::capabilities::{VectorEntry, VectorMatch, VectorStore};
use crate::error::AnalyticsError;

const SPACE_COSINE: &str = "cosine";

#[derive(Serialize, Deserialize)]
struct IndexFile {
    space: String,
    entries: Vec<VectorEntry>,
}

pub struct LocalVectorStore {
    path: Option<PathBuf>,
    entries: RwLock<Vec<VectorEntry>>,
}

impl LocalVectorStore {
    /// Loads the index file at `path`, or starts empty if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::LocalIndex`] if the file exists but cannot be
    /// read or was written for a different distance space.
    pub async fn open_or_create(path: &Path) -> Result<Self, AnalyticsError> {
        let local_error = |reason: String| AnalyticsError::LocalIndex {
            path: path.display().to_string(),
            reason,
        };

        let entries = match tokio::fs::read(path).await {
            Ok(bytes) => {
                let file: IndexFile =
                    serde_json::from_slice(&bytes).map_err(|e| local_error(e.to_string()))?;
                if file.space != SPACE_COSINE {
                    return Err(local_error(format!(
                        "index uses {:?} space, expected {SPACE_COSINE:?}",
                        file.space
                    )));
                }
                tracing::info!(
                    path = %path.display(),
                    entries = file.entries.len(),
                    "local index loaded"
                );
                file.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "local index not found, starting empty");
                Vec::new()
            }
            Err(e) => return Err(local_error(e.to_string())),
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            entries: RwLock::new(entries),
        })
    }

    /// An in-memory store that is never written to disk.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            entries: RwLock::new(Vec::new()),
        }
    }

    fn location(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string())
    }

    async fn persist(&self, entries: &[VectorEntry]) -> Result<(), AnalyticsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let local_error = |reason: String| AnalyticsError::LocalIndex {
            path: path.display().to_string(),
            reason,
        };

        let content = serde_json::to_vec(&IndexFile {
            space: SPACE_COSINE.to_string(),
            entries: entries.to_vec(),
        })
        .map_err(|e| local_error(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| local_error(e.to_string()))?;
        }
        // Sibling temp file, then rename over the index.
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(|e| local_error(e.to_string()))?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| local_error(e.to_string()))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl VectorStore for LocalVectorStore {
    async fn count(&self) -> Result<usize, AnalyticsError> {
        Ok(self.entries.read().await.len())
    }

    /// Entries with an id already present replace the stored one.
    async fn insert(&self, new_entries: Vec<VectorEntry>) -> Result<(), AnalyticsError> {
        let mut entries = self.entries.write().await;
        for entry in new_entries {
            match entries.iter_mut().find(|e| e.id == entry.id) {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }
        self.persist(&entries).await
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<VectorMatch>, AnalyticsError> {
        let entries = self.entries.read().await;
        if let Some(entry) = entries.iter().find(|e| e.vector.len() != vector.len()) {
            return Err(AnalyticsError::LocalIndex {
                path: self.location(),
                reason: format!(
                    "query has dimension {}, {} has dimension {}",
                    vector.len(),
                    entry.id,
                    entry.vector.len()
                ),
            });
        }
        let mut scored: Vec<(f32, &VectorEntry)> = entries
            .iter()
            .map(|entry| (cosine_distance(vector, &entry.vector), entry))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(distance, entry)| VectorMatch {
                id: entry.id.clone(),
                text: entry.text.clone(),
                metadata: entry.metadata.clone(),
                distance,
            })
            .collect())
    }
}

/// `1 - cos(a, b)`, in `[0, 2]`. Zero vectors are orthogonal to everything.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 1.0;
    }
    (1.0 - dot / (norm_a * norm_b)).clamp(0.0, 2.0)
}
