use serde::{Deserialize, Serialize};

/// One corpus row after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Dense, zero-based position in the final corpus.
    pub id: usize,
    /// Never empty or whitespace-only.
    pub text: String,
    pub category: String,
    pub language: String,
}

/// Where the category of each record came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "column", rename_all = "snake_case")]
pub enum CategorySource {
    /// An explicit category column.
    Column(String),
    /// Derived from a boolean inbound/outbound column.
    Inbound(String),
    /// Every record got the default category.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "column", rename_all = "snake_case")]
pub enum LanguageSource {
    Column(String),
    Default,
}

/// Which source columns the normalizer picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSelection {
    pub text: String,
    pub category: CategorySource,
    pub language: LanguageSource,
}

/// The normalized, size-bounded corpus.
///
/// Read-only once built. The category list is a snapshot of the distinct
/// record categories in first-seen order and is the default zero-shot label set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Corpus {
    records: Vec<NormalizedRecord>,
    categories: Vec<String>,
    selection: ColumnSelection,
    source_rows: usize,
}

impl Corpus {
    pub(crate) fn new(
        records: Vec<NormalizedRecord>,
        selection: ColumnSelection,
        source_rows: usize,
    ) -> Self {
        let mut categories: Vec<String> = Vec::new();
        for record in &records {
            if !categories.contains(&record.category) {
                categories.push(record.category.clone());
            }
        }
        Self {
            records,
            categories,
            selection,
            source_rows,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, id: usize) -> Option<&NormalizedRecord> {
        self.records.get(id)
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub fn selection(&self) -> &ColumnSelection {
        &self.selection
    }

    /// Row count of the source table before blank rows were dropped and the
    /// corpus was truncated.
    #[must_use]
    pub fn source_rows(&self) -> usize {
        self.source_rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A corpus text close to the prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityHit {
    pub id: usize,
    pub text: String,
    pub category: String,
    pub language: String,
    /// `1 - distance / 2`; 1.0 means identical direction.
    pub similarity: f32,
}

/// Result of a similarity search.
///
/// `Hits` with an empty list means nothing matched; `Unavailable` means the
/// embedder or the vector store failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    Hits { hits: Vec<SimilarityHit> },
    Unavailable { reason: String },
}

impl SearchOutcome {
    #[must_use]
    pub fn hits(&self) -> &[SimilarityHit] {
        match self {
            SearchOutcome::Hits { hits } => hits,
            SearchOutcome::Unavailable { .. } => &[],
        }
    }

    /// Collapses to a plain hit list, turning `Unavailable` into an empty one.
    #[must_use]
    pub fn into_hits(self) -> Vec<SimilarityHit> {
        match self {
            SearchOutcome::Hits { hits } => hits,
            SearchOutcome::Unavailable { .. } => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SearchOutcome::Unavailable { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClassificationOutcome {
    Classified {
        top_category: String,
        confidence: f32,
        /// Every candidate label, highest score first.
        ranked: Vec<CategoryScore>,
    },
    Failed {
        error: String,
    },
}

impl ClassificationOutcome {
    pub(crate) fn failed(error: impl Into<String>) -> Self {
        ClassificationOutcome::Failed {
            error: error.into(),
        }
    }

    #[must_use]
    pub fn ranked(&self) -> &[CategoryScore] {
        match self {
            ClassificationOutcome::Classified { ranked, .. } => ranked,
            ClassificationOutcome::Failed { .. } => &[],
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            ClassificationOutcome::Classified { .. } => None,
            ClassificationOutcome::Failed { error } => Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SentimentOutcome {
    Scored {
        sentiment_label: String,
        raw_label: String,
        confidence: f32,
    },
    Failed {
        error: String,
    },
}

impl SentimentOutcome {
    pub(crate) fn failed(error: impl Into<String>) -> Self {
        SentimentOutcome::Failed {
            error: error.into(),
        }
    }

    #[must_use]
    pub fn sentiment_label(&self) -> Option<&str> {
        match self {
            SentimentOutcome::Scored {
                sentiment_label, ..
            } => Some(sentiment_label),
            SentimentOutcome::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            SentimentOutcome::Scored { .. } => None,
            SentimentOutcome::Failed { error } => Some(error),
        }
    }
}

/// Search, classification and sentiment for one prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteAnalysis {
    pub prompt: String,
    pub similarity_hits: Vec<SimilarityHit>,
    /// Set when search was unavailable; `similarity_hits` is then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_error: Option<String>,
    pub classification: ClassificationOutcome,
    pub sentiment: SentimentOutcome,
}

impl CompleteAnalysis {
    pub(crate) fn new(
        prompt: &str,
        search: SearchOutcome,
        classification: ClassificationOutcome,
        sentiment: SentimentOutcome,
    ) -> Self {
        let (similarity_hits, similarity_error) = match search {
            SearchOutcome::Hits { hits } => (hits, None),
            SearchOutcome::Unavailable { reason } => (Vec::new(), Some(reason)),
        };
        Self {
            prompt: prompt.to_string(),
            similarity_hits,
            similarity_error,
            classification,
            sentiment,
        }
    }
}
