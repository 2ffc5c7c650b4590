//! In-process capability fakes shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::capabilities::{Embedder, LabelScore, SentimentModel, ZeroShotClassifier};
use crate::error::AnalyticsError;
use crate::types::{CategorySource, ColumnSelection, Corpus, LanguageSource, NormalizedRecord};

const FAKE_DIM: usize = 8;

pub(crate) fn corpus_of(rows: &[(&str, &str)]) -> Corpus {
    let records = rows
        .iter()
        .enumerate()
        .map(|(id, (text, category))| NormalizedRecord {
            id,
            text: (*text).to_string(),
            category: (*category).to_string(),
            language: "pt".to_string(),
        })
        .collect();
    let selection = ColumnSelection {
        text: "text".to_string(),
        category: CategorySource::Column("category".to_string()),
        language: LanguageSource::Default,
    };
    Corpus::new(records, selection, rows.len())
}

pub(crate) fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

/// Deterministic bag-of-bytes vectors; identical texts embed identically.
#[derive(Default)]
pub(crate) struct FakeEmbedder {
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalyticsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0_f32; FAKE_DIM];
                for byte in text.to_lowercase().bytes() {
                    vector[usize::from(byte) % FAKE_DIM] += 1.0;
                }
                vector
            })
            .collect())
    }
}

pub(crate) struct FailingEmbedder;

#[async_trait::async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, AnalyticsError> {
        Err(AnalyticsError::Tei("connection refused".to_string()))
    }
}

/// Scores labels by position, so the last candidate always wins.
pub(crate) struct FakeZeroShot;

#[async_trait::async_trait]
impl ZeroShotClassifier for FakeZeroShot {
    #[allow(clippy::cast_precision_loss)]
    async fn classify(
        &self,
        _text: &str,
        labels: &[String],
    ) -> Result<Vec<LabelScore>, AnalyticsError> {
        let total = (labels.len() * (labels.len() + 1) / 2) as f32;
        Ok(labels
            .iter()
            .enumerate()
            .map(|(i, label)| LabelScore {
                label: label.clone(),
                score: (i + 1) as f32 / total,
            })
            .collect())
    }
}

pub(crate) struct FailingZeroShot;

#[async_trait::async_trait]
impl ZeroShotClassifier for FailingZeroShot {
    async fn classify(
        &self,
        _text: &str,
        _labels: &[String],
    ) -> Result<Vec<LabelScore>, AnalyticsError> {
        Err(AnalyticsError::ZeroShot("model offline".to_string()))
    }
}

/// Always leans five stars.
pub(crate) struct FakeSentiment;

#[async_trait::async_trait]
impl SentimentModel for FakeSentiment {
    async fn score(&self, _text: &str) -> Result<Vec<LabelScore>, AnalyticsError> {
        Ok([
            ("1 star", 0.02),
            ("2 stars", 0.03),
            ("3 stars", 0.05),
            ("4 stars", 0.2),
            ("5 stars", 0.7),
        ]
        .into_iter()
        .map(|(label, score)| LabelScore {
            label: label.to_string(),
            score,
        })
        .collect())
    }
}

pub(crate) struct FailingSentiment;

#[async_trait::async_trait]
impl SentimentModel for FailingSentiment {
    async fn score(&self, _text: &str) -> Result<Vec<LabelScore>, AnalyticsError> {
        Err(AnalyticsError::Sentiment("model offline".to_string()))
    }
}
