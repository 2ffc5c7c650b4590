//! HTTP clients for the hosted classification models.
//!
//! [`ZeroShotClient`] speaks the Hugging Face inference zero-shot protocol and
//! [`TeiSentimentClient`] calls the `/predict` route of a TEI instance serving
//! a sequence-classification model.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capabilities::{LabelScore, SentimentModel, ZeroShotClassifier};
use crate::error::AnalyticsError;

fn build_client(timeout: Duration) -> Result<reqwest::Client, AnalyticsError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

fn authorize(builder: reqwest::RequestBuilder, api_key: Option<&str>) -> reqwest::RequestBuilder {
    match api_key {
        Some(key) => builder.bearer_auth(key),
        None => builder,
    }
}

pub struct ZeroShotClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
    multi_label: bool,
}

#[derive(Deserialize)]
struct ZeroShotScores {
    labels: Vec<String>,
    scores: Vec<f32>,
}

/// Some deployments wrap the single result in a one-element array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Single(ZeroShotScores),
    Batch(Vec<ZeroShotScores>),
}

impl ZeroShotClient {
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Http`] if the HTTP client cannot be built.
    pub fn new(
        url: &str,
        timeout: Duration,
        api_key: Option<String>,
    ) -> Result<Self, AnalyticsError> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl ZeroShotClassifier for ZeroShotClient {
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<Vec<LabelScore>, AnalyticsError> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: labels,
                multi_label: false,
            },
        };
        let response = authorize(
            self.client.post(&self.url).json(&request),
            self.api_key.as_deref(),
        )
        .send()
        .await
        .map_err(|e| AnalyticsError::ZeroShot(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AnalyticsError::ZeroShot(format!(
                "endpoint returned status {}",
                response.status()
            )));
        }

        let parsed: ZeroShotResponse = response
            .json()
            .await
            .map_err(|e| AnalyticsError::ZeroShot(format!("response parse error: {e}")))?;
        let scores = match parsed {
            ZeroShotResponse::Single(scores) => scores,
            ZeroShotResponse::Batch(batch) => batch
                .into_iter()
                .next()
                .ok_or_else(|| AnalyticsError::ZeroShot("empty batch response".to_string()))?,
        };

        if scores.labels.len() != scores.scores.len() {
            return Err(AnalyticsError::ZeroShot(format!(
                "{} labels but {} scores",
                scores.labels.len(),
                scores.scores.len()
            )));
        }

        Ok(scores
            .labels
            .into_iter()
            .zip(scores.scores)
            .map(|(label, score)| LabelScore { label, score })
            .collect())
    }
}

pub struct TeiSentimentClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a str,
    raw_scores: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PredictResponse {
    Flat(Vec<LabelScore>),
    Nested(Vec<Vec<LabelScore>>),
}

impl TeiSentimentClient {
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Http`] if the HTTP client cannot be built.
    pub fn new(
        tei_url: &str,
        timeout: Duration,
        api_key: Option<String>,
    ) -> Result<Self, AnalyticsError> {
        Ok(Self {
            client: build_client(timeout)?,
            url: format!("{}/predict", tei_url.trim_end_matches('/')),
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl SentimentModel for TeiSentimentClient {
    async fn score(&self, text: &str) -> Result<Vec<LabelScore>, AnalyticsError> {
        let request = PredictRequest {
            inputs: text,
            raw_scores: false,
        };
        let response = authorize(
            self.client.post(&self.url).json(&request),
            self.api_key.as_deref(),
        )
        .send()
        .await
        .map_err(|e| AnalyticsError::Sentiment(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AnalyticsError::Sentiment(format!(
                "predict returned status {}",
                response.status()
            )));
        }

        let parsed: PredictResponse = response
            .json()
            .await
            .map_err(|e| AnalyticsError::Sentiment(format!("response parse error: {e}")))?;
        Ok(match parsed {
            PredictResponse::Flat(scores) => scores,
            PredictResponse::Nested(batch) => batch.into_iter().next().unwrap_or_default(),
        })
    }
}
