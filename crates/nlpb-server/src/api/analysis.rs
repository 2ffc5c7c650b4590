use axum::{extract::State, Extension, Json};
use nlpb_analytics::{ClassificationOutcome, CompleteAnalysis, SearchOutcome, SentimentOutcome};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

pub(super) const MAX_TOP_K: usize = 100;
const MAX_LABELS: usize = 50;

#[derive(Debug, Deserialize)]
pub(super) struct PromptRequest {
    prompt: String,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ClassifyRequest {
    prompt: String,
    #[serde(default)]
    labels: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SentimentRequest {
    prompt: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SimilarData {
    prompt: String,
    top_k: usize,
    #[serde(flatten)]
    outcome: SearchOutcome,
}

#[derive(Debug, Serialize)]
pub(super) struct ClassifyData {
    prompt: String,
    labels: Vec<String>,
    classification: ClassificationOutcome,
}

#[derive(Debug, Serialize)]
pub(super) struct SentimentData {
    prompt: String,
    sentiment: SentimentOutcome,
}

fn validate_prompt(request_id: &str, prompt: &str) -> Result<(), ApiError> {
    if prompt.trim().is_empty() {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "prompt must not be empty",
        ));
    }
    Ok(())
}

pub(super) fn resolve_top_k(
    request_id: &str,
    top_k: Option<usize>,
    default: usize,
) -> Result<usize, ApiError> {
    let top_k = top_k.unwrap_or(default);
    if !(1..=MAX_TOP_K).contains(&top_k) {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            format!("top_k must be between 1 and {MAX_TOP_K}"),
        ));
    }
    Ok(top_k)
}

fn validate_labels(request_id: &str, labels: &[String]) -> Result<(), ApiError> {
    if labels.is_empty() || labels.len() > MAX_LABELS {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            format!("labels must contain 1-{MAX_LABELS} entries"),
        ));
    }
    if labels.iter().any(|l| l.trim().is_empty()) {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "labels must not be blank",
        ));
    }
    Ok(())
}

pub(super) async fn similar(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<PromptRequest>,
) -> Result<Json<ApiResponse<SimilarData>>, ApiError> {
    let rid = &req_id.0;
    validate_prompt(rid, &body.prompt)?;
    let top_k = resolve_top_k(rid, body.top_k, state.default_top_k)?;

    let outcome = state.analyzer.search(&body.prompt, top_k).await;

    Ok(Json(ApiResponse {
        data: SimilarData {
            prompt: body.prompt,
            top_k,
            outcome,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn classify(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ClassifyRequest>,
) -> Result<Json<ApiResponse<ClassifyData>>, ApiError> {
    let rid = &req_id.0;
    validate_prompt(rid, &body.prompt)?;
    if let Some(labels) = &body.labels {
        validate_labels(rid, labels)?;
    }

    let classification = state
        .analyzer
        .classify_text(&body.prompt, body.labels.as_deref())
        .await;
    let labels = body
        .labels
        .unwrap_or_else(|| state.analyzer.labels().to_vec());

    Ok(Json(ApiResponse {
        data: ClassifyData {
            prompt: body.prompt,
            labels,
            classification,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn sentiment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SentimentRequest>,
) -> Result<Json<ApiResponse<SentimentData>>, ApiError> {
    validate_prompt(&req_id.0, &body.prompt)?;

    let sentiment = state.analyzer.score_sentiment(&body.prompt).await;

    Ok(Json(ApiResponse {
        data: SentimentData {
            prompt: body.prompt,
            sentiment,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<PromptRequest>,
) -> Result<Json<ApiResponse<CompleteAnalysis>>, ApiError> {
    let rid = &req_id.0;
    validate_prompt(rid, &body.prompt)?;
    let top_k = resolve_top_k(rid, body.top_k, state.default_top_k)?;

    let analysis = state.analyzer.analyze(&body.prompt, top_k).await;

    Ok(Json(ApiResponse {
        data: analysis,
        meta: ResponseMeta::new(req_id.0),
    }))
}
