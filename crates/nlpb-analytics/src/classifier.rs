use crate::capabilities::ZeroShotClassifier;
use crate::types::{CategoryScore, ClassificationOutcome};

pub(crate) const EMPTY_TEXT: &str = "text is empty";

/// Ranks `labels` for `text` with single-label zero-shot classification.
///
/// Blank text, an empty label set and capability failures all produce
/// [`ClassificationOutcome::Failed`]; this function never errors.
pub async fn classify_text(
    classifier: &dyn ZeroShotClassifier,
    text: &str,
    labels: &[String],
) -> ClassificationOutcome {
    if text.trim().is_empty() {
        return ClassificationOutcome::failed(EMPTY_TEXT);
    }
    if labels.is_empty() {
        return ClassificationOutcome::failed("no candidate labels");
    }

    let mut scores = match classifier.classify(text, labels).await {
        Ok(scores) => scores,
        Err(e) => {
            tracing::warn!(error = %e, labels = labels.len(), "zero-shot classification failed");
            return ClassificationOutcome::failed(e.to_string());
        }
    };
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));

    let ranked: Vec<CategoryScore> = scores
        .into_iter()
        .map(|s| CategoryScore {
            category: s.label,
            score: s.score,
        })
        .collect();
    let Some(top) = ranked.first() else {
        return ClassificationOutcome::failed("classifier returned no scores");
    };

    ClassificationOutcome::Classified {
        top_category: top.category.clone(),
        confidence: top.score,
        ranked,
    }
}
