//! Star-rating sentiment remapped onto five polarity labels.

use crate::capabilities::SentimentModel;
use crate::classifier::EMPTY_TEXT;
use crate::types::SentimentOutcome;

/// Star label emitted by the model and the polarity it maps to.
const STAR_LABELS: [(&str, &str); 5] = [
    ("1 star", "Very Negative"),
    ("2 stars", "Negative"),
    ("3 stars", "Neutral"),
    ("4 stars", "Positive"),
    ("5 stars", "Very Positive"),
];

/// Every polarity label, most negative first.
pub const POLARITY_LABELS: [&str; 5] = [
    STAR_LABELS[0].1,
    STAR_LABELS[1].1,
    STAR_LABELS[2].1,
    STAR_LABELS[3].1,
    STAR_LABELS[4].1,
];

/// Maps a star label to its polarity; unknown labels pass through unchanged.
#[must_use]
pub fn map_star_label(raw: &str) -> &str {
    STAR_LABELS
        .iter()
        .find(|(star, _)| *star == raw)
        .map_or(raw, |&(_, polarity)| polarity)
}

/// Scores `text` and keeps the highest-scoring label.
///
/// Blank text and capability failures produce [`SentimentOutcome::Failed`].
pub async fn score_sentiment(model: &dyn SentimentModel, text: &str) -> SentimentOutcome {
    if text.trim().is_empty() {
        return SentimentOutcome::failed(EMPTY_TEXT);
    }

    let scores = match model.score(text).await {
        Ok(scores) => scores,
        Err(e) => {
            tracing::warn!(error = %e, "sentiment scoring failed");
            return SentimentOutcome::failed(e.to_string());
        }
    };

    let Some(best) = scores.into_iter().max_by(|a, b| a.score.total_cmp(&b.score)) else {
        return SentimentOutcome::failed("sentiment model returned no scores");
    };
    SentimentOutcome::Scored {
        sentiment_label: map_star_label(&best.label).to_string(),
        raw_label: best.label,
        confidence: best.score,
    }
}
