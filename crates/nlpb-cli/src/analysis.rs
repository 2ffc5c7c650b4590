//! Command handlers for the CLI.
//!
//! Every handler prints one pretty JSON document to stdout; logs go to stderr.

use nlpb_analytics::{
    load_csv, normalize, Analyzer, ColumnSelection, IndexBuildReport, NormalizedRecord,
};
use nlpb_core::{AppConfig, DatasetConfig};
use serde::Serialize;

/// Largest `--top-k` accepted, matching the HTTP API.
pub(crate) const MAX_TOP_K: usize = 100;

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    dataset: String,
    source_rows: usize,
    records: usize,
    selection: &'a ColumnSelection,
    categories: &'a [String],
    sample: &'a [NormalizedRecord],
}

#[derive(Debug, Serialize)]
struct IndexReport<'a> {
    records: usize,
    categories: &'a [String],
    index: IndexBuildReport,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Resolve `--top-k` against the configured default.
///
/// # Errors
///
/// Returns an error when the resolved value is outside `1..=MAX_TOP_K`.
pub(crate) fn resolve_top_k(top_k: Option<usize>, default: usize) -> anyhow::Result<usize> {
    let top_k = top_k.unwrap_or(default);
    if !(1..=MAX_TOP_K).contains(&top_k) {
        anyhow::bail!("--top-k must be between 1 and {MAX_TOP_K}, got {top_k}");
    }
    Ok(top_k)
}

/// Drop blank labels; an empty result means "use the corpus categories".
pub(crate) fn clean_labels(labels: Option<Vec<String>>) -> Option<Vec<String>> {
    let labels: Vec<String> = labels?
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    (!labels.is_empty()).then_some(labels)
}

fn require_prompt(prompt: &str) -> anyhow::Result<()> {
    if prompt.trim().is_empty() {
        anyhow::bail!("prompt must not be empty");
    }
    Ok(())
}

pub(crate) fn run_inspect(config: &DatasetConfig, sample: usize) -> anyhow::Result<()> {
    let table = load_csv(&config.dataset_path)?;
    let corpus = normalize(&table, config.max_rows)?;
    let shown = sample.min(corpus.len());

    print_json(&InspectReport {
        dataset: config.dataset_path.display().to_string(),
        source_rows: corpus.source_rows(),
        records: corpus.len(),
        selection: corpus.selection(),
        categories: corpus.categories(),
        sample: &corpus.records()[..shown],
    })
}

pub(crate) async fn run_index(config: &AppConfig) -> anyhow::Result<()> {
    let analyzer = Analyzer::initialize(config).await?;
    print_json(&IndexReport {
        records: analyzer.corpus().len(),
        categories: analyzer.labels(),
        index: analyzer.index_report(),
    })
}

pub(crate) async fn run_search(
    config: &AppConfig,
    prompt: &str,
    top_k: Option<usize>,
) -> anyhow::Result<()> {
    require_prompt(prompt)?;
    let top_k = resolve_top_k(top_k, config.default_top_k)?;
    let analyzer = Analyzer::initialize(config).await?;

    let outcome = analyzer.search(prompt, top_k).await;
    if outcome.is_unavailable() {
        tracing::warn!("similarity search unavailable");
    }
    print_json(&outcome)
}

pub(crate) async fn run_classify(
    config: &AppConfig,
    prompt: &str,
    labels: Option<Vec<String>>,
) -> anyhow::Result<()> {
    require_prompt(prompt)?;
    let labels = clean_labels(labels);
    let analyzer = Analyzer::initialize(config).await?;

    let outcome = analyzer.classify_text(prompt, labels.as_deref()).await;
    print_json(&outcome)
}

pub(crate) async fn run_sentiment(config: &AppConfig, prompt: &str) -> anyhow::Result<()> {
    require_prompt(prompt)?;
    let analyzer = Analyzer::initialize(config).await?;
    print_json(&analyzer.score_sentiment(prompt).await)
}

pub(crate) async fn run_analyze(
    config: &AppConfig,
    prompt: &str,
    top_k: Option<usize>,
) -> anyhow::Result<()> {
    require_prompt(prompt)?;
    let top_k = resolve_top_k(top_k, config.default_top_k)?;
    let analyzer = Analyzer::initialize(config).await?;

    let analysis = analyzer.analyze(prompt, top_k).await;
    tracing::info!(
        hits = analysis.similarity_hits.len(),
        sentiment = analysis.sentiment.sentiment_label().unwrap_or("-"),
        "analysis complete"
    );
    print_json(&analysis)
}
