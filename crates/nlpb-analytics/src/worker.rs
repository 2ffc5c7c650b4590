//! Single-owner workers in front of the model capabilities.
//!
//! Each capability is owned by one background task that serves requests one
//! at a time from a bounded queue. Callers wait on a oneshot reply under a
//! deadline that covers both queueing and inference; a caller that gives up
//! does not cancel the job already handed to the worker.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use nlpb_core::AppConfig;
use tokio::sync::{mpsc, oneshot};

use crate::capabilities::{Embedder, LabelScore, SentimentModel, ZeroShotClassifier};
use crate::error::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerOptions {
    /// Pending requests allowed per worker before callers wait for a slot.
    pub queue_depth: usize,
    /// Deadline for one call, queueing included.
    pub timeout: Duration,
}

impl WorkerOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            queue_depth: config.model_queue_depth,
            timeout: Duration::from_secs(config.model_timeout_secs),
        }
    }
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            queue_depth: 32,
            timeout: Duration::from_secs(30),
        }
    }
}

struct Job<Req, Resp> {
    request: Req,
    reply: oneshot::Sender<Result<Resp, AnalyticsError>>,
}

struct ModelWorker<Req, Resp> {
    name: &'static str,
    tx: mpsc::Sender<Job<Req, Resp>>,
    timeout: Duration,
}

impl<Req, Resp> ModelWorker<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Must be called from within a tokio runtime.
    fn spawn<F, Fut>(name: &'static str, options: &WorkerOptions, handler: F) -> Self
    where
        F: Fn(Req) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Resp, AnalyticsError>> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<Job<Req, Resp>>(options.queue_depth.max(1));
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let result = handler(job.request).await;
                if job.reply.send(result).is_err() {
                    tracing::debug!(worker = name, "caller gave up before the reply");
                }
            }
            tracing::debug!(worker = name, "model worker stopped");
        });
        tracing::debug!(
            worker = name,
            queue_depth = options.queue_depth,
            timeout_ms = duration_ms(options.timeout),
            "model worker started"
        );
        Self {
            name,
            tx,
            timeout: options.timeout,
        }
    }

    async fn call(&self, request: Req) -> Result<Resp, AnalyticsError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let exchange = async {
            self.tx
                .send(Job {
                    request,
                    reply: reply_tx,
                })
                .await
                .map_err(|_| AnalyticsError::WorkerClosed(self.name))?;
            match reply_rx.await {
                Ok(result) => result,
                Err(_) => Err(AnalyticsError::WorkerClosed(self.name)),
            }
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                tracing::warn!(worker = self.name, "model call timed out");
                AnalyticsError::WorkerTimeout {
                    worker: self.name,
                    timeout_ms: duration_ms(self.timeout),
                }
            })?
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

pub(crate) struct QueuedEmbedder {
    worker: ModelWorker<Vec<String>, Vec<Vec<f32>>>,
}

impl QueuedEmbedder {
    pub(crate) fn spawn(inner: Arc<dyn Embedder>, options: &WorkerOptions) -> Self {
        let worker = ModelWorker::spawn("embedder", options, move |texts: Vec<String>| {
            let inner = Arc::clone(&inner);
            async move { inner.embed(&texts).await }
        });
        Self { worker }
    }
}

#[async_trait::async_trait]
impl Embedder for QueuedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AnalyticsError> {
        self.worker.call(texts.to_vec()).await
    }
}

pub(crate) struct QueuedZeroShot {
    worker: ModelWorker<(String, Vec<String>), Vec<LabelScore>>,
}

impl QueuedZeroShot {
    pub(crate) fn spawn(inner: Arc<dyn ZeroShotClassifier>, options: &WorkerOptions) -> Self {
        let worker = ModelWorker::spawn(
            "zero-shot",
            options,
            move |(text, labels): (String, Vec<String>)| {
                let inner = Arc::clone(&inner);
                async move { inner.classify(&text, &labels).await }
            },
        );
        Self { worker }
    }
}

#[async_trait::async_trait]
impl ZeroShotClassifier for QueuedZeroShot {
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<Vec<LabelScore>, AnalyticsError> {
        self.worker.call((text.to_string(), labels.to_vec())).await
    }
}

pub(crate) struct QueuedSentiment {
    worker: ModelWorker<String, Vec<LabelScore>>,
}

impl QueuedSentiment {
    pub(crate) fn spawn(inner: Arc<dyn SentimentModel>, options: &WorkerOptions) -> Self {
        let worker = ModelWorker::spawn("sentiment", options, move |text: String| {
            let inner = Arc::clone(&inner);
            async move { inner.score(&text).await }
        });
        Self { worker }
    }
}

#[async_trait::async_trait]
impl SentimentModel for QueuedSentiment {
    async fn score(&self, text: &str) -> Result<Vec<LabelScore>, AnalyticsError> {
        self.worker.call(text.to_string()).await
    }
}
