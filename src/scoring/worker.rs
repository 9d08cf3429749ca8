// src/scoring/worker.rs
//! Single-consumer scoring worker. One spawned task owns the queue end to end;
//! callers talk to it through a cloneable handle. With exactly one consumer
//! there is exactly one drain loop by construction: a concurrent `drain()` is
//! just another marker in the channel, never a second loop.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{keyword, ImpactScorer, ScoreMethod};
use crate::article::Article;
use crate::cache::ArticleCache;
use crate::stats::StatsRecorder;

enum Msg {
    Score(Box<Article>),
    /// Resolves once every job enqueued before it has been consumed.
    Drain(oneshot::Sender<()>),
}

/// Cheap handle to the worker task.
#[derive(Clone)]
pub struct ScoringHandle {
    tx: mpsc::UnboundedSender<Msg>,
    pending: Arc<AtomicUsize>,
}

impl ScoringHandle {
    /// Queue one article for scoring. Fire-and-forget; the worker applies the
    /// outcome to the cache when its turn comes.
    pub fn enqueue(&self, article: Article) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(Msg::Score(Box::new(article))).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!("scoring worker is gone; dropping article");
        }
    }

    /// Wait until every job enqueued before this call has been resolved. Jobs
    /// enqueued live by an overlapping cycle are consumed by the same worker
    /// after this drain resolves.
    pub async fn drain(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(Msg::Drain(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    /// Number of articles waiting to be scored. Never negative by type.
    pub fn queue_len(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

/// The worker task state. Constructed once and moved into the spawned loop.
pub struct ScoringWorker {
    cache: Arc<ArticleCache>,
    stats: Arc<StatsRecorder>,
    scorer: Option<Arc<dyn ImpactScorer>>,
    min_gap: Duration,
}

impl ScoringWorker {
    /// Spawn the worker and return its handle. The task exits when the last
    /// handle is dropped.
    pub fn spawn(
        cache: Arc<ArticleCache>,
        stats: Arc<StatsRecorder>,
        scorer: Option<Arc<dyn ImpactScorer>>,
        min_gap: Duration,
    ) -> (ScoringHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let handle = ScoringHandle {
            tx,
            pending: pending.clone(),
        };
        let worker = ScoringWorker {
            cache,
            stats,
            scorer,
            min_gap,
        };
        let join = tokio::spawn(worker.run(rx, pending));
        (handle, join)
    }

    async fn run(self, mut rx: mpsc::UnboundedReceiver<Msg>, pending: Arc<AtomicUsize>) {
        // Completion time of the previous scoring API attempt; the gap toward
        // the external rate limit is measured from here.
        let mut last_call: Option<Instant> = None;

        while let Some(msg) = rx.recv().await {
            match msg {
                Msg::Score(article) => {
                    self.stats
                        .set_processing_state(true, pending.load(Ordering::SeqCst));

                    if self.scorer.is_some() {
                        if let Some(prev) = last_call {
                            let elapsed = prev.elapsed();
                            if elapsed < self.min_gap {
                                tokio::time::sleep(self.min_gap - elapsed).await;
                            }
                        }
                    }
                    self.score_one(*article).await;
                    if self.scorer.is_some() {
                        last_call = Some(Instant::now());
                    }

                    let remaining = pending.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
                    self.stats.set_processing_state(remaining > 0, remaining);
                }
                Msg::Drain(done) => {
                    let _ = done.send(());
                }
            }
        }
    }

    /// Resolve one article with some value: AI when available, the keyword
    /// heuristic otherwise or on any AI failure. The article always ends up
    /// processed.
    async fn score_one(&self, article: Article) {
        let category = article.category;
        let (assessment, method) = match &self.scorer {
            Some(scorer) => match scorer.assess(&article).await {
                Ok(a) => (a, ScoreMethod::Ai),
                Err(err) => {
                    let msg = format!("{err:#}");
                    if msg.to_lowercase().contains("quota") {
                        self.stats.quota_exceeded();
                    }
                    self.stats.scoring_failure();
                    tracing::warn!(
                        title = %article.title,
                        error = %msg,
                        "AI scoring failed; falling back to keyword heuristic"
                    );
                    (keyword::assess(&article), ScoreMethod::Keyword)
                }
            },
            None => (keyword::assess(&article), ScoreMethod::Keyword),
        };

        tracing::debug!(
            title = %article.title,
            score = assessment.impact_score,
            method = method.as_str(),
            "scored article"
        );

        if !self
            .cache
            .apply(category, &article.link, assessment.impact_score, assessment.summary)
        {
            tracing::debug!(link = %article.link, "scored article already aged out of the cache");
        }
        self.stats.scoring_success(method);
        self.stats.article_processed();
    }
}
