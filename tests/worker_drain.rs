// tests/worker_drain.rs
// The scoring worker: single consumer, drain semantics, fallback paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::time::Instant;

use dynamism_tracker::article::Article;
use dynamism_tracker::cache::ArticleCache;
use dynamism_tracker::category::Category;
use dynamism_tracker::scoring::worker::ScoringWorker;
use dynamism_tracker::scoring::{Assessment, ImpactScorer};
use dynamism_tracker::stats::StatsRecorder;

fn article(i: usize, category: Category) -> Article {
    Article::new(
        format!("Article {i}"),
        format!("https://example.com/{i}"),
        Utc::now(),
        String::new(),
        category,
    )
}

fn defense_article() -> Article {
    Article::new(
        "Major contract awarded for defense modernization".into(),
        "https://example.com/contract".into(),
        Utc::now(),
        String::new(),
        Category::Defense,
    )
}

/// Always succeeds; records call instants for gap assertions.
struct FixedScorer {
    calls: AtomicUsize,
    call_times: Mutex<Vec<Instant>>,
}

impl FixedScorer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            call_times: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ImpactScorer for FixedScorer {
    async fn assess(&self, _article: &Article) -> anyhow::Result<Assessment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_times.lock().unwrap().push(Instant::now());
        Ok(Assessment {
            impact_score: 2,
            summary: "Fixed assessment.".into(),
        })
    }
    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Always fails with the given message.
struct FailingScorer(&'static str);

#[async_trait]
impl ImpactScorer for FailingScorer {
    async fn assess(&self, _article: &Article) -> anyhow::Result<Assessment> {
        Err(anyhow::anyhow!(self.0))
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

#[tokio::test]
async fn drain_resolves_after_all_enqueued_jobs() {
    let cache = Arc::new(ArticleCache::new());
    let stats = Arc::new(StatsRecorder::new());
    let scorer = FixedScorer::new();
    let (handle, _join) = ScoringWorker::spawn(
        cache.clone(),
        stats.clone(),
        Some(scorer.clone()),
        Duration::ZERO,
    );

    for i in 0..4 {
        handle.enqueue(article(i, Category::Manufacturing));
    }
    handle.drain().await;

    assert_eq!(handle.queue_len(), 0);
    assert_eq!(scorer.calls.load(Ordering::SeqCst), 4);
    let list = cache.category(Category::Manufacturing);
    assert_eq!(list.len(), 4);
    assert!(list.iter().all(|a| a.processed && a.impact_score == Some(2)));
    assert_eq!(stats.snapshot().articles.total_processed, 4);
    assert!(!stats.snapshot().processing.is_currently_processing);
}

#[tokio::test]
async fn concurrent_drains_share_the_single_consumer() {
    let cache = Arc::new(ArticleCache::new());
    let stats = Arc::new(StatsRecorder::new());
    let scorer = FixedScorer::new();
    let (handle, _join) = ScoringWorker::spawn(
        cache.clone(),
        stats.clone(),
        Some(scorer.clone()),
        Duration::ZERO,
    );

    for i in 0..6 {
        handle.enqueue(article(i, Category::Energy));
    }
    // Two "drain loops" requested concurrently: both must resolve, and every
    // article is still scored exactly once.
    tokio::join!(handle.drain(), handle.drain());

    assert_eq!(handle.queue_len(), 0);
    assert_eq!(scorer.calls.load(Ordering::SeqCst), 6);
    assert_eq!(stats.snapshot().articles.successfully_scored, 6);
}

#[tokio::test]
async fn scorer_failure_falls_back_to_keywords() {
    let cache = Arc::new(ArticleCache::new());
    let stats = Arc::new(StatsRecorder::new());
    let (handle, _join) = ScoringWorker::spawn(
        cache.clone(),
        stats.clone(),
        Some(Arc::new(FailingScorer("model returned a non-JSON assessment"))),
        Duration::ZERO,
    );

    handle.enqueue(defense_article());
    handle.drain().await;

    let got = &cache.category(Category::Defense)[0];
    assert!(got.processed);
    // "contract", "award", "modernization"
    assert_eq!(got.impact_score, Some(3));

    let snap = stats.snapshot();
    assert_eq!(snap.articles.failed_scoring, 1);
    assert_eq!(snap.articles.keyword_scored_count, 1);
    assert_eq!(snap.articles.ai_scored_count, 0);
    assert!(!snap.quota_exceeded);
}

#[tokio::test]
async fn quota_failure_raises_the_sticky_flag() {
    let cache = Arc::new(ArticleCache::new());
    let stats = Arc::new(StatsRecorder::new());
    let (handle, _join) = ScoringWorker::spawn(
        cache.clone(),
        stats.clone(),
        Some(Arc::new(FailingScorer(
            "chat completions returned 429: insufficient_quota",
        ))),
        Duration::ZERO,
    );

    handle.enqueue(article(0, Category::TechPolicy));
    handle.enqueue(article(1, Category::TechPolicy));
    handle.drain().await;

    let snap = stats.snapshot();
    assert!(snap.quota_exceeded);
    // No circuit breaker: both articles were attempted and both resolved.
    assert_eq!(snap.articles.failed_scoring, 2);
    assert_eq!(snap.articles.total_processed, 2);
}

#[tokio::test]
async fn disabled_scorer_takes_the_keyword_path_permanently() {
    let cache = Arc::new(ArticleCache::new());
    let stats = Arc::new(StatsRecorder::new());
    let (handle, _join) =
        ScoringWorker::spawn(cache.clone(), stats.clone(), None, Duration::ZERO);

    handle.enqueue(defense_article());
    handle.drain().await;

    let got = &cache.category(Category::Defense)[0];
    assert!(got.processed);
    assert_eq!(got.impact_score, Some(3));

    let snap = stats.snapshot();
    assert_eq!(snap.articles.keyword_scored_count, 1);
    // Skipping the API is not a failure.
    assert_eq!(snap.articles.failed_scoring, 0);
}

#[tokio::test]
async fn minimum_gap_is_enforced_between_api_calls() {
    let cache = Arc::new(ArticleCache::new());
    let stats = Arc::new(StatsRecorder::new());
    let scorer = FixedScorer::new();
    let gap = Duration::from_millis(50);
    let (handle, _join) =
        ScoringWorker::spawn(cache.clone(), stats.clone(), Some(scorer.clone()), gap);

    for i in 0..3 {
        handle.enqueue(article(i, Category::SupplyChain));
    }
    handle.drain().await;

    let times = scorer.call_times.lock().unwrap();
    for pair in times.windows(2) {
        assert!(
            pair[1] - pair[0] >= gap,
            "consecutive scoring calls closer than the configured gap"
        );
    }
}
