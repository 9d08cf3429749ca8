// src/stats.rs
//! Pipeline statistics. Components notify the recorder fire-and-forget; it
//! never blocks and never fails the pipeline. Counts are mirrored into
//! Prometheus series so `/metrics` and the admin snapshot agree.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::category::Category;
use crate::scoring::ScoreMethod;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_fetch_success_total", "Feed fetches that succeeded.");
        describe_counter!("feed_fetch_errors_total", "Feed fetches that failed.");
        describe_counter!("articles_fetched_total", "New articles admitted from feeds.");
        describe_counter!("articles_processed_total", "Articles resolved by the scoring worker.");
        describe_counter!("scoring_ai_total", "Articles scored by the AI path.");
        describe_counter!("scoring_keyword_total", "Articles scored by the keyword fallback.");
        describe_counter!("scoring_failures_total", "AI scoring attempts that failed.");
        describe_gauge!("scoring_queue_length", "Articles waiting in the scoring queue.");
        describe_gauge!("scoring_quota_exceeded", "1 once the scoring API reported quota exhaustion.");
    });
}

/// Per-URL fetch bookkeeping.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStat {
    pub url: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub total_articles: u64,
    pub success_count: u64,
    pub error_count: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleTotals {
    pub total_fetched: u64,
    pub total_processed: u64,
    pub successfully_scored: u64,
    pub failed_scoring: u64,
    pub ai_scored_count: u64,
    pub keyword_scored_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingSnapshot {
    pub is_currently_processing: bool,
    pub queue_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_processing_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_processing_ms: Option<f64>,
}

/// Admin-facing aggregate, serialized as-is by the stats endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_feeds: u64,
    pub successful_feeds: u64,
    pub failed_feeds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fetch_time: Option<DateTime<Utc>>,
    pub feed_stats: Vec<FeedStat>,
    pub articles: ArticleTotals,
    pub processing: ProcessingSnapshot,
    pub uptime_secs: u64,
    pub quota_exceeded: bool,
}

#[derive(Debug)]
struct Inner {
    feed_stats: HashMap<String, FeedStat>,
    successful_feeds: u64,
    failed_feeds: u64,
    last_fetch_time: Option<DateTime<Utc>>,
    articles: ArticleTotals,
    is_processing: bool,
    queue_length: usize,
    processing_started: Option<Instant>,
    /// Durations of the last 10 processing runs, for the rolling average.
    processing_ms: VecDeque<f64>,
    last_processing_time: Option<DateTime<Utc>>,
    quota_exceeded: bool,
}

impl Inner {
    fn fresh() -> Self {
        Self {
            feed_stats: HashMap::new(),
            successful_feeds: 0,
            failed_feeds: 0,
            last_fetch_time: None,
            articles: ArticleTotals::default(),
            is_processing: false,
            queue_length: 0,
            processing_started: None,
            processing_ms: VecDeque::new(),
            last_processing_time: None,
            quota_exceeded: false,
        }
    }
}

/// Process-wide recorder, owned by the pipeline context.
#[derive(Debug)]
pub struct StatsRecorder {
    inner: Mutex<Inner>,
    started_at: DateTime<Utc>,
}

impl Default for StatsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsRecorder {
    pub fn new() -> Self {
        ensure_metrics_described();
        Self {
            inner: Mutex::new(Inner::fresh()),
            started_at: Utc::now(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("stats mutex poisoned")
    }

    /// Registers a feed the first time it is attempted.
    pub fn feed_attempt(&self, url: &str, category: Category) {
        let mut g = self.lock();
        g.feed_stats.entry(url.to_string()).or_insert(FeedStat {
            url: url.to_string(),
            category,
            last_success: None,
            last_error: None,
            total_articles: 0,
            success_count: 0,
            error_count: 0,
        });
    }

    pub fn feed_success(&self, url: &str, article_count: usize) {
        counter!("feed_fetch_success_total").increment(1);
        let now = Utc::now();
        let mut g = self.lock();
        if let Some(stat) = g.feed_stats.get_mut(url) {
            stat.last_success = Some(now);
            stat.total_articles += article_count as u64;
            stat.success_count += 1;
        }
        g.successful_feeds += 1;
        g.last_fetch_time = Some(now);
    }

    pub fn feed_error(&self, url: &str, error: &str) {
        counter!("feed_fetch_errors_total").increment(1);
        let mut g = self.lock();
        if let Some(stat) = g.feed_stats.get_mut(url) {
            stat.last_error = Some(error.to_string());
            stat.error_count += 1;
        }
        g.failed_feeds += 1;
    }

    pub fn article_fetched(&self, count: usize) {
        counter!("articles_fetched_total").increment(count as u64);
        self.lock().articles.total_fetched += count as u64;
    }

    pub fn article_processed(&self) {
        counter!("articles_processed_total").increment(1);
        self.lock().articles.total_processed += 1;
    }

    pub fn scoring_success(&self, method: ScoreMethod) {
        let mut g = self.lock();
        g.articles.successfully_scored += 1;
        match method {
            ScoreMethod::Ai => {
                counter!("scoring_ai_total").increment(1);
                g.articles.ai_scored_count += 1;
            }
            ScoreMethod::Keyword => {
                counter!("scoring_keyword_total").increment(1);
                g.articles.keyword_scored_count += 1;
            }
        }
    }

    pub fn scoring_failure(&self) {
        counter!("scoring_failures_total").increment(1);
        self.lock().articles.failed_scoring += 1;
    }

    /// Sticky for the process lifetime; reported once quota exhaustion is seen.
    pub fn quota_exceeded(&self) {
        gauge!("scoring_quota_exceeded").set(1.0);
        self.lock().quota_exceeded = true;
    }

    pub fn set_processing_state(&self, is_processing: bool, queue_length: usize) {
        gauge!("scoring_queue_length").set(queue_length as f64);
        let mut g = self.lock();
        let was_processing = g.is_processing;
        g.is_processing = is_processing;
        g.queue_length = queue_length;
        if is_processing {
            if !was_processing {
                g.processing_started = Some(Instant::now());
            }
        } else if let Some(started) = g.processing_started.take() {
            g.processing_ms.push_back(started.elapsed().as_secs_f64() * 1_000.0);
            while g.processing_ms.len() > 10 {
                g.processing_ms.pop_front();
            }
            g.last_processing_time = Some(Utc::now());
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let g = self.lock();
        let mut feed_stats: Vec<FeedStat> = g.feed_stats.values().cloned().collect();
        feed_stats.sort_by(|a, b| a.url.cmp(&b.url));
        let average_processing_ms = if g.processing_ms.is_empty() {
            None
        } else {
            Some(g.processing_ms.iter().sum::<f64>() / g.processing_ms.len() as f64)
        };
        StatsSnapshot {
            total_feeds: g.feed_stats.len() as u64,
            successful_feeds: g.successful_feeds,
            failed_feeds: g.failed_feeds,
            last_fetch_time: g.last_fetch_time,
            feed_stats,
            articles: g.articles,
            processing: ProcessingSnapshot {
                is_currently_processing: g.is_processing,
                queue_length: g.queue_length,
                last_processing_time: g.last_processing_time,
                average_processing_ms,
            },
            uptime_secs: (Utc::now() - self.started_at).num_seconds().max(0) as u64,
            quota_exceeded: g.quota_exceeded,
        }
    }

    /// Clear counters; the process start time survives.
    pub fn reset(&self) {
        *self.lock() = Inner::fresh();
    }
}
