// src/scheduler.rs
//! Cycle orchestration: fetch every registered feed, gate newcomers through
//! the dedup ledger, cache + enqueue them, drain the scoring queue, then let
//! the milestone checker react. Cycles run once at startup, on a fixed
//! cadence, and on demand via the admin trigger. Overlapping cycles are not
//! prevented at the fetch stage; the ledger makes them harmless.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::article::Article;
use crate::cache::{ArticleCache, DedupLedger};
use crate::category::Category;
use crate::config::PipelineConfig;
use crate::feeds::{FeedFetcher, FeedRegistry};
use crate::milestones::{DisabledMilestoneChecker, MilestoneChecker};
use crate::scoring::worker::{ScoringHandle, ScoringWorker};
use crate::scoring::{build_scorer, ImpactScorer};
use crate::stats::StatsRecorder;

/// Everything the pipeline owns: configuration, the fetcher, the dedup ledger,
/// the article cache, the stats recorder, and the scoring worker's handle.
/// Created at process start, torn down at process stop; no hidden statics.
pub struct Pipeline {
    pub config: PipelineConfig,
    pub registry: FeedRegistry,
    pub fetcher: FeedFetcher,
    pub ledger: DedupLedger,
    pub cache: Arc<ArticleCache>,
    pub stats: Arc<StatsRecorder>,
    pub scoring: ScoringHandle,
    pub milestones: Arc<dyn MilestoneChecker>,
}

impl Pipeline {
    /// Wire the pipeline together and spawn its scoring worker.
    pub fn new(
        config: PipelineConfig,
        registry: FeedRegistry,
        scorer: Option<Arc<dyn ImpactScorer>>,
        milestones: Arc<dyn MilestoneChecker>,
    ) -> Arc<Self> {
        let fetcher = FeedFetcher::new(&config);
        let cache = Arc::new(ArticleCache::new());
        let stats = Arc::new(StatsRecorder::new());
        let (scoring, _worker) = ScoringWorker::spawn(
            cache.clone(),
            stats.clone(),
            scorer,
            config.scoring_min_gap,
        );
        Arc::new(Self {
            config,
            registry,
            fetcher,
            ledger: DedupLedger::new(),
            cache,
            stats,
            scoring,
            milestones,
        })
    }

    /// Production wiring: env config, feeds from `config/feeds.toml` or the
    /// built-in defaults, AI scorer when a credential is present.
    pub fn from_env() -> Arc<Self> {
        let config = PipelineConfig::from_env();
        let registry = FeedRegistry::load_default();
        let scorer = build_scorer(&config);
        Self::new(config, registry, scorer, Arc::new(DisabledMilestoneChecker))
    }

    /// One full fetch→score cycle. Every per-feed and per-article failure is
    /// absorbed here; this never returns an error to the caller.
    pub async fn run_cycle(&self) {
        tracing::info!("starting RSS feed fetch cycle");
        self.stats
            .set_processing_state(true, self.scoring.queue_len());

        for spec in self.registry.feeds() {
            self.stats.feed_attempt(&spec.url, spec.category);
            match self.fetcher.fetch(&spec.url, spec.category).await {
                Ok(articles) => self.ingest(&spec.url, spec.category, articles),
                Err(err) => {
                    tracing::warn!(url = %spec.url, error = ?err, "feed fetch failed");
                    self.stats.feed_error(&spec.url, &format!("{err:#}"));
                }
            }
        }

        self.scoring.drain().await;
        self.stats.set_processing_state(false, 0);

        match self.milestones.check_and_update().await {
            Ok(true) => tracing::info!("milestones updated, all targets achieved"),
            Ok(false) => {}
            Err(err) => tracing::warn!(error = ?err, "milestone check failed"),
        }
        tracing::info!("finished RSS feed fetch cycle");
    }

    /// Gate fetched candidates through the ledger; admitted articles become
    /// visible in the cache immediately and are queued for scoring.
    pub fn ingest(&self, url: &str, category: Category, articles: Vec<Article>) {
        let mut admitted = 0usize;
        for article in articles {
            if !self.ledger.admit(&article.link) {
                continue;
            }
            self.cache.insert(article.clone());
            self.scoring.enqueue(article);
            admitted += 1;
        }
        tracing::info!(url, category = %category, added = admitted, "feed fetched");
        self.stats.feed_success(url, admitted);
        self.stats.article_fetched(admitted);
    }
}

/// Run one cycle immediately, then on the configured cadence.
pub fn spawn_scheduler(pipeline: Arc<Pipeline>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(pipeline.config.fetch_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            // The first tick completes immediately.
            ticker.tick().await;
            pipeline.run_cycle().await;
        }
    })
}
