// tests/metrics_route.rs
// One test only: the Prometheus recorder is process-global, so this file
// installs it exactly once.

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use dynamism_tracker::category::Category;
use dynamism_tracker::metrics::Metrics;
use dynamism_tracker::scoring::ScoreMethod;
use dynamism_tracker::stats::StatsRecorder;

#[tokio::test]
async fn metrics_route_exposes_pipeline_series() {
    let metrics = Metrics::init(900);
    let app = metrics.router();

    // Drive some events through a recorder so the series materialize.
    let stats = StatsRecorder::new();
    stats.feed_attempt("https://feeds.example.com/rss", Category::Defense);
    stats.feed_success("https://feeds.example.com/rss", 2);
    stats.feed_error("https://feeds.example.com/rss", "boom");
    stats.article_fetched(2);
    stats.scoring_success(ScoreMethod::Keyword);
    stats.scoring_failure();
    stats.set_processing_state(false, 0);
    stats.quota_exceeded();

    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    for needle in [
        "feed_fetch_interval_secs",
        "feed_fetch_success_total",
        "feed_fetch_errors_total",
        "articles_fetched_total",
        "scoring_keyword_total",
        "scoring_failures_total",
        "scoring_queue_length",
        "scoring_quota_exceeded",
    ] {
        assert!(text.contains(needle), "missing series {needle}:\n{text}");
    }
}
