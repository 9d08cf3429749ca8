// src/config.rs
//! Runtime configuration. Environment variables with defaults; `.env` is
//! loaded by the entrypoint in local runs.

use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Cadence of the scheduled fetch cycle.
    pub fetch_interval: Duration,
    /// Per-feed HTTP timeout.
    pub feed_timeout: Duration,
    /// Most recent items taken from one feed per cycle.
    pub max_items_per_feed: usize,
    /// Minimum gap between consecutive scoring API calls.
    pub scoring_min_gap: Duration,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_interval: Duration::from_secs(15 * 60),
            feed_timeout: Duration::from_secs(10),
            max_items_per_feed: 10,
            scoring_min_gap: Duration::from_millis(1000),
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fetch_interval: Duration::from_secs(env_parse(
                "FETCH_INTERVAL_SECS",
                defaults.fetch_interval.as_secs(),
            )),
            feed_timeout: Duration::from_secs(env_parse(
                "FEED_TIMEOUT_SECS",
                defaults.feed_timeout.as_secs(),
            )),
            max_items_per_feed: env_parse("MAX_ITEMS_PER_FEED", defaults.max_items_per_feed),
            scoring_min_gap: Duration::from_millis(env_parse(
                "SCORING_MIN_GAP_MS",
                defaults.scoring_min_gap.as_millis() as u64,
            )),
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
        }
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_policy() {
        let c = PipelineConfig::default();
        assert_eq!(c.fetch_interval, Duration::from_secs(900));
        assert_eq!(c.feed_timeout, Duration::from_secs(10));
        assert_eq!(c.max_items_per_feed, 10);
        assert_eq!(c.scoring_min_gap, Duration::from_millis(1000));
        assert!(c.openai_api_key.is_none());
    }
}
