// src/feeds/mod.rs
pub mod parse;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;

use crate::article::Article;
use crate::category::Category;
use crate::config::PipelineConfig;

/// Client identifier sent to feed endpoints.
pub const USER_AGENT: &str = "american-dynamism-tracker/1.0";

const ENV_FEEDS_PATH: &str = "FEEDS_CONFIG_PATH";
const DEFAULT_FEEDS_PATH: &str = "config/feeds.toml";

/// One registered feed endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSpec {
    pub url: String,
    pub category: Category,
}

/// The set of feeds a cycle walks. Loaded from TOML, with built-in defaults
/// covering all six categories.
#[derive(Debug, Clone)]
pub struct FeedRegistry {
    feeds: Vec<FeedSpec>,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(rename = "feeds", default)]
    feeds: Vec<FeedSpec>,
}

impl FeedRegistry {
    pub fn new(feeds: Vec<FeedSpec>) -> Self {
        Self { feeds }
    }

    pub fn feeds(&self) -> &[FeedSpec] {
        &self.feeds
    }

    /// Load the registry using `$FEEDS_CONFIG_PATH`, then `config/feeds.toml`,
    /// falling back to the built-in defaults. A malformed file is logged and
    /// ignored rather than taking the scheduler down.
    pub fn load_default() -> Self {
        let path = std::env::var(ENV_FEEDS_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_FEEDS_PATH));
        if path.exists() {
            match Self::from_path(&path) {
                Ok(reg) if !reg.feeds.is_empty() => return reg,
                Ok(_) => tracing::warn!(path = %path.display(), "feeds config is empty; using defaults"),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = ?err, "failed to load feeds config; using defaults")
                }
            }
        }
        Self::defaults()
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading feeds config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(s).context("parsing feeds config toml")?;
        Ok(Self::new(file.feeds))
    }

    /// The feed set the reference tracker ships with.
    pub fn defaults() -> Self {
        let table: &[(&str, Category)] = &[
            ("https://breakingdefense.com/full-rss-feed/?v=2", Category::Defense),
            (
                "https://www.defensenews.com/arc/outboundfeeds/rss/?outputType=xml",
                Category::Defense,
            ),
            ("https://www.manufacturingdive.com/feeds/news/", Category::Manufacturing),
            ("https://www.energylivenews.com/feed/", Category::Energy),
            ("https://www.bls.gov/feed/empsit.rss", Category::Workforce),
            ("https://www.laborrelationsupdate.com/feed/", Category::Workforce),
            ("https://thehill.com/policy/technology/feed/", Category::TechPolicy),
            ("https://www.supplychaindive.com/feeds/news/", Category::SupplyChain),
        ];
        Self::new(
            table
                .iter()
                .map(|&(url, category)| FeedSpec {
                    url: url.to_string(),
                    category,
                })
                .collect(),
        )
    }
}

/// Retrieves and parses one feed URL into a bounded list of candidate articles.
pub struct FeedFetcher {
    http: reqwest::Client,
    max_items: usize,
}

impl FeedFetcher {
    pub fn new(config: &PipelineConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(4))
            .timeout(config.feed_timeout)
            .build()
            .expect("reqwest client");
        Self {
            http,
            max_items: config.max_items_per_feed,
        }
    }

    /// Fetch one feed and return at most `max_items` candidate articles in feed
    /// order. Items without a permalink are dropped. Any network, HTTP-status,
    /// or parse failure surfaces as an error for the caller to isolate.
    pub async fn fetch(&self, url: &str, category: Category) -> Result<Vec<Article>> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("fetching feed {url}"))?
            .error_for_status()
            .with_context(|| format!("feed {url} returned an error status"))?;
        let body = resp
            .text()
            .await
            .with_context(|| format!("reading body of feed {url}"))?;
        let items = parse::parse_feed(&body).with_context(|| format!("parsing feed {url}"))?;
        Ok(articles_from_items(items, category, self.max_items))
    }
}

/// Convert parsed items into unprocessed articles. The budget is applied before
/// the permalink filter, so linkless items still consume it.
pub fn articles_from_items(
    items: Vec<parse::RawItem>,
    category: Category,
    max_items: usize,
) -> Vec<Article> {
    let mut out = Vec::new();
    for item in items.into_iter().take(max_items) {
        let Some(link) = item.link.filter(|l| !l.trim().is_empty()) else {
            continue;
        };
        out.push(Article::new(
            item.title.unwrap_or_else(|| "Untitled".to_string()),
            link,
            item.published.unwrap_or_else(Utc::now),
            normalize_description(item.description.as_deref().unwrap_or_default()),
            category,
        ));
    }
    out
}

/// Normalize a feed description: decode HTML entities, strip tags, collapse
/// whitespace, cap at 1500 chars.
pub fn normalize_description(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }
    out
}
