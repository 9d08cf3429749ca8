// src/cache.rs
//! Process-wide article state: the dedup ledger and the bounded per-category
//! cache. Both are owned by the pipeline and shared via `Arc`; there are no
//! module-level statics.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use crate::article::Article;
use crate::category::Category;

/// Articles kept per category. Insertion beyond the cap evicts the oldest.
pub const CATEGORY_CACHE_CAP: usize = 20;

/// Links already admitted for processing in this process's lifetime. Not
/// persisted: a restart may reprocess recently-seen links, by design.
#[derive(Debug, Default)]
pub struct DedupLedger {
    seen: Mutex<HashSet<String>>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// First admission of a link wins; repeats return false and change nothing.
    pub fn admit(&self, link: &str) -> bool {
        self.seen
            .lock()
            .expect("dedup ledger mutex poisoned")
            .insert(link.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.lock().expect("dedup ledger mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounded, newest-first in-memory store of recent articles per category.
#[derive(Debug)]
pub struct ArticleCache {
    categories: RwLock<HashMap<Category, Vec<Article>>>,
    cap: usize,
}

impl Default for ArticleCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ArticleCache {
    pub fn new() -> Self {
        Self::with_cap(CATEGORY_CACHE_CAP)
    }

    pub fn with_cap(cap: usize) -> Self {
        let categories = Category::ALL.into_iter().map(|c| (c, Vec::new())).collect();
        Self {
            categories: RwLock::new(categories),
            cap,
        }
    }

    /// Prepend to the article's category, evicting beyond the cap. The article
    /// is visible to readers immediately, before it has been scored.
    pub fn insert(&self, article: Article) {
        let mut map = self.categories.write().expect("article cache poisoned");
        let list = map
            .get_mut(&article.category)
            .expect("every category is present");
        list.insert(0, article);
        list.truncate(self.cap);
    }

    /// Resolve a scoring outcome: set score, summary, and the processed flag in
    /// one write, so readers never see a partially-scored article. Returns
    /// false if the article already aged out of the cache.
    pub fn apply(&self, category: Category, link: &str, impact_score: i32, summary: String) -> bool {
        let mut map = self.categories.write().expect("article cache poisoned");
        let list = map.get_mut(&category).expect("every category is present");
        match list.iter_mut().find(|a| a.link == link) {
            Some(article) => {
                article.impact_score = Some(impact_score);
                article.ai_summary = Some(summary);
                article.processed = true;
                true
            }
            None => false,
        }
    }

    /// Snapshot of every category's articles, newest first.
    pub fn snapshot(&self) -> HashMap<Category, Vec<Article>> {
        self.categories
            .read()
            .expect("article cache poisoned")
            .clone()
    }

    /// Snapshot of one category's articles, newest first.
    pub fn category(&self, category: Category) -> Vec<Article> {
        self.categories
            .read()
            .expect("article cache poisoned")
            .get(&category)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article(link: &str, category: Category) -> Article {
        Article::new(
            format!("title {link}"),
            link.to_string(),
            Utc::now(),
            String::new(),
            category,
        )
    }

    #[test]
    fn ledger_admits_each_link_once() {
        let ledger = DedupLedger::new();
        assert!(ledger.admit("https://example.com/a"));
        assert!(!ledger.admit("https://example.com/a"));
        assert!(ledger.admit("https://example.com/b"));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn insert_prepends_and_respects_cap() {
        let cache = ArticleCache::new();
        for i in 0..25 {
            cache.insert(article(&format!("https://example.com/{i}"), Category::Defense));
        }
        let list = cache.category(Category::Defense);
        assert_eq!(list.len(), CATEGORY_CACHE_CAP);
        // Newest first: the last inserted is at the head.
        assert_eq!(list[0].link, "https://example.com/24");
        // The five oldest were evicted.
        assert!(!list.iter().any(|a| a.link == "https://example.com/0"));
    }

    #[test]
    fn apply_sets_all_scoring_fields_together() {
        let cache = ArticleCache::new();
        cache.insert(article("https://example.com/x", Category::Energy));
        assert!(cache.apply(Category::Energy, "https://example.com/x", -2, "Outage.".into()));
        let got = &cache.category(Category::Energy)[0];
        assert_eq!(got.impact_score, Some(-2));
        assert_eq!(got.ai_summary.as_deref(), Some("Outage."));
        assert!(got.processed);
    }

    #[test]
    fn apply_after_eviction_is_a_noop() {
        let cache = ArticleCache::with_cap(1);
        cache.insert(article("https://example.com/old", Category::Workforce));
        cache.insert(article("https://example.com/new", Category::Workforce));
        assert!(!cache.apply(Category::Workforce, "https://example.com/old", 1, "gone".into()));
    }

    #[test]
    fn categories_are_isolated() {
        let cache = ArticleCache::new();
        cache.insert(article("https://example.com/d", Category::Defense));
        assert!(cache.category(Category::Manufacturing).is_empty());
        assert_eq!(cache.category(Category::Defense).len(), 1);
    }
}
