// src/aggregate.rs
//! Derived category scores. Pure reads over the article cache: nothing here
//! mutates state, and results reflect whatever is cached right now, including
//! partially-scored cycles.

use std::collections::HashMap;

use crate::article::Article;
use crate::cache::ArticleCache;
use crate::category::Category;

/// Processed articles considered per category.
pub const RECENT_WINDOW: usize = 10;

/// Map each category's mean impact onto [0,100]: 0 impact = 50, +5 = 100,
/// -5 = 0. A category with no processed articles scores 0.
pub fn scores_by_category(cache: &ArticleCache) -> HashMap<Category, f64> {
    let snapshot = cache.snapshot();
    Category::ALL
        .into_iter()
        .map(|c| {
            let articles = snapshot.get(&c).map(Vec::as_slice).unwrap_or_default();
            (c, category_score(articles))
        })
        .collect()
}

/// Arithmetic mean of the six category scores.
pub fn overall_index(scores: &HashMap<Category, f64>) -> f64 {
    let sum: f64 = Category::ALL
        .into_iter()
        .map(|c| scores.get(&c).copied().unwrap_or(0.0))
        .sum();
    sum / Category::ALL.len() as f64
}

fn category_score(articles: &[Article]) -> f64 {
    // `impact_score == None` is "pending", not a zero; it stays out of the mean.
    let recent: Vec<i32> = articles
        .iter()
        .filter(|a| a.processed)
        .filter_map(|a| a.impact_score)
        .take(RECENT_WINDOW)
        .collect();
    if recent.is_empty() {
        return 0.0;
    }
    let mean = recent.iter().sum::<i32>() as f64 / recent.len() as f64;
    (50.0 + mean * 10.0).clamp(0.0, 100.0)
}
