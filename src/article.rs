// src/article.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// A single feed item flowing through the pipeline.
///
/// Created unprocessed by the fetcher and visible to readers immediately. The
/// scoring worker later fills in `impact_score` + `ai_summary` and flips
/// `processed` in one cache write, so no reader observes a partially-scored
/// article. `impact_score == None` means "pending", distinct from a real 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    /// Canonical permalink; the identity key for deduplication.
    pub link: String,
    pub pub_date: DateTime<Utc>,
    pub description: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_score: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub processed: bool,
}

impl Article {
    pub fn new(
        title: String,
        link: String,
        pub_date: DateTime<Utc>,
        description: String,
        category: Category,
    ) -> Self {
        Self {
            title,
            link,
            pub_date,
            description,
            category,
            impact_score: None,
            ai_summary: None,
            processed: false,
        }
    }
}
