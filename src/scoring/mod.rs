// src/scoring/mod.rs
pub mod keyword;
pub mod openai;
pub mod worker;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::article::Article;
use crate::config::PipelineConfig;

pub const MIN_IMPACT: i32 = -5;
pub const MAX_IMPACT: i32 = 5;

/// The outcome of scoring one article, whichever path produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    /// Always within `[MIN_IMPACT, MAX_IMPACT]`.
    pub impact_score: i32,
    pub summary: String,
}

/// Which path resolved an article's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMethod {
    Ai,
    Keyword,
}

impl ScoreMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreMethod::Ai => "ai",
            ScoreMethod::Keyword => "keyword",
        }
    }
}

/// A scorer producing an impact assessment for one article. The article's
/// category rides along on the article itself.
#[async_trait]
pub trait ImpactScorer: Send + Sync {
    async fn assess(&self, article: &Article) -> Result<Assessment>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Clamp a model-supplied score into the valid range. The model may violate
/// the bound; the keyword path may accumulate past it.
pub fn clamp_impact(raw: i64) -> i32 {
    raw.clamp(MIN_IMPACT as i64, MAX_IMPACT as i64) as i32
}

/// Build the AI scorer, or `None` when no credential is configured; the
/// worker then takes the keyword path for the whole process lifetime.
pub fn build_scorer(config: &PipelineConfig) -> Option<Arc<dyn ImpactScorer>> {
    match &config.openai_api_key {
        Some(key) => Some(Arc::new(openai::OpenAiScorer::new(
            key.clone(),
            config.openai_model.clone(),
        ))),
        None => {
            tracing::warn!("OPENAI_API_KEY not found. AI scoring will be disabled.");
            None
        }
    }
}
