// src/scoring/openai.rs
//! OpenAI-backed impact scorer (Chat Completions API). One user-role prompt
//! per article, strict JSON response contract, defensive clamping.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{clamp_impact, Assessment, ImpactScorer};
use crate::article::Article;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TOKENS: u32 = 150;
const TEMPERATURE: f32 = 0.3;

pub struct OpenAiScorer {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiScorer {
    pub fn new(api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(crate::feeds::USER_AGENT)
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model,
            endpoint: CHAT_COMPLETIONS_URL.to_string(),
        }
    }

    /// Point the scorer at a different endpoint (local stub in tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn prompt(article: &Article) -> String {
        let category = article.category.display_name();
        let description = if article.description.is_empty() {
            "No summary available"
        } else {
            article.description.as_str()
        };
        format!(
            r#"You are an analyst scoring news for American Dynamism.
Analyze the article below and provide:
1. A numerical impact score from -5 (very negative) to +5 (very positive) reflecting its impact on {category}. Be nuanced:
   - Small operational updates or minor industry news: +1 to -1
   - Moderate developments with limited scope: +2 to -2
   - Significant policy changes or major contracts: +3 to -3
   - Transformative developments with national impact: +4 to -4
   - Game-changing events with generational implications: +5 to -5
   - Use 0 for truly neutral news with no clear impact
2. A concise one-sentence summary of the article.

Title: {title}
Summary: {description}

Respond only with valid JSON in this format:
{{
  "impact_score": 1,
  "summary": "Minor operational update on F-35 maintenance hosting interests."
}}"#,
            title = article.title,
        )
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<String>,
}

/// The shape the model is instructed to return. Anything else is a failure,
/// not a partial success.
#[derive(Deserialize)]
struct ModelAssessment {
    impact_score: i64,
    #[serde(default)]
    summary: String,
}

#[async_trait]
impl ImpactScorer for OpenAiScorer {
    async fn assess(&self, article: &Article) -> Result<Assessment> {
        let prompt = Self::prompt(article);
        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: &prompt,
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("calling chat completions")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("chat completions returned {status}: {body}");
        }

        let body: Resp = resp
            .json()
            .await
            .context("decoding chat completions response")?;
        let content = body
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or_default();
        if content.is_empty() {
            anyhow::bail!("empty response from model");
        }

        let parsed: ModelAssessment = serde_json::from_str(strip_code_fences(content))
            .with_context(|| format!("model returned a non-JSON assessment: {content:?}"))?;

        let summary = if parsed.summary.is_empty() {
            article.description.clone()
        } else {
            parsed.summary
        };
        Ok(Assessment {
            impact_score: clamp_impact(parsed.impact_score),
            summary,
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Models occasionally wrap the JSON in a markdown code fence; tolerate it.
fn strip_code_fences(s: &str) -> &str {
    let t = s.trim();
    let t = t
        .strip_prefix("```json")
        .or_else(|| t.strip_prefix("```"))
        .unwrap_or(t);
    t.strip_suffix("```").unwrap_or(t).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use chrono::Utc;

    #[test]
    fn prompt_embeds_category_display_name_and_title() {
        let a = Article::new(
            "Grid expansion announced".into(),
            "https://example.com/grid".into(),
            Utc::now(),
            "Utility commits to new capacity.".into(),
            Category::Energy,
        );
        let p = OpenAiScorer::prompt(&a);
        assert!(p.contains("Energy Infrastructure"));
        assert!(p.contains("Title: Grid expansion announced"));
        assert!(p.contains("Summary: Utility commits to new capacity."));
    }

    #[test]
    fn prompt_substitutes_placeholder_for_empty_description() {
        let a = Article::new(
            "Short note".into(),
            "https://example.com/n".into(),
            Utc::now(),
            String::new(),
            Category::Defense,
        );
        assert!(OpenAiScorer::prompt(&a).contains("Summary: No summary available"));
    }

    #[test]
    fn code_fences_are_stripped() {
        let fenced = "```json\n{\"impact_score\": 2, \"summary\": \"ok\"}\n```";
        let parsed: ModelAssessment = serde_json::from_str(strip_code_fences(fenced)).unwrap();
        assert_eq!(parsed.impact_score, 2);
        assert_eq!(parsed.summary, "ok");
    }
}
