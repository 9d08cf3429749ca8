// src/scoring/keyword.rs
//! Deterministic fallback scoring. Substring keyword hits over the lowercased
//! title+description: +1 per positive, -1 per negative, clamped to [-5,5].
//! No failure mode; this is the floor the pipeline always stands on.

use super::{clamp_impact, Assessment};
use crate::article::Article;
use crate::category::Category;

/// Positive/negative keyword lists per category. The match is exhaustive, so a
/// category without a table cannot exist.
fn keywords(category: Category) -> (&'static [&'static str], &'static [&'static str]) {
    match category {
        Category::Defense => (
            &[
                "contract",
                "investment",
                "innovation",
                "breakthrough",
                "success",
                "award",
                "modernization",
                "capability",
            ],
            &["delay", "budget cut", "failure", "setback", "scandal", "violation", "loss"],
        ),
        Category::Manufacturing => (
            &[
                "reshoring",
                "factory",
                "production",
                "jobs",
                "investment",
                "expansion",
                "growth",
                "domestic",
            ],
            &["layoffs", "closure", "offshoring", "decline", "shortage", "disruption"],
        ),
        Category::Energy => (
            &["renewable", "clean", "efficiency", "breakthrough", "investment", "capacity", "grid"],
            &["outage", "shortage", "price spike", "emissions", "accident", "delay"],
        ),
        Category::Workforce => (
            &["training", "skills", "employment", "wages", "certification", "education", "hiring"],
            &["unemployment", "layoffs", "shortage", "decline", "automation", "displacement"],
        ),
        Category::TechPolicy => (
            &["innovation", "funding", "breakthrough", "leadership", "competitiveness", "research"],
            &["regulation", "restriction", "ban", "lag", "dependence", "vulnerability"],
        ),
        Category::SupplyChain => (
            &["resilience", "domestic", "diversification", "investment", "capacity", "security"],
            &["disruption", "shortage", "delay", "bottleneck", "dependency", "vulnerability"],
        ),
    }
}

/// Keyword impact score for an article.
pub fn score(article: &Article) -> i32 {
    let content = format!("{} {}", article.title, article.description).to_lowercase();
    let (positive, negative) = keywords(article.category);

    let mut score: i64 = 0;
    for kw in positive {
        if content.contains(kw) {
            score += 1;
        }
    }
    for kw in negative {
        if content.contains(kw) {
            score -= 1;
        }
    }
    clamp_impact(score)
}

/// Full fallback assessment: keyword score plus the best summary we have
/// without a model (the description, or the title when that is empty).
pub fn assess(article: &Article) -> Assessment {
    let summary = if article.description.is_empty() {
        article.title.clone()
    } else {
        article.description.clone()
    };
    Assessment {
        impact_score: score(article),
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article(title: &str, description: &str, category: Category) -> Article {
        Article::new(
            title.to_string(),
            "https://example.com/x".to_string(),
            Utc::now(),
            description.to_string(),
            category,
        )
    }

    #[test]
    fn defense_contract_award_scores_positive() {
        let a = article(
            "Major contract awarded for defense modernization",
            "",
            Category::Defense,
        );
        // "contract", "award" (in "awarded"), "modernization"
        assert_eq!(score(&a), 3);
    }

    #[test]
    fn negative_keywords_pull_the_score_down() {
        let a = article(
            "Program delay after budget cut",
            "Another setback for the effort.",
            Category::Defense,
        );
        assert_eq!(score(&a), -3);
    }

    #[test]
    fn mixed_keywords_cancel_out() {
        let a = article("Contract awarded despite delay", "", Category::Defense);
        // contract +1, award +1, delay -1
        assert_eq!(score(&a), 1);
    }

    #[test]
    fn score_is_deterministic() {
        let a = article(
            "Factory expansion brings jobs and investment",
            "Domestic production growth.",
            Category::Manufacturing,
        );
        let first = score(&a);
        for _ in 0..10 {
            assert_eq!(score(&a), first);
        }
    }

    #[test]
    fn score_is_clamped() {
        let a = article(
            "reshoring factory production jobs investment expansion growth domestic",
            "",
            Category::Manufacturing,
        );
        assert_eq!(score(&a), 5);
    }

    #[test]
    fn assessment_falls_back_to_title_for_summary() {
        let a = article("Hiring surge", "", Category::Workforce);
        let got = assess(&a);
        assert_eq!(got.summary, "Hiring surge");
        assert_eq!(got.impact_score, 1);
    }
}
