// src/category.rs
use serde::{Deserialize, Serialize};

/// The six tracked policy/economic domains.
///
/// Closed set: every `match` over `Category` is exhaustive, so there is no
/// "unknown category" path anywhere in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Defense,
    Manufacturing,
    Energy,
    Workforce,
    TechPolicy,
    SupplyChain,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Defense,
        Category::Manufacturing,
        Category::Energy,
        Category::Workforce,
        Category::TechPolicy,
        Category::SupplyChain,
    ];

    /// Wire key used in API paths, payload maps, and the feeds config.
    pub fn key(self) -> &'static str {
        match self {
            Category::Defense => "defense",
            Category::Manufacturing => "manufacturing",
            Category::Energy => "energy",
            Category::Workforce => "workforce",
            Category::TechPolicy => "techPolicy",
            Category::SupplyChain => "supplyChain",
        }
    }

    /// Human-readable name embedded in scoring prompts and the dashboard.
    pub fn display_name(self) -> &'static str {
        match self {
            Category::Defense => "Defense Technology",
            Category::Manufacturing => "Manufacturing Reshoring",
            Category::Energy => "Energy Infrastructure",
            Category::Workforce => "Workforce Development",
            Category::TechPolicy => "Technology Policy",
            Category::SupplyChain => "Supply Chain Resilience",
        }
    }

    /// Inverse of [`Category::key`]; `None` for anything outside the six keys.
    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
