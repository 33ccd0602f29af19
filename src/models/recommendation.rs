//! Recommendation result models.

use crate::models::media::MediaKind;
use serde::{Deserialize, Serialize};

/// How a streaming provider offers a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    Free,
    Subscription,
    Rent,
    Buy,
}

impl std::fmt::Display for AccessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessKind::Free => write!(f, "free"),
            AccessKind::Subscription => write!(f, "subscription"),
            AccessKind::Rent => write!(f, "rent"),
            AccessKind::Buy => write!(f, "buy"),
        }
    }
}

/// A streaming provider offering a title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub name: String,
    pub logo_url: Option<String>,
    pub access: AccessKind,
}

/// A short review excerpt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSnippet {
    pub author: String,
    pub text: String,
    /// Reviewer's rating on a 0-10 scale, if given.
    pub rating: Option<f32>,
}

/// Season/episode counts for a series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeriesDetails {
    pub seasons: u16,
    pub episodes: u16,
}

/// Options for a recommendation request.
#[derive(Debug, Clone)]
pub struct RecommendOptions {
    pub media_kind: MediaKind,
    /// Bias towards underseen, critically acclaimed titles.
    pub hidden_gems: bool,
    /// Region code for streaming provider lookups.
    pub region: String,
}

/// A fully assembled recommendation.
///
/// Built once, never updated; the final list only filters, sorts and drops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRecord {
    /// Catalog id, unique within one result list.
    pub id: u64,
    pub title: String,
    pub year: Option<u16>,
    pub overview: String,
    /// Catalog average rating, 0-10.
    pub rating: f32,
    /// Confidence score, 0-100. Records at or below 30 are dropped.
    pub match_score: u8,
    pub providers: Vec<ProviderEntry>,
    /// Up to two review excerpts.
    pub reviews: Vec<ReviewSnippet>,
    pub trailer_url: Option<String>,
    pub media_kind: MediaKind,
    /// The generative model's rationale; absent for heuristic candidates.
    pub ai_reason: Option<String>,
    pub series: Option<SeriesDetails>,
    pub poster_url: Option<String>,
}
