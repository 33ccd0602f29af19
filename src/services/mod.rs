//! External service clients and the interfaces the engine consumes.

pub mod gemini;
pub mod tmdb;

use crate::models::media::{CandidateTitle, CatalogEntry, MediaKind, SearchOptions};
use crate::models::recommendation::{ProviderEntry, ReviewSnippet, SeriesDetails};
use crate::Result;
use async_trait::async_trait;

/// Catalog operations the recommendation engine depends on.
///
/// Implemented by [`tmdb::TmdbClient`]; tests substitute in-memory fakes.
/// Callers treat any `Err` as an empty result.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Free-text discovery: a filtered discover query unioned with a plain
    /// search query, deduplicated by id in first-seen order.
    async fn search_by_text(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<CatalogEntry>>;

    /// Look up a single title; first match wins.
    async fn search_by_title(
        &self,
        title: &str,
        year: Option<u16>,
        kind: MediaKind,
    ) -> Result<Option<CatalogEntry>>;

    /// Titles currently showing, used as recency context for the AI.
    async fn now_showing(&self, kind: MediaKind) -> Result<Vec<String>>;

    /// Streaming providers for a title in a region, deduplicated by name
    /// with free > subscription > rent > buy priority.
    async fn watch_providers(
        &self,
        id: u64,
        kind: MediaKind,
        region: &str,
    ) -> Result<Vec<ProviderEntry>>;

    /// Top review excerpts for a title.
    async fn reviews(&self, id: u64, kind: MediaKind) -> Result<Vec<ReviewSnippet>>;

    /// First trailer link for a title, if one exists.
    async fn trailer(&self, id: u64, kind: MediaKind) -> Result<Option<String>>;

    /// Season/episode counts; only meaningful for series kinds.
    async fn series_details(&self, id: u64) -> Result<Option<SeriesDetails>>;

    /// Full image URL for a catalog image path fragment.
    fn image_url(&self, path: &str) -> String;
}

/// Generative title suggestions the engine consumes.
///
/// A typed failure means "AI path unavailable"; the orchestrator compensates
/// with the heuristic fallback.
#[async_trait]
pub trait TitleGenerator: Send + Sync {
    /// Ask the model for up to five title guesses matching the query.
    async fn suggest_titles(
        &self,
        query: &str,
        kind: MediaKind,
        hidden_gems: bool,
        recent_titles: &[String],
    ) -> Result<Vec<CandidateTitle>>;
}
