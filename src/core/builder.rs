//! Recommendation record assembly.
//!
//! Fans the per-title enrichment calls out concurrently and assembles a
//! complete record once all of them settle. There are no partial records: a
//! failed enrichment call fails the whole build softly and the candidate is
//! skipped.

use crate::models::media::{CatalogEntry, MediaKind};
use crate::models::recommendation::{RecommendationRecord, SeriesDetails};
use crate::services::CatalogGateway;
use crate::Result;

/// Baseline score for an AI-sourced candidate.
const AI_BASE_SCORE: u8 = 85;
/// Baseline score for a heuristic-sourced candidate.
const HEURISTIC_BASE_SCORE: u8 = 70;
/// Review excerpts kept on the final record.
const MAX_REVIEWS: usize = 2;

/// Assemble a complete recommendation for one catalog match.
///
/// The baseline match score only distinguishes provenance (AI suggestion vs
/// catalog heuristic); it is not a quality signal. Returns `None` when any
/// enrichment call errors; the caller treats that as "skip this candidate".
pub async fn build_recommendation<C>(
    catalog: &C,
    entry: &CatalogEntry,
    kind: MediaKind,
    region: &str,
    ai_reason: Option<String>,
) -> Option<RecommendationRecord>
where
    C: CatalogGateway + ?Sized,
{
    match try_build(catalog, entry, kind, region, ai_reason).await {
        Ok(record) => Some(record),
        Err(err) => {
            tracing::warn!("failed to build recommendation for '{}': {}", entry.title, err);
            None
        }
    }
}

async fn try_build<C>(
    catalog: &C,
    entry: &CatalogEntry,
    kind: MediaKind,
    region: &str,
    ai_reason: Option<String>,
) -> Result<RecommendationRecord>
where
    C: CatalogGateway + ?Sized,
{
    let (providers, mut reviews, trailer_url, series) = if kind.is_series() {
        let (providers, reviews, trailer, series) = tokio::join!(
            catalog.watch_providers(entry.id, kind, region),
            catalog.reviews(entry.id, kind),
            catalog.trailer(entry.id, kind),
            catalog.series_details(entry.id),
        );
        (providers?, reviews?, trailer?, series?)
    } else {
        let (providers, reviews, trailer) = tokio::join!(
            catalog.watch_providers(entry.id, kind, region),
            catalog.reviews(entry.id, kind),
            catalog.trailer(entry.id, kind),
        );
        (providers?, reviews?, trailer?, None::<SeriesDetails>)
    };

    reviews.truncate(MAX_REVIEWS);

    let match_score = if ai_reason.is_some() {
        AI_BASE_SCORE
    } else {
        HEURISTIC_BASE_SCORE
    };

    Ok(RecommendationRecord {
        id: entry.id,
        title: entry.title.clone(),
        year: entry.year,
        overview: entry.overview.clone(),
        rating: entry.rating,
        match_score,
        providers,
        reviews,
        trailer_url,
        media_kind: kind,
        ai_reason,
        series,
        poster_url: entry.poster_path.as_deref().map(|p| catalog.image_url(p)),
    })
}
