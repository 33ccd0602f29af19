//! Hybrid recommendation orchestrator.
//!
//! Drives the full flow: analyze the query, ask the generative model for
//! candidate titles, resolve them against the catalog, and fall back to a
//! keyword-driven catalog search when the AI path fails or under-delivers.
//! External-call failures degrade to empty results; the only errors a caller
//! sees are query validation and missing credentials.

use crate::core::analyzer::{self, AnalyzedSignals};
use crate::core::builder;
use crate::models::media::{CandidateTitle, CatalogEntry, SearchOptions};
use crate::models::recommendation::{RecommendOptions, RecommendationRecord};
use crate::services::{CatalogGateway, TitleGenerator};
use crate::{Error, Result};
use chrono::Datelike;
use std::collections::HashSet;

/// Minimum number of whitespace-separated words a query must have.
const MIN_QUERY_TOKENS: usize = 3;
/// Fewer AI-resolved records than this triggers the heuristic fallback.
const SUFFICIENT_AI_RESULTS: usize = 3;
/// Upper bound on heuristic candidates considered.
const HEURISTIC_CANDIDATE_LIMIT: usize = 10;
/// Records scoring at or below this are dropped from the output.
const MIN_MATCH_SCORE: u8 = 30;
/// Final list length cap.
const MAX_RESULTS: usize = 7;

/// Heuristic score: flat base plus bounded rating/popularity bonuses.
const HEURISTIC_SCORE_BASE: f32 = 60.0;
const HEURISTIC_BONUS_CAP: f32 = 20.0;

/// The hybrid recommendation engine.
///
/// Generic over its two external collaborators so tests can substitute
/// in-memory fakes for the TMDB and Gemini clients.
pub struct RecommendationEngine<C, G> {
    catalog: C,
    generator: G,
}

impl<C, G> RecommendationEngine<C, G>
where
    C: CatalogGateway,
    G: TitleGenerator,
{
    pub fn new(catalog: C, generator: G) -> Self {
        Self { catalog, generator }
    }

    /// Produce an ordered recommendation list for a free-text query.
    ///
    /// An empty list is a valid outcome meaning "no sufficiently confident
    /// matches".
    pub async fn get_recommendations(
        &self,
        query: &str,
        options: &RecommendOptions,
    ) -> Result<Vec<RecommendationRecord>> {
        if query.split_whitespace().count() < MIN_QUERY_TOKENS {
            return Err(Error::QueryTooShort);
        }

        let signals = analyzer::analyze(query);
        tracing::debug!(
            "analyzed query: genres={:?} emotions={:?} intensity={} language={:?} recent={}",
            signals.genres,
            signals.emotions,
            signals.intensity,
            signals.language,
            signals.wants_recent
        );

        let recent_titles = if signals.wants_recent {
            match self.catalog.now_showing(options.media_kind).await {
                Ok(titles) => titles,
                Err(err) => {
                    tracing::warn!("now-showing lookup failed: {}", err);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let mut records = Vec::new();
        let mut seen_ids = HashSet::new();

        match self
            .generator
            .suggest_titles(query, options.media_kind, options.hidden_gems, &recent_titles)
            .await
        {
            Ok(candidates) => {
                self.resolve_ai_candidates(&candidates, options, &mut records, &mut seen_ids)
                    .await;
            }
            Err(err) => tracing::warn!("AI suggestions unavailable: {}", err),
        }

        if records.len() < SUFFICIENT_AI_RESULTS {
            tracing::debug!(
                "{} AI-resolved records, running heuristic fallback",
                records.len()
            );
            self.heuristic_fallback(query, &signals, options, &mut records, &mut seen_ids)
                .await;
        }

        records.retain(|record| record.match_score > MIN_MATCH_SCORE);
        records.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        records.truncate(MAX_RESULTS);

        Ok(records)
    }

    /// Resolve AI title guesses against the catalog, strictly in the order
    /// the model returned them. Unresolvable candidates and failed builds
    /// are dropped without counting as errors.
    async fn resolve_ai_candidates(
        &self,
        candidates: &[CandidateTitle],
        options: &RecommendOptions,
        records: &mut Vec<RecommendationRecord>,
        seen_ids: &mut HashSet<u64>,
    ) {
        for candidate in candidates {
            let entry = match self
                .catalog
                .search_by_title(&candidate.title, candidate.year, options.media_kind)
                .await
            {
                Ok(Some(entry)) => entry,
                Ok(None) => {
                    tracing::debug!("no catalog match for '{}'", candidate.title);
                    continue;
                }
                Err(err) => {
                    tracing::warn!("title lookup failed for '{}': {}", candidate.title, err);
                    continue;
                }
            };

            if seen_ids.contains(&entry.id) {
                continue;
            }

            if let Some(record) = builder::build_recommendation(
                &self.catalog,
                &entry,
                options.media_kind,
                &options.region,
                Some(candidate.reason.clone()),
            )
            .await
            {
                seen_ids.insert(record.id);
                records.push(record);
            }
        }
    }

    /// Non-AI fallback: discover candidates from the catalog using the
    /// analyzed signals and score them from catalog rating and popularity.
    /// Ids already claimed by the AI path are skipped.
    async fn heuristic_fallback(
        &self,
        query: &str,
        signals: &AnalyzedSignals,
        options: &RecommendOptions,
        records: &mut Vec<RecommendationRecord>,
        seen_ids: &mut HashSet<u64>,
    ) {
        let search_options = SearchOptions {
            media_kind: options.media_kind,
            genre_tags: signals.genres.clone(),
            language: signals.language.clone(),
            region: Some(options.region.clone()),
            hidden_gems: options.hidden_gems,
            year: signals
                .wants_recent
                .then(|| chrono::Utc::now().year() as u16),
        };

        let entries = match self.catalog.search_by_text(query, &search_options).await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("catalog search failed: {}", err);
                Vec::new()
            }
        };

        for entry in entries.into_iter().take(HEURISTIC_CANDIDATE_LIMIT) {
            if seen_ids.contains(&entry.id) {
                continue;
            }

            if let Some(mut record) = builder::build_recommendation(
                &self.catalog,
                &entry,
                options.media_kind,
                &options.region,
                None,
            )
            .await
            {
                record.match_score = heuristic_score(&entry);
                seen_ids.insert(record.id);
                records.push(record);
            }
        }
    }
}

/// Confidence for a heuristic candidate: base 60, plus up to 20 from the
/// catalog rating and up to 20 from popularity, capped at 100.
fn heuristic_score(entry: &CatalogEntry) -> u8 {
    let rating_bonus = (entry.rating * 2.0).clamp(0.0, HEURISTIC_BONUS_CAP);
    let popularity_bonus = (entry.popularity / 100.0).clamp(0.0, HEURISTIC_BONUS_CAP);
    (HEURISTIC_SCORE_BASE + rating_bonus + popularity_bonus).min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rating: f32, popularity: f32) -> CatalogEntry {
        CatalogEntry {
            id: 1,
            title: "t".to_string(),
            year: None,
            overview: String::new(),
            rating,
            popularity,
            genre_ids: Vec::new(),
            poster_path: None,
        }
    }

    #[test]
    fn test_heuristic_score_bonuses_are_capped() {
        assert_eq!(heuristic_score(&entry(0.0, 0.0)), 60);
        assert_eq!(heuristic_score(&entry(8.0, 500.0)), 81);
        // 10.0 * 2 and 9000 / 100 both exceed the 20-point caps
        assert_eq!(heuristic_score(&entry(10.0, 9000.0)), 100);
    }
}
