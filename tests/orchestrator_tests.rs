//! Integration tests for the hybrid orchestrator.
//!
//! The engine is exercised end to end against in-memory fakes of the two
//! external collaborators, with call counters asserting which paths ran.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vibe_recs::core::orchestrator::RecommendationEngine;
use vibe_recs::models::media::{CandidateTitle, CatalogEntry, MediaKind, SearchOptions};
use vibe_recs::models::recommendation::{
    ProviderEntry, RecommendOptions, ReviewSnippet, SeriesDetails,
};
use vibe_recs::services::{CatalogGateway, TitleGenerator};
use vibe_recs::{Error, Result};

fn entry(id: u64, title: &str, rating: f32, popularity: f32) -> CatalogEntry {
    CatalogEntry {
        id,
        title: title.to_string(),
        year: Some(2010),
        overview: format!("About {}", title),
        rating,
        popularity,
        genre_ids: vec![35],
        poster_path: None,
    }
}

fn candidate(title: &str) -> CandidateTitle {
    CandidateTitle {
        title: title.to_string(),
        year: Some(2010),
        reason: format!("{} fits the vibe", title),
    }
}

fn options() -> RecommendOptions {
    RecommendOptions {
        media_kind: MediaKind::Movie,
        hidden_gems: false,
        region: "US".to_string(),
    }
}

#[derive(Default)]
struct CatalogState {
    /// Entries resolvable through search_by_title, matched on exact title.
    titles: Vec<CatalogEntry>,
    /// Entries returned by search_by_text.
    text_results: Vec<CatalogEntry>,
    /// Titles returned by now_showing.
    now_titles: Vec<String>,
    /// Ids whose enrichment calls fail.
    fail_enrichment_for: Vec<u64>,
    text_search_calls: AtomicUsize,
    title_search_calls: AtomicUsize,
    now_showing_calls: AtomicUsize,
    last_search_options: Mutex<Option<SearchOptions>>,
}

#[derive(Clone, Default)]
struct FakeCatalog {
    state: Arc<CatalogState>,
}

impl FakeCatalog {
    fn new(state: CatalogState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }
}

#[async_trait]
impl CatalogGateway for FakeCatalog {
    async fn search_by_text(
        &self,
        _query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<CatalogEntry>> {
        self.state.text_search_calls.fetch_add(1, Ordering::SeqCst);
        *self.state.last_search_options.lock().unwrap() = Some(options.clone());
        Ok(self.state.text_results.clone())
    }

    async fn search_by_title(
        &self,
        title: &str,
        _year: Option<u16>,
        _kind: MediaKind,
    ) -> Result<Option<CatalogEntry>> {
        self.state.title_search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.titles.iter().find(|e| e.title == title).cloned())
    }

    async fn now_showing(&self, _kind: MediaKind) -> Result<Vec<String>> {
        self.state.now_showing_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.now_titles.clone())
    }

    async fn watch_providers(
        &self,
        id: u64,
        _kind: MediaKind,
        _region: &str,
    ) -> Result<Vec<ProviderEntry>> {
        if self.state.fail_enrichment_for.contains(&id) {
            return Err(Error::other("providers endpoint down"));
        }
        Ok(Vec::new())
    }

    async fn reviews(&self, _id: u64, _kind: MediaKind) -> Result<Vec<ReviewSnippet>> {
        Ok(Vec::new())
    }

    async fn trailer(&self, _id: u64, _kind: MediaKind) -> Result<Option<String>> {
        Ok(None)
    }

    async fn series_details(&self, _id: u64) -> Result<Option<SeriesDetails>> {
        Ok(None)
    }

    fn image_url(&self, path: &str) -> String {
        format!("https://images.test{}", path)
    }
}

#[derive(Default)]
struct GeneratorState {
    /// Candidates to return; `None` simulates a failed AI path.
    candidates: Option<Vec<CandidateTitle>>,
    calls: AtomicUsize,
    last_recent_titles: Mutex<Vec<String>>,
}

#[derive(Clone, Default)]
struct FakeGenerator {
    state: Arc<GeneratorState>,
}

impl FakeGenerator {
    fn returning(candidates: Vec<CandidateTitle>) -> Self {
        Self {
            state: Arc::new(GeneratorState {
                candidates: Some(candidates),
                ..Default::default()
            }),
        }
    }

    fn failing() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TitleGenerator for FakeGenerator {
    async fn suggest_titles(
        &self,
        _query: &str,
        _kind: MediaKind,
        _hidden_gems: bool,
        recent_titles: &[String],
    ) -> Result<Vec<CandidateTitle>> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        *self.state.last_recent_titles.lock().unwrap() = recent_titles.to_vec();
        match &self.state.candidates {
            Some(candidates) => Ok(candidates.clone()),
            None => Err(Error::AiResponse("model unavailable".to_string())),
        }
    }
}

// ========== VALIDATION ==========

#[tokio::test]
async fn test_short_query_rejected_before_any_external_call() {
    let catalog = FakeCatalog::default();
    let generator = FakeGenerator::failing();
    let engine = RecommendationEngine::new(catalog.clone(), generator.clone());

    let result = engine.get_recommendations("too short", &options()).await;
    assert!(matches!(result, Err(Error::QueryTooShort)));

    assert_eq!(generator.state.calls.load(Ordering::SeqCst), 0);
    assert_eq!(catalog.state.title_search_calls.load(Ordering::SeqCst), 0);
    assert_eq!(catalog.state.text_search_calls.load(Ordering::SeqCst), 0);
    assert_eq!(catalog.state.now_showing_calls.load(Ordering::SeqCst), 0);
}

// ========== AI PATH ==========

#[tokio::test]
async fn test_sufficient_ai_results_skip_heuristic_fallback() {
    let catalog = FakeCatalog::new(CatalogState {
        titles: vec![
            entry(1, "Paddington 2", 8.2, 80.0),
            entry(2, "Chef", 7.3, 50.0),
            entry(3, "The Intouchables", 8.3, 60.0),
        ],
        ..Default::default()
    });
    let generator = FakeGenerator::returning(vec![
        candidate("Paddington 2"),
        candidate("Chef"),
        candidate("The Intouchables"),
    ]);
    let engine = RecommendationEngine::new(catalog.clone(), generator);

    let records = engine
        .get_recommendations("something warm and funny", &options())
        .await
        .expect("recommendations");

    assert_eq!(records.len(), 3);
    for record in &records {
        assert_eq!(record.match_score, 85);
        assert!(record.ai_reason.is_some());
    }
    // The AI path was sufficient, so no free-text search happened.
    assert_eq!(catalog.state.text_search_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_ai_failure_yields_heuristic_only_records() {
    let catalog = FakeCatalog::new(CatalogState {
        text_results: vec![
            entry(10, "Popular Pick", 8.0, 500.0),
            entry(11, "Quiet Pick", 5.0, 50.0),
        ],
        ..Default::default()
    });
    let generator = FakeGenerator::failing();
    let engine = RecommendationEngine::new(catalog.clone(), generator);

    let records = engine
        .get_recommendations("a feel good movie", &options())
        .await
        .expect("recommendations");

    assert_eq!(catalog.state.text_search_calls.load(Ordering::SeqCst), 1);
    assert_eq!(records.len(), 2);
    for record in &records {
        assert!(record.ai_reason.is_none());
    }
    // 60 + 8.0*2 + 500/100 and 60 + 5.0*2 + 50/100, descending
    assert_eq!(records[0].match_score, 81);
    assert_eq!(records[1].match_score, 70);
}

#[tokio::test]
async fn test_unresolvable_ai_candidates_trigger_fallback() {
    // Five suggestions, none of which exist in the catalog.
    let catalog = FakeCatalog::new(CatalogState {
        text_results: vec![entry(20, "Fallback Pick", 7.0, 100.0)],
        ..Default::default()
    });
    let generator = FakeGenerator::returning(vec![
        candidate("Ghost One"),
        candidate("Ghost Two"),
        candidate("Ghost Three"),
        candidate("Ghost Four"),
        candidate("Ghost Five"),
    ]);
    let engine = RecommendationEngine::new(catalog.clone(), generator);

    let records = engine
        .get_recommendations("an obscure hidden gem", &options())
        .await
        .expect("recommendations");

    assert_eq!(catalog.state.title_search_calls.load(Ordering::SeqCst), 5);
    assert_eq!(catalog.state.text_search_calls.load(Ordering::SeqCst), 1);
    assert_eq!(records.len(), 1);
    assert!(records[0].ai_reason.is_none());
}

// ========== MERGE ==========

#[tokio::test]
async fn test_id_collision_keeps_the_ai_record() {
    let shared = entry(42, "Inception", 8.4, 300.0);
    let catalog = FakeCatalog::new(CatalogState {
        titles: vec![shared.clone()],
        text_results: vec![shared, entry(43, "Tenet", 7.3, 250.0)],
        ..Default::default()
    });
    let generator = FakeGenerator::returning(vec![candidate("Inception")]);
    let engine = RecommendationEngine::new(catalog, generator);

    let records = engine
        .get_recommendations("a clever heist inside dreams", &options())
        .await
        .expect("recommendations");

    let inception: Vec<_> = records.iter().filter(|r| r.id == 42).collect();
    assert_eq!(inception.len(), 1);
    assert_eq!(inception[0].match_score, 85);
    assert!(inception[0].ai_reason.is_some());
    assert!(records.iter().any(|r| r.id == 43));
}

#[tokio::test]
async fn test_result_list_invariants() {
    let text_results: Vec<CatalogEntry> = (0..12)
        .map(|i| {
            entry(
                100 + i,
                &format!("Title {}", i),
                (i % 9) as f32,
                (i * 40) as f32,
            )
        })
        .collect();
    let catalog = FakeCatalog::new(CatalogState {
        text_results,
        ..Default::default()
    });
    let engine = RecommendationEngine::new(catalog, FakeGenerator::failing());

    let records = engine
        .get_recommendations("anything good to watch", &options())
        .await
        .expect("recommendations");

    assert_eq!(records.len(), 7);

    let mut ids = std::collections::HashSet::new();
    for record in &records {
        assert!(record.match_score > 30);
        assert!(ids.insert(record.id), "duplicate id {}", record.id);
    }
    for pair in records.windows(2) {
        assert!(pair[0].match_score >= pair[1].match_score);
    }
}

#[tokio::test]
async fn test_enrichment_failure_drops_the_candidate() {
    let catalog = FakeCatalog::new(CatalogState {
        text_results: vec![
            entry(50, "Healthy Pick", 7.0, 100.0),
            entry(51, "Broken Pick", 9.0, 400.0),
        ],
        fail_enrichment_for: vec![51],
        ..Default::default()
    });
    let engine = RecommendationEngine::new(catalog, FakeGenerator::failing());

    let records = engine
        .get_recommendations("an award winning drama", &options())
        .await
        .expect("recommendations");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, 50);
}

// ========== SIGNAL PROPAGATION ==========

#[tokio::test]
async fn test_search_options_carry_analyzed_signals() {
    let catalog = FakeCatalog::default();
    let engine = RecommendationEngine::new(catalog.clone(), FakeGenerator::failing());

    let request = RecommendOptions {
        media_kind: MediaKind::Movie,
        hidden_gems: true,
        region: "GB".to_string(),
    };
    engine
        .get_recommendations("scary french horror movie for tonight", &request)
        .await
        .expect("recommendations");

    let search_options = catalog
        .state
        .last_search_options
        .lock()
        .unwrap()
        .clone()
        .expect("search was invoked");
    assert!(search_options.hidden_gems);
    assert_eq!(search_options.media_kind, MediaKind::Movie);
    assert_eq!(search_options.region.as_deref(), Some("GB"));
    assert_eq!(search_options.language.as_deref(), Some("fr"));
    assert!(search_options.genre_tags.contains(&"horror".to_string()));
    assert_eq!(search_options.year, None);
}

#[tokio::test]
async fn test_recency_context_flows_to_the_generator() {
    let catalog = FakeCatalog::new(CatalogState {
        now_titles: vec!["Dune Part Three".to_string(), "Wake Up".to_string()],
        ..Default::default()
    });
    let generator = FakeGenerator::returning(Vec::new());
    let engine = RecommendationEngine::new(catalog.clone(), generator.clone());

    engine
        .get_recommendations("the latest sci-fi everyone is watching", &options())
        .await
        .expect("recommendations");

    assert_eq!(catalog.state.now_showing_calls.load(Ordering::SeqCst), 1);
    let received = generator.state.last_recent_titles.lock().unwrap().clone();
    assert_eq!(received, vec!["Dune Part Three", "Wake Up"]);

    // The year filter rides along on the fallback search.
    let search_options = catalog
        .state
        .last_search_options
        .lock()
        .unwrap()
        .clone()
        .expect("search was invoked");
    assert!(search_options.year.is_some());
}
