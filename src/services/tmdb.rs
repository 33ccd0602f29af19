//! TMDB API client.
//!
//! Implements the catalog side of the engine: discovery, title lookup and
//! per-title enrichment (watch providers, reviews, trailers, season counts).

use crate::models::media::{CatalogEntry, MediaKind, SearchOptions};
use crate::models::recommendation::{AccessKind, ProviderEntry, ReviewSnippet, SeriesDetails};
use crate::services::CatalogGateway;
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tokio::sync::OnceCell;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Animation genre id, shared by the movie and TV taxonomies.
const ANIMATION_GENRE_ID: u64 = 16;

/// Vote-count floor for discovery under hidden-gems bias.
const HIDDEN_GEMS_VOTE_FLOOR: u32 = 50;
/// Vote-count floor for mainstream discovery.
const MAINSTREAM_VOTE_FLOOR: u32 = 100;

/// How many now-showing titles to hand the AI as context.
const NOW_SHOWING_LIMIT: usize = 15;
/// How many reviews enrichment fetches.
const REVIEW_LIMIT: usize = 3;

/// TMDB client configuration.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// API key or Bearer token (JWT)
    pub api_key: String,
    pub language: String,
    /// Whether to use Bearer token authentication (API v4 style)
    pub use_bearer: bool,
}

impl TmdbConfig {
    /// Create config from environment variable.
    /// Supports both API key (v3) and Bearer token (v4) formats.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("TMDB_API_KEY").map_err(|_| crate::Error::TmdbApiKeyMissing)?;

        // Bearer tokens start with "eyJ" (base64 encoded JWT header)
        let use_bearer = api_key.starts_with("eyJ");

        Ok(Self {
            api_key,
            language: "en-US".to_string(),
            use_bearer,
        })
    }
}

/// TMDB API client.
pub struct TmdbClient {
    config: TmdbConfig,
    client: reqwest::Client,
    movie_genres: OnceCell<HashMap<String, u64>>,
    tv_genres: OnceCell<HashMap<String, u64>>,
}

/// One page of search/discover results.
#[derive(Debug, Deserialize)]
struct SearchPage {
    results: Vec<SearchItem>,
}

/// One raw search/discover result. Movie and TV payloads name the title and
/// date fields differently; both shapes are accepted.
#[derive(Debug, Deserialize)]
struct SearchItem {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    vote_average: Option<f32>,
    popularity: Option<f32>,
    #[serde(default)]
    genre_ids: Vec<u64>,
}

impl SearchItem {
    fn into_entry(self) -> Option<CatalogEntry> {
        let title = self.title.or(self.name)?;
        let year = self
            .release_date
            .or(self.first_air_date)
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok());

        Some(CatalogEntry {
            id: self.id,
            title,
            year,
            overview: self.overview.unwrap_or_default(),
            rating: self.vote_average.unwrap_or(0.0),
            popularity: self.popularity.unwrap_or(0.0),
            genre_ids: self.genre_ids,
            poster_path: self.poster_path,
        })
    }
}

/// Genre list response.
#[derive(Debug, Deserialize)]
struct GenreListResponse {
    genres: Vec<GenreItem>,
}

/// Genre.
#[derive(Debug, Deserialize)]
struct GenreItem {
    id: u64,
    name: String,
}

/// Watch providers response, keyed by region code.
#[derive(Debug, Deserialize)]
struct WatchProvidersResponse {
    results: HashMap<String, RegionProviders>,
}

/// Provider lists for one region, by access type.
#[derive(Debug, Default, Deserialize)]
struct RegionProviders {
    free: Option<Vec<ProviderItem>>,
    flatrate: Option<Vec<ProviderItem>>,
    rent: Option<Vec<ProviderItem>>,
    buy: Option<Vec<ProviderItem>>,
}

/// One provider entry on the wire.
#[derive(Debug, Deserialize)]
struct ProviderItem {
    provider_name: String,
    logo_path: Option<String>,
}

/// Reviews response.
#[derive(Debug, Deserialize)]
struct ReviewsResponse {
    results: Vec<ReviewItem>,
}

/// One review on the wire.
#[derive(Debug, Deserialize)]
struct ReviewItem {
    author: String,
    content: String,
    author_details: Option<AuthorDetails>,
}

#[derive(Debug, Deserialize)]
struct AuthorDetails {
    rating: Option<f32>,
}

/// Videos response.
#[derive(Debug, Deserialize)]
struct VideosResponse {
    results: Vec<VideoItem>,
}

/// One video entry on the wire.
#[derive(Debug, Deserialize)]
struct VideoItem {
    key: String,
    site: String,
    #[serde(rename = "type")]
    video_type: String,
}

/// The slice of TV details the engine reads.
#[derive(Debug, Deserialize)]
struct TvDetails {
    number_of_seasons: u16,
    number_of_episodes: u16,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Self {
        let client = reqwest::Client::new();
        Self {
            config,
            client,
            movie_genres: OnceCell::new(),
            tv_genres: OnceCell::new(),
        }
    }

    /// Create a new TMDB client from environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(TmdbConfig::from_env()?))
    }

    /// Build a request with proper authentication.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        if self.config.use_bearer {
            request.header("Authorization", format!("Bearer {}", self.config.api_key))
        } else {
            request
        }
    }

    /// Build URL with optional api_key parameter (only for v3 style).
    fn build_url(&self, path: &str, extra_params: &str) -> String {
        if self.config.use_bearer {
            format!(
                "{}/{}?language={}{}",
                TMDB_BASE_URL, path, self.config.language, extra_params
            )
        } else {
            format!(
                "{}/{}?api_key={}&language={}{}",
                TMDB_BASE_URL, path, self.config.api_key, self.config.language, extra_params
            )
        }
    }

    /// Verify API key is valid.
    pub async fn verify_api_key(&self) -> Result<bool> {
        let url = if self.config.use_bearer {
            format!("{}/authentication", TMDB_BASE_URL)
        } else {
            format!(
                "{}/authentication?api_key={}",
                TMDB_BASE_URL, self.config.api_key
            )
        };

        match self.build_request(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn fetch_genre_map(&self, kind: MediaKind) -> Result<HashMap<String, u64>> {
        let url = self.build_url(&format!("genre/{}/list", kind.catalog_path()), "");
        let resp: GenreListResponse = self.build_request(&url).send().await?.json().await?;
        Ok(resp
            .genres
            .into_iter()
            .map(|g| (g.name.to_lowercase(), g.id))
            .collect())
    }

    /// Resolve genre tags to catalog ids.
    ///
    /// The name->id map is fetched lazily per media kind and cached for the
    /// process lifetime; population is single-flight. A failed fetch resolves
    /// to no ids for this call and is retried on the next one.
    pub async fn genre_ids(&self, tags: &[String], kind: MediaKind) -> Vec<u64> {
        let cell = match kind {
            MediaKind::Movie => &self.movie_genres,
            MediaKind::Tv | MediaKind::Anime => &self.tv_genres,
        };

        let map = match cell.get_or_try_init(|| self.fetch_genre_map(kind)).await {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!("genre list fetch failed: {}", err);
                return Vec::new();
            }
        };

        tags.iter()
            .filter_map(|tag| map.get(&tag.to_lowercase()).copied())
            .collect()
    }

    /// Filtered discover query.
    async fn discover(&self, options: &SearchOptions) -> Result<Vec<CatalogEntry>> {
        let kind = options.media_kind;
        let mut genre_ids = self.genre_ids(&options.genre_tags, kind).await;
        if kind == MediaKind::Anime && !genre_ids.contains(&ANIMATION_GENRE_ID) {
            genre_ids.push(ANIMATION_GENRE_ID);
        }

        let mut params = String::new();
        if !genre_ids.is_empty() {
            let joined = genre_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            params.push_str(&format!("&with_genres={}", joined));
        }

        let original_language = if kind == MediaKind::Anime {
            Some("ja")
        } else {
            options.language.as_deref()
        };
        if let Some(lang) = original_language {
            params.push_str(&format!("&with_original_language={}", lang));
        }

        if let Some(ref region) = options.region {
            params.push_str(&format!("&region={}", region));
        }

        if let Some(year) = options.year {
            let year_key = match kind {
                MediaKind::Movie => "primary_release_year",
                MediaKind::Tv | MediaKind::Anime => "first_air_date_year",
            };
            params.push_str(&format!("&{}={}", year_key, year));
        }

        let (sort_by, vote_floor) = sort_and_floor(options.hidden_gems);
        params.push_str(&format!("&sort_by={}&vote_count.gte={}", sort_by, vote_floor));

        let url = self.build_url(&format!("discover/{}", kind.catalog_path()), &params);
        let resp: SearchPage = self.build_request(&url).send().await?.json().await?;
        Ok(resp.results.into_iter().filter_map(SearchItem::into_entry).collect())
    }

    /// Plain free-text search query.
    async fn text_search(&self, query: &str, options: &SearchOptions) -> Result<Vec<CatalogEntry>> {
        let url = self.build_url(
            &format!("search/{}", options.media_kind.catalog_path()),
            &format!("&query={}", urlencoding::encode(query)),
        );
        let resp: SearchPage = self.build_request(&url).send().await?.json().await?;
        Ok(resp.results.into_iter().filter_map(SearchItem::into_entry).collect())
    }
}

/// Discover sort key and vote-count floor for the hidden-gems bias.
fn sort_and_floor(hidden_gems: bool) -> (&'static str, u32) {
    if hidden_gems {
        ("vote_average.desc", HIDDEN_GEMS_VOTE_FLOOR)
    } else {
        ("popularity.desc", MAINSTREAM_VOTE_FLOOR)
    }
}

/// Flatten a region's provider lists into one deduplicated list.
///
/// Access types are visited free > subscription > rent > buy; the first
/// occurrence of a provider name wins.
fn dedup_providers(regional: RegionProviders) -> Vec<ProviderEntry> {
    let tiers = [
        (AccessKind::Free, regional.free),
        (AccessKind::Subscription, regional.flatrate),
        (AccessKind::Rent, regional.rent),
        (AccessKind::Buy, regional.buy),
    ];

    let mut seen = HashSet::new();
    let mut providers = Vec::new();
    for (access, items) in tiers {
        for item in items.unwrap_or_default() {
            if !seen.insert(item.provider_name.clone()) {
                continue;
            }
            providers.push(ProviderEntry {
                name: item.provider_name,
                logo_url: item.logo_path.map(|p| format!("{}/w92{}", IMAGE_BASE_URL, p)),
                access,
            });
        }
    }
    providers
}

#[async_trait]
impl CatalogGateway for TmdbClient {
    async fn search_by_text(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<CatalogEntry>> {
        let (discovered, searched) =
            tokio::join!(self.discover(options), self.text_search(query, options));

        // Each leg degrades to empty on its own; the union is whatever
        // came back.
        let discovered = discovered.unwrap_or_else(|err| {
            tracing::warn!("discover query failed: {}", err);
            Vec::new()
        });
        let searched = searched.unwrap_or_else(|err| {
            tracing::warn!("search query failed: {}", err);
            Vec::new()
        });

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for entry in discovered.into_iter().chain(searched) {
            if seen.insert(entry.id) {
                merged.push(entry);
            }
        }

        // Server-side filters occasionally let non-animation titles through.
        if options.media_kind == MediaKind::Anime {
            merged.retain(|entry| entry.genre_ids.contains(&ANIMATION_GENRE_ID));
        }

        Ok(merged)
    }

    async fn search_by_title(
        &self,
        title: &str,
        year: Option<u16>,
        kind: MediaKind,
    ) -> Result<Option<CatalogEntry>> {
        let year_param = match kind {
            MediaKind::Movie => year.map(|y| format!("&year={}", y)),
            MediaKind::Tv | MediaKind::Anime => {
                year.map(|y| format!("&first_air_date_year={}", y))
            }
        }
        .unwrap_or_default();

        let url = self.build_url(
            &format!("search/{}", kind.catalog_path()),
            &format!("&query={}{}", urlencoding::encode(title), year_param),
        );
        let resp: SearchPage = self.build_request(&url).send().await?.json().await?;
        Ok(resp.results.into_iter().filter_map(SearchItem::into_entry).next())
    }

    async fn now_showing(&self, kind: MediaKind) -> Result<Vec<String>> {
        let path = match kind {
            MediaKind::Movie => "movie/now_playing",
            MediaKind::Tv | MediaKind::Anime => "tv/on_the_air",
        };
        let url = self.build_url(path, "");
        let resp: SearchPage = self.build_request(&url).send().await?.json().await?;
        Ok(resp
            .results
            .into_iter()
            .filter_map(|item| item.title.or(item.name))
            .take(NOW_SHOWING_LIMIT)
            .collect())
    }

    async fn watch_providers(
        &self,
        id: u64,
        kind: MediaKind,
        region: &str,
    ) -> Result<Vec<ProviderEntry>> {
        let url = self.build_url(
            &format!("{}/{}/watch/providers", kind.catalog_path(), id),
            "",
        );
        let mut resp: WatchProvidersResponse =
            self.build_request(&url).send().await?.json().await?;
        let regional = match resp.results.remove(region) {
            Some(regional) => regional,
            None => return Ok(Vec::new()),
        };
        Ok(dedup_providers(regional))
    }

    async fn reviews(&self, id: u64, kind: MediaKind) -> Result<Vec<ReviewSnippet>> {
        let url = self.build_url(&format!("{}/{}/reviews", kind.catalog_path(), id), "");
        let resp: ReviewsResponse = self.build_request(&url).send().await?.json().await?;
        Ok(resp
            .results
            .into_iter()
            .take(REVIEW_LIMIT)
            .map(|review| ReviewSnippet {
                author: review.author,
                text: review.content,
                rating: review.author_details.and_then(|d| d.rating),
            })
            .collect())
    }

    async fn trailer(&self, id: u64, kind: MediaKind) -> Result<Option<String>> {
        let url = self.build_url(&format!("{}/{}/videos", kind.catalog_path(), id), "");
        let resp: VideosResponse = self.build_request(&url).send().await?.json().await?;
        Ok(resp
            .results
            .into_iter()
            .find(|video| video.site == "YouTube" && video.video_type == "Trailer")
            .map(|video| format!("https://www.youtube.com/watch?v={}", video.key)))
    }

    async fn series_details(&self, id: u64) -> Result<Option<SeriesDetails>> {
        let url = self.build_url(&format!("tv/{}", id), "");
        let resp: TvDetails = self.build_request(&url).send().await?.json().await?;
        Ok(Some(SeriesDetails {
            seasons: resp.number_of_seasons,
            episodes: resp.number_of_episodes,
        }))
    }

    fn image_url(&self, path: &str) -> String {
        format!("{}/w342{}", IMAGE_BASE_URL, path)
    }
}
