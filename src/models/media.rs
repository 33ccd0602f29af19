//! Media-related data models.

use serde::{Deserialize, Serialize};

/// Media kind enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
    Anime,
}

impl MediaKind {
    /// TMDB catalog a kind maps onto. Anime lives in the TV catalog.
    pub fn catalog_path(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv | MediaKind::Anime => "tv",
        }
    }

    /// Plural noun used when talking to the generative model.
    pub fn plural_noun(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movies",
            MediaKind::Tv => "TV series",
            MediaKind::Anime => "anime series",
        }
    }

    /// Whether this kind carries season/episode counts.
    pub fn is_series(&self) -> bool {
        !matches!(self, MediaKind::Movie)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Tv => write!(f, "tv"),
            MediaKind::Anime => write!(f, "anime"),
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" | "movies" | "film" => Ok(MediaKind::Movie),
            "tv" | "tvshows" | "series" | "tv-series" => Ok(MediaKind::Tv),
            "anime" => Ok(MediaKind::Anime),
            other => Err(crate::Error::other(format!(
                "unknown media type '{}', expected movie, tv or anime",
                other
            ))),
        }
    }
}

/// A single entry as read from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Catalog id, unique and stable across calls.
    pub id: u64,
    pub title: String,
    /// Release year (first air year for series).
    pub year: Option<u16>,
    /// Synopsis text.
    pub overview: String,
    /// Average rating on a 0-10 scale.
    pub rating: f32,
    /// Popularity score as reported by the catalog.
    pub popularity: f32,
    /// Genre ids attached to the entry.
    pub genre_ids: Vec<u64>,
    /// Poster path fragment, if any.
    pub poster_path: Option<String>,
}

/// Options driving a free-text catalog search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub media_kind: MediaKind,
    /// Genre tags derived from the query, resolved to ids by the gateway.
    pub genre_tags: Vec<String>,
    /// Original-language filter (ISO 639-1 code).
    pub language: Option<String>,
    /// Region code (ISO 3166-1 country code).
    pub region: Option<String>,
    /// Bias towards underseen, highly rated titles.
    pub hidden_gems: bool,
    /// Release-year filter.
    pub year: Option<u16>,
}

/// A title guess returned by the generative recommender.
///
/// Not yet tied to a catalog identity; resolved via title lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateTitle {
    pub title: String,
    pub year: Option<u16>,
    /// Model's one-line rationale for the suggestion.
    pub reason: String,
}
