//! Error types for the recommendation engine.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the recommendation engine.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("TMDB API key not configured. Set TMDB_API_KEY environment variable")]
    TmdbApiKeyMissing,

    #[error("Gemini API key not configured. Set GEMINI_API_KEY environment variable")]
    GeminiApiKeyMissing,

    // Validation errors
    #[error("Query too short: describe the vibe in at least 3 words")]
    QueryTooShort,

    // AI errors
    #[error("AI response invalid: {0}")]
    AiResponse(String),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
