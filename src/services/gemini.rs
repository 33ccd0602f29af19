//! Gemini API client.
//!
//! Submits a single natural-language prompt to the generative model and
//! parses the response into a structured list of title suggestions.

use crate::models::media::{CandidateTitle, MediaKind};
use crate::services::TitleGenerator;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// The model is asked for exactly this many suggestions; longer replies are
/// truncated rather than rejected.
const MAX_CANDIDATES: usize = 5;

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

impl GeminiConfig {
    /// Create configuration from environment variables.
    ///
    /// A missing `GEMINI_API_KEY` is a configuration error, surfaced here so
    /// it fails the call eagerly rather than as a silent empty result.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("GEMINI_API_KEY").map_err(|_| Error::GeminiApiKeyMissing)?;
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self { api_key, model })
    }
}

/// Gemini API client.
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

/// Generate request payload.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

/// Generate response payload, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<ResponseCandidate>>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

/// One suggestion as emitted by the model.
#[derive(Debug, Deserialize)]
struct RawSuggestion {
    title: String,
    year: Option<u16>,
    reason: Option<String>,
}

impl GeminiClient {
    /// Create a new Gemini client with custom configuration.
    pub fn with_config(config: GeminiConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    /// Create a new Gemini client from environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_config(GeminiConfig::from_env()?))
    }

    /// Verify API key is valid.
    pub async fn verify_api_key(&self) -> Result<bool> {
        let url = format!("{}/models?key={}", GEMINI_BASE_URL, self.config.api_key);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Generate the prompt for a suggestion request.
    fn build_prompt(
        &self,
        query: &str,
        kind: MediaKind,
        hidden_gems: bool,
        recent_titles: &[String],
    ) -> String {
        let noun = kind.plural_noun();

        let gems_directive = if hidden_gems {
            "Prefer underseen, critically acclaimed picks over mainstream hits."
        } else {
            "Mainstream and well-known picks are fine."
        };

        let recent_block = if recent_titles.is_empty() {
            String::new()
        } else {
            format!(
                "\nThe viewer wants something recent. These titles are currently showing, \
                 lean towards releases this new:\n{}\n",
                recent_titles.join(", ")
            )
        };

        format!(
            r#"You are a {noun} recommendation expert. Suggest exactly {MAX_CANDIDATES} {noun} matching this description:

"{query}"

{gems_directive}{recent_block}
Reply with a JSON array only, no prose and no markdown wrapping. Each element:
{{"title": "...", "year": 1999, "reason": "one sentence on why it fits"}}"#
        )
    }
}

/// Strip a fenced code block wrapper if the model added one despite the
/// format instructions.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parse the model's reply into candidates.
fn parse_suggestions(text: &str) -> Result<Vec<CandidateTitle>> {
    let cleaned = strip_code_fences(text);
    let raw: Vec<RawSuggestion> = serde_json::from_str(cleaned)
        .map_err(|e| Error::AiResponse(format!("expected a JSON array of suggestions: {}", e)))?;

    if raw.is_empty() {
        return Err(Error::AiResponse("model returned an empty list".to_string()));
    }

    Ok(raw
        .into_iter()
        .take(MAX_CANDIDATES)
        .map(|s| CandidateTitle {
            title: s.title,
            year: s.year,
            reason: s.reason.unwrap_or_default(),
        })
        .collect())
}

#[async_trait]
impl TitleGenerator for GeminiClient {
    async fn suggest_titles(
        &self,
        query: &str,
        kind: MediaKind,
        hidden_gems: bool,
        recent_titles: &[String],
    ) -> Result<Vec<CandidateTitle>> {
        let prompt = self.build_prompt(query, kind, hidden_gems, recent_titles);
        tracing::debug!("requesting AI suggestions for '{}'", query);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.config.model, self.config.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let resp: GenerateResponse = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        let text = resp
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|parts| parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| Error::AiResponse("response contained no text".to_string()))?;

        parse_suggestions(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GeminiClient {
        GeminiClient::with_config(GeminiConfig {
            api_key: "test-key".to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("[1, 2]"), "[1, 2]");
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("```\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("  [1, 2]  "), "[1, 2]");
    }

    #[test]
    fn test_parse_suggestions() {
        let text = r#"```json
[
  {"title": "Paddington 2", "year": 2017, "reason": "Pure warmth."},
  {"title": "Chef", "year": 2014}
]
```"#;
        let candidates = parse_suggestions(text).expect("parse");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "Paddington 2");
        assert_eq!(candidates[0].year, Some(2017));
        assert_eq!(candidates[1].reason, "");
    }

    #[test]
    fn test_parse_suggestions_truncates_to_five() {
        let text = r#"[
            {"title": "A"}, {"title": "B"}, {"title": "C"},
            {"title": "D"}, {"title": "E"}, {"title": "F"}
        ]"#;
        let candidates = parse_suggestions(text).expect("parse");
        assert_eq!(candidates.len(), 5);
    }

    #[test]
    fn test_parse_suggestions_rejects_malformed() {
        assert!(parse_suggestions("not json at all").is_err());
        assert!(parse_suggestions("{\"title\": \"not a list\"}").is_err());
        assert!(parse_suggestions("[]").is_err());
    }

    #[test]
    fn test_prompt_embeds_directives() {
        let client = test_client();

        let prompt = client.build_prompt("slow cozy mystery", MediaKind::Anime, true, &[]);
        assert!(prompt.contains("anime series"));
        assert!(prompt.contains("underseen"));
        assert!(prompt.contains("slow cozy mystery"));
        assert!(!prompt.contains("currently showing"));

        let recent = vec!["Dandadan".to_string(), "Frieren".to_string()];
        let prompt = client.build_prompt("something new", MediaKind::Anime, false, &recent);
        assert!(prompt.contains("Dandadan, Frieren"));
        assert!(prompt.contains("well-known picks are fine"));
    }
}
