//! Free-text input analyzer.
//!
//! Turns a raw vibe description into structured search signals: genre and
//! emotion tags, an intensity score, an optional language code and a
//! recency flag. Pure text classification, no external calls.

use serde::{Deserialize, Serialize};

/// Default intensity when no keyword bumps it.
const DEFAULT_INTENSITY: u8 = 5;
const HIGH_INTENSITY: u8 = 8;
const LOW_INTENSITY: u8 = 3;

/// Genre tag -> keywords. A tag applies when any keyword is a substring of
/// any whitespace token of the query.
const GENRE_KEYWORDS: &[(&str, &[&str])] = &[
    ("action", &["action", "fight", "explos", "chase", "battle"]),
    ("comedy", &["comedy", "funny", "laugh", "hilarious", "humor"]),
    ("drama", &["drama", "emotional", "heartfelt", "moving"]),
    ("horror", &["horror", "scary", "creepy", "haunt", "terrify"]),
    ("romance", &["romance", "romantic", "love"]),
    (
        "science fiction",
        &["sci-fi", "scifi", "space", "futuristic", "dystopi", "cyberpunk", "alien"],
    ),
    ("thriller", &["thriller", "suspense", "twist"]),
    ("fantasy", &["fantasy", "magic", "dragon", "wizard", "mythic"]),
    ("mystery", &["mystery", "detective", "whodunit", "investigat"]),
    ("animation", &["animated", "animation", "cartoon"]),
    ("documentary", &["documentary", "docu"]),
    ("crime", &["crime", "heist", "gangster", "mafia", "noir"]),
    ("adventure", &["adventure", "quest", "expedition", "journey"]),
    ("family", &["family", "wholesome", "kids"]),
    ("war", &["war", "soldier", "military"]),
    ("western", &["western", "cowboy"]),
    ("history", &["history", "historical", "period"]),
];

/// Emotion tag -> keywords, matched the same way as genres.
const EMOTION_KEYWORDS: &[(&str, &[&str])] = &[
    ("joy", &["funny", "laugh", "happy", "joy", "cheerful", "uplifting", "feel-good"]),
    ("sadness", &["sad", "cry", "tearjerker", "grief", "melanchol"]),
    ("fear", &["scary", "dread", "terrify", "frighten"]),
    ("excitement", &["thrill", "exciting", "adrenaline", "pumped"]),
    ("nostalgia", &["nostalgi", "childhood", "retro", "classic"]),
    ("tension", &["tense", "suspense", "nerve-wracking"]),
    ("wonder", &["wonder", "awe", "magical", "dreamlike"]),
    ("calm", &["calm", "cozy", "relax", "gentle", "soothing"]),
];

/// Keywords matched as substrings of the whole lower-cased text.
const HIGH_INTENSITY_KEYWORDS: &[&str] =
    &["intense", "extreme", "brutal", "adrenaline", "hardcore", "violent", "gripping"];

const LOW_INTENSITY_KEYWORDS: &[&str] =
    &["calm", "relaxing", "chill", "cozy", "lighthearted", "light-hearted", "gentle", "slow burn"];

/// Language name -> ISO 639-1 code. First match wins.
const LANGUAGE_KEYWORDS: &[(&str, &str)] = &[
    ("japanese", "ja"),
    ("korean", "ko"),
    ("french", "fr"),
    ("spanish", "es"),
    ("german", "de"),
    ("italian", "it"),
    ("hindi", "hi"),
    ("mandarin", "zh"),
    ("chinese", "zh"),
    ("cantonese", "zh"),
    ("portuguese", "pt"),
];

const RECENCY_KEYWORDS: &[&str] = &[
    "recent",
    "latest",
    "newest",
    "new release",
    "just released",
    "just came out",
    "this year",
    "currently",
    "now showing",
    "in theaters",
    "2024",
    "2025",
    "2026",
];

/// Structured signals derived from a free-text query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedSignals {
    pub genres: Vec<String>,
    pub emotions: Vec<String>,
    /// 1-10 scale, default 5.
    pub intensity: u8,
    /// ISO 639-1 code, if a language was named.
    pub language: Option<String>,
    pub wants_recent: bool,
}

impl Default for AnalyzedSignals {
    fn default() -> Self {
        Self {
            genres: Vec::new(),
            emotions: Vec::new(),
            intensity: DEFAULT_INTENSITY,
            language: None,
            wants_recent: false,
        }
    }
}

/// Analyze a free-text query into structured signals.
///
/// Total: unmatched or empty text yields empty tag sets and the defaults.
pub fn analyze(text: &str) -> AnalyzedSignals {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    let genres = collect_tags(GENRE_KEYWORDS, &tokens);
    let emotions = collect_tags(EMOTION_KEYWORDS, &tokens);

    let mut intensity = DEFAULT_INTENSITY;
    if HIGH_INTENSITY_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        intensity = HIGH_INTENSITY;
    }
    // The low-intensity check runs second and wins when both match.
    if LOW_INTENSITY_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        intensity = LOW_INTENSITY;
    }

    let language = LANGUAGE_KEYWORDS
        .iter()
        .find(|(name, _)| lowered.contains(name))
        .map(|(_, code)| (*code).to_string());

    let wants_recent = RECENCY_KEYWORDS.iter().any(|kw| lowered.contains(kw));

    AnalyzedSignals {
        genres,
        emotions,
        intensity,
        language,
        wants_recent,
    }
}

fn collect_tags(dictionary: &[(&str, &[&str])], tokens: &[&str]) -> Vec<String> {
    dictionary
        .iter()
        .filter(|(_, keywords)| {
            keywords
                .iter()
                .any(|kw| tokens.iter().any(|token| token.contains(kw)))
        })
        .map(|(tag, _)| (*tag).to_string())
        .collect()
}

// Integration tests live in tests/analyzer_tests.rs
