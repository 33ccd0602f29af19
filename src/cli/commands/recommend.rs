//! Recommend command implementation.

use crate::core::orchestrator::RecommendationEngine;
use crate::models::media::MediaKind;
use crate::models::recommendation::{RecommendOptions, RecommendationRecord};
use crate::services::gemini::GeminiClient;
use crate::services::tmdb::TmdbClient;
use anyhow::Result;
use colored::Colorize;

/// Execute the recommend command.
pub async fn run(
    query: &str,
    media_type: &str,
    hidden_gems: bool,
    region: &str,
    format: &str,
) -> Result<()> {
    let media_kind: MediaKind = media_type.parse()?;

    let catalog = TmdbClient::from_env()?;
    let generator = GeminiClient::from_env()?;
    let engine = RecommendationEngine::new(catalog, generator);

    let options = RecommendOptions {
        media_kind,
        hidden_gems,
        region: region.to_string(),
    };

    println!("Finding {} for: {}", media_kind.plural_noun(), query.bold());
    let records = engine.get_recommendations(query, &options).await?;

    if records.is_empty() {
        println!(
            "{}",
            "No sufficiently confident matches found. Try rephrasing the vibe.".yellow()
        );
        return Ok(());
    }

    match format {
        "json" => print_json(&records)?,
        "simple" => print_simple(&records),
        _ => print_table(&records),
    }

    Ok(())
}

/// Print results as JSON.
fn print_json(records: &[RecommendationRecord]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}

/// Print results as a compact one-line-per-title list.
fn print_simple(records: &[RecommendationRecord]) {
    for record in records {
        let year = record
            .year
            .map(|y| format!(" ({})", y))
            .unwrap_or_default();
        println!("{:>3}%  {}{}", record.match_score, record.title, year);
    }
}

/// Print results as a detailed table.
fn print_table(records: &[RecommendationRecord]) {
    for (index, record) in records.iter().enumerate() {
        let year = record
            .year
            .map(|y| format!(" ({})", y))
            .unwrap_or_default();

        println!();
        println!(
            "{} {}{}  {}",
            format!("{}.", index + 1).bold(),
            record.title.bold().cyan(),
            year,
            format!("{}% match", record.match_score).green()
        );

        if record.rating > 0.0 {
            println!("   Rating: {:.1}/10", record.rating);
        }

        if let Some(ref series) = record.series {
            println!(
                "   {} seasons, {} episodes",
                series.seasons, series.episodes
            );
        }

        if !record.overview.is_empty() {
            println!("   {}", record.overview);
        }

        if let Some(ref reason) = record.ai_reason {
            if !reason.is_empty() {
                println!("   {} {}", "Why:".bold(), reason.italic());
            }
        }

        if !record.providers.is_empty() {
            let providers: Vec<String> = record
                .providers
                .iter()
                .map(|p| format!("{} ({})", p.name, p.access))
                .collect();
            println!("   Watch on: {}", providers.join(", "));
        }

        for review in &record.reviews {
            let rating = review
                .rating
                .map(|r| format!(" [{:.0}/10]", r))
                .unwrap_or_default();
            println!("   {} \"{}\"{}", "-".dimmed(), truncate(&review.text, 160), rating);
        }

        if let Some(ref trailer) = record.trailer_url {
            println!("   Trailer: {}", trailer.underline());
        }
    }
    println!();
}

/// Truncate long review text at a character boundary.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
