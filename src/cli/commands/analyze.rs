//! Analyze command implementation.
//!
//! Debugging aid: shows the signals the analyzer derives from a query
//! without touching any external service.

use crate::core::analyzer;
use anyhow::Result;
use colored::Colorize;

/// Execute the analyze command.
pub fn run(query: &str) -> Result<()> {
    let signals = analyzer::analyze(query);

    println!("{} {}", "Query:".bold(), query);
    println!(
        "{} {}",
        "Genres:".bold(),
        if signals.genres.is_empty() {
            "(none)".to_string()
        } else {
            signals.genres.join(", ")
        }
    );
    println!(
        "{} {}",
        "Emotions:".bold(),
        if signals.emotions.is_empty() {
            "(none)".to_string()
        } else {
            signals.emotions.join(", ")
        }
    );
    println!("{} {}/10", "Intensity:".bold(), signals.intensity);
    println!(
        "{} {}",
        "Language:".bold(),
        signals.language.as_deref().unwrap_or("(none)")
    );
    println!("{} {}", "Wants recent:".bold(), signals.wants_recent);

    Ok(())
}
