//! Vibe Recs CLI
//!
//! Recommends movies, TV shows and anime from a free-text vibe description
//! using AI-generated suggestions and TMDB metadata.

use clap::Parser;
use vibe_recs::cli::{
    args::{Cli, Commands},
    commands::{analyze, recommend},
};
use vibe_recs::preflight;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run the appropriate command
    match cli.command {
        Commands::Recommend {
            query,
            media_type,
            hidden_gems,
            region,
            format,
        } => {
            // Run preflight checks unless skipped
            if !cli.skip_preflight {
                run_preflight_checks().await?;
            }

            recommend::run(&query, &media_type, hidden_gems, &region, &format).await?;
        }

        Commands::Analyze { query } => {
            analyze::run(&query)?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("vibe_recs=debug")
    } else {
        EnvFilter::new("vibe_recs=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

/// Run preflight checks and exit if any fail.
async fn run_preflight_checks() -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks().await?;
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
