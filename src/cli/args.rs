//! Command line argument definitions.

use clap::{Parser, Subcommand};

/// Vibe Recs - movie, TV and anime recommendations from a vibe description
#[derive(Parser, Debug)]
#[command(name = "vibe-recs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Get recommendations for a vibe description
    Recommend {
        /// Free-text description of what you feel like watching
        #[arg(value_name = "QUERY")]
        query: String,

        /// Media type: movie, tv or anime
        #[arg(short, long, default_value = "movie")]
        media_type: String,

        /// Bias towards underseen, critically acclaimed titles
        #[arg(long)]
        hidden_gems: bool,

        /// Region code for streaming providers (e.g. US, GB, DE)
        #[arg(short, long, default_value = "US")]
        region: String,

        /// Output format: table, simple, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show the signals the analyzer derives from a query
    Analyze {
        /// Free-text description to analyze
        #[arg(value_name = "QUERY")]
        query: String,
    },
}
