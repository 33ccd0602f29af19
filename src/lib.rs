//! Vibe Recs Library
//!
//! A library for recommending movies, TV shows and anime from a free-text
//! vibe description, combining AI-generated suggestions with TMDB metadata.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod preflight;
pub mod services;

pub use error::{Error, Result};
