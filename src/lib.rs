//! Sumi-Seek: a small polite web search engine
//!
//! This crate crawls pages breadth-first behind a robots.txt gate, deduplicates
//! visited URLs with a bloom filter, builds a term-based inverted index in batches,
//! ranks documents by TF-IDF cosine similarity blended with an authority weight,
//! and redistributes that weight once along backlinks.

pub mod backlinks;
pub mod config;
pub mod crawler;
pub mod dedup;
pub mod index;
pub mod output;
pub mod ranking;
pub mod robots;
pub mod storage;
pub mod text;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Seek operations
#[derive(Debug, Error)]
pub enum SeekError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Invalid filter parameters: {0}")]
    Construction(#[from] dedup::ConstructionError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Crawl job failed: {0}")]
    Job(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Sumi-Seek operations
pub type Result<T> = std::result::Result<T, SeekError>;

// Re-export commonly used types
pub use config::Config;
pub use dedup::BloomFilter;
pub use ranking::{RankOutcome, Ranker};
pub use storage::{Document, SqliteStorage};
pub use crate::url::{extract_origin, normalize_link};
