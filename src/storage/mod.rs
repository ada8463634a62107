//! Storage module for persisting search data
//!
//! This module handles all database operations, including:
//! - The Document Store (pages keyed by href, with authority weight)
//! - The Index Store (term -> posting list)
//! - Named slots for crawl checkpoints and bloom filter state

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{DocumentStore, IndexStore, PostingBatch, SlotStore, StorageError, StorageResult};

use crate::SeekError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, SeekError> {
    SqliteStorage::new(path)
}

/// A crawled page as persisted in the Document Store
///
/// Absent page metadata is stored as an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Absolute URL, unique across the corpus
    pub href: String,
    pub title: String,
    pub keywords: String,
    pub description: String,
    /// Authority weight, nominally in [0, 1]; backlink propagation may exceed it
    pub weight: f64,
    /// `host[:port]` of `href`
    pub netloc: String,
    pub language_tag: String,
}

impl Document {
    /// Title, description and keywords joined for similarity scoring
    pub fn text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.keywords)
    }
}
