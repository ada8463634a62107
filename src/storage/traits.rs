//! Storage traits and error types
//!
//! The core talks to three stores: documents keyed by href, postings keyed by
//! term, and named slots for checkpoints and filter state. One backend may
//! implement all of them.

use crate::storage::Document;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Term -> document ids contributed by one index batch
pub type PostingBatch = BTreeMap<String, Vec<u64>>;

/// Persisted documents, in corpus (insertion) order
pub trait DocumentStore {
    /// Inserts a document unless its href is already stored
    ///
    /// Returns `true` if the document was new.
    fn insert_document(&mut self, document: &Document) -> StorageResult<bool>;

    fn get_document(&self, href: &str) -> StorageResult<Option<Document>>;

    fn has_document(&self, href: &str) -> StorageResult<bool>;

    /// Document at a zero-based corpus position (the global document id)
    fn document_at(&self, position: u64) -> StorageResult<Option<Document>>;

    /// Up to `limit` documents starting at corpus position `offset`
    fn document_batch(&self, offset: u64, limit: usize) -> StorageResult<Vec<Document>>;

    fn all_documents(&self) -> StorageResult<Vec<Document>>;

    /// Case-insensitive substring match over title, keywords and description,
    /// ordered by weight descending
    fn search_documents(&self, needle: &str) -> StorageResult<Vec<Document>>;

    /// Earliest stored document whose netloc equals `netloc`
    fn first_document_for_netloc(&self, netloc: &str) -> StorageResult<Option<Document>>;

    /// Adds `delta` to a document's weight; unknown hrefs are ignored
    fn add_weight(&mut self, href: &str, delta: f64) -> StorageResult<bool>;

    fn count_documents(&self) -> StorageResult<u64>;

    /// Deletes later documents whose title, keywords and description duplicate
    /// an earlier one. Returns the number removed.
    fn remove_duplicate_content(&mut self) -> StorageResult<u64>;

    /// Language tag -> document count
    fn language_breakdown(&self) -> StorageResult<HashMap<String, u64>>;

    fn mean_weight(&self) -> StorageResult<Option<f64>>;
}

/// Persisted inverted index
pub trait IndexStore {
    /// Appends each term's ids to its stored posting list
    fn append_postings(&mut self, batch: &PostingBatch) -> StorageResult<()>;

    /// Posting list for an exact term, empty if absent
    fn lookup_term(&self, term: &str) -> StorageResult<Vec<u64>>;

    fn clear_index(&mut self) -> StorageResult<()>;

    fn count_terms(&self) -> StorageResult<u64>;
}

/// Named opaque slots holding serialized records
pub trait SlotStore {
    fn load_slot(&self, name: &str) -> StorageResult<Option<String>>;

    /// Writes (or replaces) a slot synchronously
    fn save_slot(&mut self, name: &str, payload: &str) -> StorageResult<()>;

    fn delete_slot(&mut self, name: &str) -> StorageResult<()>;

    /// Number of slots whose name starts with `prefix`
    fn count_slots(&self, prefix: &str) -> StorageResult<u64>;
}
