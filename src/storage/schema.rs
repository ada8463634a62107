//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Sumi-Seek database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Document Store: one row per crawled page, keyed by href
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    href TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    keywords TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    weight REAL NOT NULL DEFAULT 0.5,
    netloc TEXT NOT NULL,
    language_tag TEXT NOT NULL DEFAULT 'und',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_netloc ON documents(netloc);
CREATE INDEX IF NOT EXISTS idx_documents_weight ON documents(weight);

-- Index Store: term -> JSON array of global document ids
CREATE TABLE IF NOT EXISTS postings (
    term TEXT PRIMARY KEY,
    doc_ids TEXT NOT NULL
);

-- Named slots for checkpoints and filter state
CREATE TABLE IF NOT EXISTS slots (
    name TEXT PRIMARY KEY,
    payload TEXT NOT NULL,
    saved_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
