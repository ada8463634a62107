//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the store traits.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{
    DocumentStore, IndexStore, PostingBatch, SlotStore, StorageError, StorageResult,
};
use crate::storage::Document;
use crate::SeekError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const DOCUMENT_COLUMNS: &str =
    "href, title, keywords, description, weight, netloc, language_tag";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// Every crawl job opens its own connection; WAL mode and a busy timeout
    /// let concurrent jobs write to the same file.
    pub fn new(path: &Path) -> Result<Self, SeekError> {
        let conn = Connection::open(path).map_err(StorageError::from)?;

        conn.execute_batch(
            "
            PRAGMA busy_timeout = 5000;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )
        .map_err(StorageError::from)?;

        initialize_schema(&conn).map_err(StorageError::from)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, SeekError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        initialize_schema(&conn).map_err(StorageError::from)?;
        Ok(Self { conn })
    }

    fn query_documents<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> StorageResult<Vec<Document>> {
        let mut stmt = self.conn.prepare(sql)?;
        let documents = stmt
            .query_map(params, document_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(documents)
    }
}

fn document_from_row(row: &Row) -> rusqlite::Result<Document> {
    Ok(Document {
        href: row.get(0)?,
        title: row.get(1)?,
        keywords: row.get(2)?,
        description: row.get(3)?,
        weight: row.get(4)?,
        netloc: row.get(5)?,
        language_tag: row.get(6)?,
    })
}

/// Escapes LIKE wildcards so the needle matches literally
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl DocumentStore for SqliteStorage {
    fn insert_document(&mut self, document: &Document) -> StorageResult<bool> {
        let now = Utc::now().to_rfc3339();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO documents
             (href, title, keywords, description, weight, netloc, language_tag, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                document.href,
                document.title,
                document.keywords,
                document.description,
                document.weight,
                document.netloc,
                document.language_tag,
                now
            ],
        )?;
        Ok(inserted == 1)
    }

    fn get_document(&self, href: &str) -> StorageResult<Option<Document>> {
        let document = self
            .conn
            .query_row(
                &format!("SELECT {} FROM documents WHERE href = ?1", DOCUMENT_COLUMNS),
                params![href],
                document_from_row,
            )
            .optional()?;
        Ok(document)
    }

    fn has_document(&self, href: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM documents WHERE href = ?1",
                params![href],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn document_at(&self, position: u64) -> StorageResult<Option<Document>> {
        let document = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM documents ORDER BY id LIMIT 1 OFFSET ?1",
                    DOCUMENT_COLUMNS
                ),
                params![position as i64],
                document_from_row,
            )
            .optional()?;
        Ok(document)
    }

    fn document_batch(&self, offset: u64, limit: usize) -> StorageResult<Vec<Document>> {
        self.query_documents(
            &format!(
                "SELECT {} FROM documents ORDER BY id LIMIT ?1 OFFSET ?2",
                DOCUMENT_COLUMNS
            ),
            params![limit as i64, offset as i64],
        )
    }

    fn all_documents(&self) -> StorageResult<Vec<Document>> {
        self.query_documents(
            &format!("SELECT {} FROM documents ORDER BY id", DOCUMENT_COLUMNS),
            [],
        )
    }

    fn search_documents(&self, needle: &str) -> StorageResult<Vec<Document>> {
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        // LIKE is case-insensitive for ASCII; CJK text has no case
        self.query_documents(
            &format!(
                "SELECT {} FROM documents
                 WHERE keywords LIKE ?1 ESCAPE '\\'
                    OR description LIKE ?1 ESCAPE '\\'
                    OR title LIKE ?1 ESCAPE '\\'
                 ORDER BY weight DESC, id ASC",
                DOCUMENT_COLUMNS
            ),
            params![like_pattern(needle)],
        )
    }

    fn first_document_for_netloc(&self, netloc: &str) -> StorageResult<Option<Document>> {
        let document = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM documents WHERE netloc = ?1 ORDER BY id LIMIT 1",
                    DOCUMENT_COLUMNS
                ),
                params![netloc],
                document_from_row,
            )
            .optional()?;
        Ok(document)
    }

    fn add_weight(&mut self, href: &str, delta: f64) -> StorageResult<bool> {
        let updated = self.conn.execute(
            "UPDATE documents SET weight = weight + ?1 WHERE href = ?2",
            params![delta, href],
        )?;
        Ok(updated == 1)
    }

    fn count_documents(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn remove_duplicate_content(&mut self) -> StorageResult<u64> {
        let removed = self.conn.execute(
            "DELETE FROM documents WHERE id NOT IN (
                 SELECT MIN(id) FROM documents GROUP BY title, keywords, description
             )",
            [],
        )?;
        Ok(removed as u64)
    }

    fn language_breakdown(&self) -> StorageResult<HashMap<String, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT language_tag, COUNT(*) FROM documents GROUP BY language_tag")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?;

        let mut breakdown = HashMap::new();
        for row in rows {
            let (tag, count) = row?;
            breakdown.insert(tag, count);
        }
        Ok(breakdown)
    }

    fn mean_weight(&self) -> StorageResult<Option<f64>> {
        let mean: Option<f64> =
            self.conn
                .query_row("SELECT AVG(weight) FROM documents", [], |row| row.get(0))?;
        Ok(mean)
    }
}

impl IndexStore for SqliteStorage {
    fn append_postings(&mut self, batch: &PostingBatch) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut select = tx.prepare("SELECT doc_ids FROM postings WHERE term = ?1")?;
            let mut upsert =
                tx.prepare("INSERT OR REPLACE INTO postings (term, doc_ids) VALUES (?1, ?2)")?;

            for (term, ids) in batch {
                let existing: Option<String> = select
                    .query_row(params![term], |row| row.get(0))
                    .optional()?;

                let mut merged: Vec<u64> = match existing {
                    Some(json) => serde_json::from_str(&json)
                        .map_err(|e| StorageError::Serialization(e.to_string()))?,
                    None => Vec::new(),
                };
                merged.extend_from_slice(ids);

                let json = serde_json::to_string(&merged)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                upsert.execute(params![term, json])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn lookup_term(&self, term: &str) -> StorageResult<Vec<u64>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT doc_ids FROM postings WHERE term = ?1",
                params![term],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(Vec::new()),
        }
    }

    fn clear_index(&mut self) -> StorageResult<()> {
        self.conn.execute("DELETE FROM postings", [])?;
        Ok(())
    }

    fn count_terms(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM postings", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl SlotStore for SqliteStorage {
    fn load_slot(&self, name: &str) -> StorageResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM slots WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn save_slot(&mut self, name: &str, payload: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR REPLACE INTO slots (name, payload, saved_at) VALUES (?1, ?2, ?3)",
            params![name, payload, now],
        )?;
        Ok(())
    }

    fn delete_slot(&mut self, name: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM slots WHERE name = ?1", params![name])?;
        Ok(())
    }

    fn count_slots(&self, prefix: &str) -> StorageResult<u64> {
        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM slots WHERE name LIKE ?1 ESCAPE '\\'",
            params![pattern],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
