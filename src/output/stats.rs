//! Statistics generation from the search database
//!
//! This module provides functionality for extracting and displaying
//! corpus statistics from the storage layer.

use crate::crawler::checkpoint_slot;
use crate::storage::{DocumentStore, IndexStore, SlotStore};
use crate::SeekError;
use std::collections::HashMap;

/// Corpus statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusStats {
    /// Total number of stored documents
    pub documents: u64,

    /// Number of distinct terms in the index
    pub indexed_terms: u64,

    /// Document count per language tag
    pub languages: HashMap<String, u64>,

    /// Mean authority weight, `None` for an empty corpus
    pub mean_weight: Option<f64>,

    /// Number of crawl jobs with a saved checkpoint
    pub checkpoints: u64,
}

/// Loads statistics from storage
pub fn load_statistics<S>(storage: &S) -> Result<CorpusStats, SeekError>
where
    S: DocumentStore + IndexStore + SlotStore,
{
    Ok(CorpusStats {
        documents: storage.count_documents()?,
        indexed_terms: storage.count_terms()?,
        languages: storage.language_breakdown()?,
        mean_weight: storage.mean_weight()?,
        checkpoints: storage.count_slots(&checkpoint_slot(""))?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CorpusStats) {
    println!("=== Corpus Statistics ===\n");

    println!("Overview:");
    println!("  Documents: {}", stats.documents);
    println!("  Indexed terms: {}", stats.indexed_terms);
    match stats.mean_weight {
        Some(mean) => println!("  Mean weight: {:.4}", mean),
        None => println!("  Mean weight: -"),
    }
    println!("  Saved checkpoints: {}", stats.checkpoints);
    println!();

    if !stats.languages.is_empty() {
        println!("Documents by Language:");
        // Sort languages by count (descending)
        let mut languages: Vec<_> = stats.languages.iter().collect();
        languages.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (tag, count) in languages {
            let percentage = if stats.documents > 0 {
                (*count as f64 / stats.documents as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", tag, count, percentage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Document, PostingBatch, SqliteStorage};

    #[test]
    fn test_empty_corpus() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let stats = load_statistics(&storage).unwrap();

        assert_eq!(stats.documents, 0);
        assert_eq!(stats.indexed_terms, 0);
        assert_eq!(stats.mean_weight, None);
        assert!(stats.languages.is_empty());
    }

    #[test]
    fn test_counts_documents_terms_and_checkpoints() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .insert_document(&Document {
                href: "https://example.com/".to_string(),
                title: "Example".to_string(),
                keywords: String::new(),
                description: String::new(),
                weight: 0.25,
                netloc: "example.com".to_string(),
                language_tag: "eng".to_string(),
            })
            .unwrap();

        let mut postings = PostingBatch::new();
        postings.insert("example".to_string(), vec![0]);
        storage.append_postings(&postings).unwrap();

        storage.save_slot(&checkpoint_slot("wiki"), "{}").unwrap();
        storage.save_slot("filter:wiki", "{}").unwrap();

        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats.documents, 1);
        assert_eq!(stats.indexed_terms, 1);
        assert_eq!(stats.languages.get("eng"), Some(&1));
        assert_eq!(stats.mean_weight, Some(0.25));
        assert_eq!(stats.checkpoints, 1);
    }
}
