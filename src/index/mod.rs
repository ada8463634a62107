//! Batch inverted index builder
//!
//! Documents are read in corpus order in fixed-size batches. A document's id
//! in the posting lists is its corpus position, `batch_index * batch_size +
//! offset`. A short trailing batch ends the build without being indexed.

use crate::config::IndexConfig;
use crate::storage::{Document, DocumentStore, IndexStore, PostingBatch};
use crate::text::Tokenizer;
use crate::SeekError;
use std::time::{Duration, Instant};

/// Outcome of one index build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub batches: u64,
    pub documents_indexed: u64,
    /// Postings appended, duplicates included
    pub postings_written: u64,
    /// Documents in the trailing short batch, never indexed
    pub documents_dropped: u64,
}

pub struct IndexBuilder {
    tokenizer: Tokenizer,
    batch_size: usize,
    pause: Duration,
}

impl IndexBuilder {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            tokenizer: Tokenizer::new(&config.stop_words),
            batch_size: config.batch_size.max(1),
            pause: Duration::from_millis(config.batch_pause_ms),
        }
    }

    /// Term -> ids for one full batch
    ///
    /// Each document contributes its title, keywords and description terms in
    /// that order. A term found several times in one document repeats its id.
    pub fn postings_for_batch(&self, batch_index: u64, documents: &[Document]) -> PostingBatch {
        let mut postings = PostingBatch::new();
        let base = batch_index * self.batch_size as u64;

        for (offset, document) in documents.iter().enumerate() {
            let doc_id = base + offset as u64;
            for field in [&document.title, &document.keywords, &document.description] {
                for term in self.tokenizer.terms(field) {
                    postings.entry(term).or_default().push(doc_id);
                }
            }
        }

        postings
    }

    /// Indexes every full batch of the store, pausing after each flush
    pub async fn build<S>(&self, store: &mut S) -> Result<IndexReport, SeekError>
    where
        S: DocumentStore + IndexStore,
    {
        let mut report = IndexReport::default();
        let mut batch_index = 0u64;
        let start_time = Instant::now();

        loop {
            let offset = batch_index * self.batch_size as u64;
            let documents = store.document_batch(offset, self.batch_size)?;

            if documents.len() < self.batch_size {
                report.documents_dropped = documents.len() as u64;
                if !documents.is_empty() {
                    tracing::info!(
                        "Stopping at short batch {} ({} of {} documents, not indexed)",
                        batch_index,
                        documents.len(),
                        self.batch_size
                    );
                }
                break;
            }

            let postings = self.postings_for_batch(batch_index, &documents);
            store.append_postings(&postings)?;

            report.batches += 1;
            report.documents_indexed += documents.len() as u64;
            report.postings_written += postings.values().map(|ids| ids.len() as u64).sum::<u64>();
            tracing::debug!(
                "Indexed batch {} ({} terms)",
                batch_index,
                postings.len()
            );

            batch_index += 1;
            if !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
        }

        tracing::info!(
            "Index build finished: {} documents in {} batches ({:?})",
            report.documents_indexed,
            report.batches,
            start_time.elapsed()
        );
        Ok(report)
    }
}

/// Rebuilds the index from scratch
pub async fn build_index<S>(config: &IndexConfig, store: &mut S) -> Result<IndexReport, SeekError>
where
    S: DocumentStore + IndexStore,
{
    store.clear_index()?;
    IndexBuilder::new(config).build(store).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    fn config(batch_size: usize) -> IndexConfig {
        IndexConfig {
            batch_size,
            batch_pause_ms: 0,
            stop_words: vec![],
        }
    }

    fn document(i: usize, title: &str) -> Document {
        Document {
            href: format!("https://example.com/{}", i),
            title: title.to_string(),
            keywords: String::new(),
            description: String::new(),
            weight: 0.5,
            netloc: "example.com".to_string(),
            language_tag: "eng".to_string(),
        }
    }

    fn corpus(count: usize) -> SqliteStorage {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        for i in 0..count {
            storage
                .insert_document(&document(i, &format!("common doc{}", i)))
                .unwrap();
        }
        storage
    }

    #[tokio::test]
    async fn test_trailing_partial_batch_dropped() {
        let mut storage = corpus(45);

        let report = build_index(&config(20), &mut storage).await.unwrap();

        assert_eq!(report.batches, 2);
        assert_eq!(report.documents_indexed, 40);
        assert_eq!(report.documents_dropped, 5);

        let ids = storage.lookup_term("common").unwrap();
        assert_eq!(ids, (0..40).collect::<Vec<u64>>());
        assert_eq!(storage.lookup_term("doc39").unwrap(), vec![39]);
        assert!(storage.lookup_term("doc40").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_small_corpus_indexes_nothing() {
        let mut storage = corpus(19);
        let report = build_index(&config(20), &mut storage).await.unwrap();

        assert_eq!(report.documents_indexed, 0);
        assert_eq!(storage.count_terms().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rebuild_does_not_duplicate() {
        let mut storage = corpus(2);
        build_index(&config(1), &mut storage).await.unwrap();
        build_index(&config(1), &mut storage).await.unwrap();

        assert_eq!(storage.lookup_term("common").unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_ids_repeat_across_fields() {
        let builder = IndexBuilder::new(&config(2));
        let mut doc = document(0, "Rust");
        doc.keywords = "rust, tokio".to_string();
        doc.description = "the rust runtime".to_string();

        let postings = builder.postings_for_batch(3, &[document(1, "other"), doc]);

        assert_eq!(postings["rust"], vec![7, 7, 7]);
        assert_eq!(postings["tokio"], vec![7]);
        assert_eq!(postings["other"], vec![6]);
        assert!(!postings.contains_key("the"));
    }
}
