//! Query-time ranking
//!
//! Candidates come from two paths: the inverted index, then a substring search
//! over the corpus. They are scored by TF-IDF cosine similarity against the
//! query terms, and the resulting rank is turned into a boost on top of each
//! document's stored authority weight.

mod tfidf;

pub use tfidf::TfIdfModel;

use crate::config::Config;
use crate::storage::{Document, DocumentStore, IndexStore};
use crate::text::Tokenizer;
use crate::SeekError;
use std::collections::HashSet;

/// A candidate with its similarity score and final weight
#[derive(Debug, Clone, PartialEq)]
pub struct RankedDocument {
    pub document: Document,
    /// Mean cosine similarity across query terms
    pub similarity: f64,
    /// Stored weight plus rank boost; results are ordered by this
    pub weight: f64,
}

/// Result of a query
#[derive(Debug, Clone, PartialEq)]
pub enum RankOutcome {
    /// Candidates, highest final weight first
    Ranked(Vec<RankedDocument>),
    /// No candidates, or none of their text survives tokenization
    NoSignal,
    /// The query itself has no terms after stop-word removal
    EmptyQuery,
}

pub struct Ranker {
    tokenizer: Tokenizer,
    boost: f64,
}

impl Ranker {
    pub fn new(tokenizer: Tokenizer, boost: f64) -> Self {
        Self { tokenizer, boost }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Tokenizer::new(&config.index.stop_words), config.ranking.boost)
    }

    /// Terms the query is matched with
    pub fn query_terms(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tokenizer
            .terms(text)
            .into_iter()
            .filter(|term| seen.insert(term.clone()))
            .collect()
    }

    /// Runs a query against the store
    pub fn query<S>(&self, store: &S, text: &str) -> Result<RankOutcome, SeekError>
    where
        S: DocumentStore + IndexStore,
    {
        let terms = self.query_terms(text);
        if terms.is_empty() {
            return Ok(RankOutcome::EmptyQuery);
        }

        let candidates = self.candidates(store, &terms)?;
        tracing::debug!("{} candidates for {:?}", candidates.len(), terms);
        Ok(self.rank(&terms, candidates))
    }

    /// Index hits first, then full-text hits, each href once
    pub fn candidates<S>(&self, store: &S, terms: &[String]) -> Result<Vec<Document>, SeekError>
    where
        S: DocumentStore + IndexStore,
    {
        let mut seen_ids = HashSet::new();
        let mut ids = Vec::new();
        for term in terms {
            for id in store.lookup_term(term)? {
                if seen_ids.insert(id) {
                    ids.push(id);
                }
            }
        }

        let mut seen_hrefs = HashSet::new();
        let mut candidates = Vec::new();

        for id in ids {
            match store.document_at(id)? {
                Some(document) => {
                    if seen_hrefs.insert(document.href.clone()) {
                        candidates.push(document);
                    }
                }
                None => tracing::debug!("Index refers to missing document {}", id),
            }
        }

        for term in terms {
            for document in store.search_documents(term)? {
                if seen_hrefs.insert(document.href.clone()) {
                    candidates.push(document);
                }
            }
        }

        Ok(candidates)
    }

    /// Scores and orders candidates for the given query terms
    ///
    /// Candidates are ranked by mean similarity (ties keep candidate order).
    /// The candidate at rank `r` of `n` gains `(n - r) * boost` on its stored
    /// weight, and the result is sorted by that final weight.
    pub fn rank(&self, terms: &[String], candidates: Vec<Document>) -> RankOutcome {
        if candidates.is_empty() || terms.is_empty() {
            return RankOutcome::NoSignal;
        }

        let texts: Vec<Vec<String>> = candidates
            .iter()
            .map(|document| self.tokenizer.terms(&document.text()))
            .collect();

        let model = match TfIdfModel::fit(&texts) {
            Some(model) => model,
            None => return RankOutcome::NoSignal,
        };

        let mut similarity = vec![0.0; candidates.len()];
        for term in terms {
            for (total, score) in similarity
                .iter_mut()
                .zip(model.similarities(std::slice::from_ref(term)))
            {
                *total += score;
            }
        }
        for total in similarity.iter_mut() {
            *total /= terms.len() as f64;
        }

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| similarity[b].total_cmp(&similarity[a]));

        let n = candidates.len();
        let mut boosted = vec![0.0; n];
        for (rank, &index) in order.iter().enumerate() {
            boosted[index] = candidates[index].weight + (n - rank) as f64 * self.boost;
        }

        let mut ranked: Vec<RankedDocument> = candidates
            .into_iter()
            .enumerate()
            .map(|(i, document)| RankedDocument {
                document,
                similarity: similarity[i],
                weight: boosted[i],
            })
            .collect();
        ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight));

        RankOutcome::Ranked(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{PostingBatch, SqliteStorage};

    fn document(href: &str, title: &str, weight: f64) -> Document {
        Document {
            href: href.to_string(),
            title: title.to_string(),
            keywords: String::new(),
            description: String::new(),
            weight,
            netloc: "example.com".to_string(),
            language_tag: "eng".to_string(),
        }
    }

    fn ranker() -> Ranker {
        Ranker::new(Tokenizer::default(), 0.09)
    }

    fn ranked(outcome: RankOutcome) -> Vec<RankedDocument> {
        match outcome {
            RankOutcome::Ranked(documents) => documents,
            other => panic!("expected ranked results, got {:?}", other),
        }
    }

    #[test]
    fn test_higher_similarity_wins_equal_weights() {
        let ranker = ranker();
        let candidates = vec![
            document("https://a.com/", "rust python go java", 0.5),
            document("https://b.com/", "rust rust tokio", 0.5),
        ];

        let results = ranked(ranker.rank(&ranker.query_terms("rust"), candidates));

        assert_eq!(results[0].document.href, "https://b.com/");
        assert!(results[0].similarity > results[1].similarity);
        assert!((results[0].weight - (0.5 + 2.0 * 0.09)).abs() < 1e-9);
        assert!((results[1].weight - (0.5 + 0.09)).abs() < 1e-9);
    }

    #[test]
    fn test_stored_weight_can_outrank_similarity() {
        let ranker = ranker();
        let candidates = vec![
            document("https://weak.com/", "rust rust", 0.1),
            document("https://strong.com/", "rust tokio async runtime", 0.9),
        ];

        let results = ranked(ranker.rank(&ranker.query_terms("rust"), candidates));
        assert_eq!(results[0].document.href, "https://strong.com/");
    }

    #[test]
    fn test_empty_query_status() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert_eq!(ranker().query(&storage, "").unwrap(), RankOutcome::EmptyQuery);
        assert_eq!(ranker().query(&storage, "the of").unwrap(), RankOutcome::EmptyQuery);
    }

    #[test]
    fn test_no_candidates_is_no_signal() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert_eq!(ranker().query(&storage, "rust").unwrap(), RankOutcome::NoSignal);
    }

    #[test]
    fn test_degenerate_vocabulary_is_no_signal() {
        let ranker = ranker();
        let candidates = vec![document("https://a.com/", "the", 0.5)];
        assert_eq!(
            ranker.rank(&["the".to_string()], candidates),
            RankOutcome::NoSignal
        );
    }

    #[test]
    fn test_candidates_merge_index_then_full_text() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .insert_document(&document("https://a.com/", "tokio guide", 0.9))
            .unwrap();
        storage
            .insert_document(&document("https://b.com/", "Rust book", 0.2))
            .unwrap();
        storage
            .insert_document(&document("https://c.com/", "rustacean news", 0.8))
            .unwrap();

        // Index only knows document 1 for "rust"
        let mut postings = PostingBatch::new();
        postings.insert("rust".to_string(), vec![1, 1]);
        storage.append_postings(&postings).unwrap();

        let ranker = ranker();
        let terms = ranker.query_terms("rust");
        let hrefs: Vec<String> = ranker
            .candidates(&storage, &terms)
            .unwrap()
            .into_iter()
            .map(|d| d.href)
            .collect();

        assert_eq!(hrefs, vec!["https://b.com/", "https://c.com/"]);
    }

    #[test]
    fn test_query_ranks_store_contents() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .insert_document(&document("https://a.com/", "搜索引擎", 0.5))
            .unwrap();
        storage
            .insert_document(&document("https://b.com/", "引擎维修", 0.5))
            .unwrap();

        let results = ranked(ranker().query(&storage, "搜索").unwrap());

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.href, "https://a.com/");
    }

    #[test]
    fn test_han_query_ignores_documents_sharing_one_char() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        for (href, title) in [
            ("https://a.com/", "中国新闻"),
            ("https://b.com/", "美国天气"),
            ("https://c.com/", "中午吃饭"),
        ] {
            storage
                .insert_document(&document(href, title, 0.5))
                .unwrap();
        }

        assert_eq!(ranker().query_terms("中国"), vec!["中国"]);
        let results = ranked(ranker().query(&storage, "中国").unwrap());

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.href, "https://a.com/");
    }
}
