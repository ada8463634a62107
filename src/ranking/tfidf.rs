//! TF-IDF vectors and cosine similarity over a candidate set
//!
//! Term frequencies are raw counts; idf is smoothed as
//! `ln((1 + n) / (1 + df)) + 1`; every vector is L2-normalized, so cosine
//! similarity reduces to a dot product.

use std::collections::HashMap;

type SparseVector = HashMap<usize, f64>;

/// A TF-IDF model fitted on one set of tokenized texts
#[derive(Debug, Clone)]
pub struct TfIdfModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    documents: Vec<SparseVector>,
}

impl TfIdfModel {
    /// Fits the model, or returns `None` if no text yields a single term
    pub fn fit(texts: &[Vec<String>]) -> Option<Self> {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<u64> = Vec::new();

        for terms in texts {
            let mut seen = std::collections::HashSet::new();
            for term in terms {
                let next_id = vocabulary.len();
                let id = *vocabulary.entry(term.clone()).or_insert(next_id);
                if id == document_frequency.len() {
                    document_frequency.push(0);
                }
                if seen.insert(id) {
                    document_frequency[id] += 1;
                }
            }
        }

        if vocabulary.is_empty() {
            return None;
        }

        let n = texts.len() as f64;
        let idf = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let mut model = Self {
            vocabulary,
            idf,
            documents: Vec::new(),
        };
        model.documents = texts.iter().map(|terms| model.vectorize(terms)).collect();
        Some(model)
    }

    /// Cosine similarity of `query` against every fitted text, in fit order
    ///
    /// Query terms outside the vocabulary are ignored; a query with none inside
    /// scores 0 everywhere.
    pub fn similarities(&self, query: &[String]) -> Vec<f64> {
        let query = self.vectorize(query);
        self.documents.iter().map(|doc| dot(&query, doc)).collect()
    }

    fn vectorize(&self, terms: &[String]) -> SparseVector {
        let mut vector = SparseVector::new();
        for term in terms {
            if let Some(&id) = self.vocabulary.get(term) {
                *vector.entry(id).or_insert(0.0) += 1.0;
            }
        }
        for (id, value) in vector.iter_mut() {
            *value *= self.idf[*id];
        }

        let norm = vector.values().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in vector.values_mut() {
                *value /= norm;
            }
        }
        vector
    }
}

fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(id, x)| large.get(id).map(|y| x * y))
        .sum()
}
