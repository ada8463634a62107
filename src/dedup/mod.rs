//! Probabilistic URL deduplication
//!
//! A [`BloomFilter`] answers "has this URL been visited?" with no false negatives.
//! [`Deduplicator`] binds one filter to a crawl job's filter slot and persists the
//! full filter state after every insert.

mod bloom;
mod state;

pub use bloom::{optimal_parameters, BloomFilter};
pub use state::FilterState;

use crate::config::DedupConfig;
use crate::storage::SlotStore;
use thiserror::Error;

/// Invalid bloom filter parameters
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("expected item count must be positive, got {0}")]
    Capacity(u64),

    #[error("false positive rate must be in (0, 1), got {0}")]
    ErrorRate(f64),
}

/// Slot name holding a job's filter state
pub fn filter_slot(job_name: &str) -> String {
    format!("filter:{}", job_name)
}

/// A job-owned bloom filter that writes itself through to its slot
#[derive(Debug, Clone)]
pub struct Deduplicator {
    filter: BloomFilter,
    slot: String,
}

impl Deduplicator {
    /// Wraps an existing filter for `job_name`
    pub fn new(job_name: &str, filter: BloomFilter) -> Self {
        Self {
            filter,
            slot: filter_slot(job_name),
        }
    }

    /// Loads the job's persisted filter, or builds a fresh one from `config`
    ///
    /// A missing, undecodable, or inconsistent slot is logged and replaced with an
    /// empty filter. Only invalid `config` parameters are an error.
    pub fn load<S: SlotStore>(
        store: &S,
        job_name: &str,
        config: &DedupConfig,
    ) -> Result<Self, ConstructionError> {
        let slot = filter_slot(job_name);

        let restored = match store.load_slot(&slot) {
            Ok(Some(payload)) => match serde_json::from_str::<FilterState>(&payload) {
                Ok(state) => {
                    let filter = BloomFilter::from_state(state);
                    if filter.is_none() {
                        tracing::warn!("Filter slot {} is inconsistent, starting fresh", slot);
                    }
                    filter
                }
                Err(e) => {
                    tracing::warn!("Filter slot {} is corrupt ({}), starting fresh", slot, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::error!("Failed to read filter slot {}: {}", slot, e);
                None
            }
        };

        let filter = match restored {
            Some(filter) => {
                tracing::info!(
                    "Restored filter for job {} ({} items)",
                    job_name,
                    filter.item_count()
                );
                filter
            }
            None => BloomFilter::new(config.expected_items, config.false_positive_rate)?,
        };

        Ok(Self { filter, slot })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.filter.contains(key)
    }

    /// Inserts `key` and persists the whole filter
    ///
    /// A persistence failure is logged; the in-memory filter keeps the key.
    pub fn add<S: SlotStore>(&mut self, key: &str, store: &mut S) {
        self.filter.insert(key);
        if let Err(e) = self.persist(store) {
            tracing::error!("Failed to persist filter slot {}: {}", self.slot, e);
        }
    }

    /// Writes the current filter state to the slot
    pub fn persist<S: SlotStore>(&self, store: &mut S) -> Result<(), crate::SeekError> {
        let payload = serde_json::to_string(&self.filter.to_state())
            .map_err(|e| crate::SeekError::Persistence(e.to_string()))?;
        store.save_slot(&self.slot, &payload)?;
        Ok(())
    }

    pub fn filter(&self) -> &BloomFilter {
        &self.filter
    }
}
