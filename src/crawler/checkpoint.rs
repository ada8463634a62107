//! Versioned crawl checkpoints
//!
//! A checkpoint holds the remaining frontier and the dedup filter of one job.
//! It is written synchronously after every processed URL.

use crate::crawler::frontier::FrontierEntry;
use crate::dedup::{filter_slot, FilterState};
use crate::storage::SlotStore;
use crate::SeekError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub frontier: Vec<FrontierEntry>,
    pub filter: FilterState,
}

impl Checkpoint {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(frontier: Vec<FrontierEntry>, filter: FilterState) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            frontier,
            filter,
        }
    }
}

/// Slot name holding a job's checkpoint
pub fn checkpoint_slot(job_name: &str) -> String {
    format!("checkpoint:{}", job_name)
}

/// Loads a job's checkpoint
///
/// Returns `None` when the slot is absent, unreadable, undecodable, of another
/// version, or holds an empty frontier.
pub fn load_checkpoint<S: SlotStore>(store: &S, job_name: &str) -> Option<Checkpoint> {
    let slot = checkpoint_slot(job_name);

    let payload = match store.load_slot(&slot) {
        Ok(Some(payload)) => payload,
        Ok(None) => return None,
        Err(e) => {
            tracing::error!("Failed to read checkpoint slot {}: {}", slot, e);
            return None;
        }
    };

    let checkpoint: Checkpoint = match serde_json::from_str(&payload) {
        Ok(checkpoint) => checkpoint,
        Err(e) => {
            tracing::warn!("Checkpoint {} is corrupt ({}), ignoring it", slot, e);
            return None;
        }
    };

    if checkpoint.version != Checkpoint::CURRENT_VERSION {
        tracing::warn!(
            "Checkpoint {} has version {} (expected {}), ignoring it",
            slot,
            checkpoint.version,
            Checkpoint::CURRENT_VERSION
        );
        return None;
    }

    if checkpoint.frontier.is_empty() {
        return None;
    }

    Some(checkpoint)
}

pub fn save_checkpoint<S: SlotStore>(
    store: &mut S,
    job_name: &str,
    checkpoint: &Checkpoint,
) -> Result<(), SeekError> {
    let payload = serde_json::to_string(checkpoint)
        .map_err(|e| SeekError::Persistence(e.to_string()))?;
    store.save_slot(&checkpoint_slot(job_name), &payload)?;
    Ok(())
}

/// Deletes a job's checkpoint and filter slots
pub fn clear_job_state<S: SlotStore>(store: &mut S, job_name: &str) -> Result<(), SeekError> {
    store.delete_slot(&checkpoint_slot(job_name))?;
    store.delete_slot(&filter_slot(job_name))?;
    Ok(())
}
