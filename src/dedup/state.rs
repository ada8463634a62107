use serde::{Deserialize, Serialize};

/// Persisted form of a bloom filter
///
/// Stored as JSON in the job's filter slot and embedded in every checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub version: u32,
    /// Bit array packed into 64-bit words, least significant bit first
    pub words: Vec<u64>,
    pub bit_count: u64,
    pub hash_count: u32,
    pub seeds: Vec<u64>,
    pub item_count: u64,
}

impl FilterState {
    pub const CURRENT_VERSION: u32 = 1;
}
