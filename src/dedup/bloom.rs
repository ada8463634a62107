//! Seeded bloom filter for visited-URL membership.

use crate::dedup::state::FilterState;
use crate::dedup::ConstructionError;
use std::f64::consts::LN_2;
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Bloom filter sized from an expected item count and a target false-positive rate.
///
/// Hash function `i` is xxh3 seeded with `i` for `i` in `1..=k`. There is no removal.
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilter {
    words: Vec<u64>,
    bit_count: u64,
    hash_count: u32,
    seeds: Vec<u64>,
    item_count: u64,
}

impl BloomFilter {
    /// Creates an empty filter for `expected_items` at `false_positive_rate`
    ///
    /// # Errors
    ///
    /// * `ConstructionError::Capacity` - `expected_items` is zero
    /// * `ConstructionError::ErrorRate` - the rate is outside `(0, 1)`
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_seek::dedup::BloomFilter;
    ///
    /// let mut filter = BloomFilter::new(1000, 0.001).unwrap();
    /// filter.insert("https://example.com/");
    /// assert!(filter.contains("https://example.com/"));
    /// ```
    pub fn new(expected_items: u64, false_positive_rate: f64) -> Result<Self, ConstructionError> {
        let (bit_count, hash_count) = optimal_parameters(expected_items, false_positive_rate)?;
        let word_count = words_for(bit_count);

        Ok(Self {
            words: vec![0u64; word_count],
            bit_count,
            hash_count,
            seeds: (1..=hash_count as u64).collect(),
            item_count: 0,
        })
    }

    /// Sets the `k` bits for `key` and bumps the item counter
    pub fn insert(&mut self, key: &str) {
        for position in self.positions(key).collect::<Vec<_>>() {
            self.words[(position / 64) as usize] |= 1u64 << (position % 64);
        }
        self.item_count += 1;
    }

    /// True only if all `k` bit positions for `key` are set
    pub fn contains(&self, key: &str) -> bool {
        self.positions(key)
            .all(|position| self.words[(position / 64) as usize] & (1u64 << (position % 64)) != 0)
    }

    pub fn bit_count(&self) -> u64 {
        self.bit_count
    }

    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Theoretical false-positive rate at the current item count
    pub fn estimated_false_positive_rate(&self) -> f64 {
        let k = self.hash_count as f64;
        let exponent = -k * self.item_count as f64 / self.bit_count as f64;
        (1.0 - exponent.exp()).powf(k)
    }

    /// Snapshot of every field, suitable for a persisted slot
    pub fn to_state(&self) -> FilterState {
        FilterState {
            version: FilterState::CURRENT_VERSION,
            words: self.words.clone(),
            bit_count: self.bit_count,
            hash_count: self.hash_count,
            seeds: self.seeds.clone(),
            item_count: self.item_count,
        }
    }

    /// Rebuilds a filter from a snapshot, or `None` if the snapshot is inconsistent
    pub fn from_state(state: FilterState) -> Option<Self> {
        let consistent = state.version == FilterState::CURRENT_VERSION
            && state.bit_count > 0
            && state.hash_count > 0
            && state.seeds.len() == state.hash_count as usize
            && state.words.len() == words_for(state.bit_count);

        consistent.then(|| Self {
            words: state.words,
            bit_count: state.bit_count,
            hash_count: state.hash_count,
            seeds: state.seeds,
            item_count: state.item_count,
        })
    }

    fn positions<'a>(&'a self, key: &'a str) -> impl Iterator<Item = u64> + 'a {
        self.seeds
            .iter()
            .map(move |&seed| xxh3_64_with_seed(key.as_bytes(), seed) % self.bit_count)
    }
}

/// Derives `m = ceil(-n·ln(p) / ln(2)²)` and `k = round((m/n)·ln 2)`
pub fn optimal_parameters(
    expected_items: u64,
    false_positive_rate: f64,
) -> Result<(u64, u32), ConstructionError> {
    if expected_items == 0 {
        return Err(ConstructionError::Capacity(expected_items));
    }
    if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
        return Err(ConstructionError::ErrorRate(false_positive_rate));
    }

    let n = expected_items as f64;
    let bits = (-n * false_positive_rate.ln() / (LN_2 * LN_2)).ceil().max(1.0);
    let hashes = ((bits / n) * LN_2).round().max(1.0);

    Ok((bits as u64, hashes as u32))
}

fn words_for(bit_count: u64) -> usize {
    bit_count.div_ceil(64) as usize
}
