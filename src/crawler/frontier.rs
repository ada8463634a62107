//! Breadth-first crawl frontier

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// A URL waiting to be visited, with its distance from the seed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: u32,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// FIFO queue of frontier entries
///
/// A URL is queued at most once per frontier lifetime; the set of URLs ever
/// pushed is rebuilt from the entries when a frontier is restored.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    seen: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A frontier holding just the seed at depth 0
    pub fn seeded(seed: &str) -> Self {
        let mut frontier = Self::new();
        frontier.push(seed, 0);
        frontier
    }

    /// Restores a frontier from checkpointed entries, keeping their order
    pub fn from_entries(entries: Vec<FrontierEntry>) -> Self {
        let seen = entries.iter().map(|e| e.url.clone()).collect();
        Self {
            queue: entries.into(),
            seen,
        }
    }

    /// Queues `url` at `depth`; returns `false` if it was already queued
    pub fn push(&mut self, url: &str, depth: u32) -> bool {
        if !self.seen.insert(url.to_string()) {
            return false;
        }
        self.queue.push_back(FrontierEntry::new(url, depth));
        true
    }

    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Remaining entries in visit order
    pub fn entries(&self) -> Vec<FrontierEntry> {
        self.queue.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::seeded("https://a.com/");
        frontier.push("https://a.com/1", 1);
        frontier.push("https://a.com/2", 1);

        assert_eq!(frontier.pop().unwrap(), FrontierEntry::new("https://a.com/", 0));
        assert_eq!(frontier.pop().unwrap().url, "https://a.com/1");
        assert_eq!(frontier.pop().unwrap().url, "https://a.com/2");
        assert!(frontier.pop().is_none());
    }

    #[test]
    fn test_push_ignores_known_urls() {
        let mut frontier = Frontier::seeded("https://a.com/");
        assert!(!frontier.push("https://a.com/", 3));
        frontier.pop();
        // Still remembered after being popped
        assert!(!frontier.push("https://a.com/", 1));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_restore_from_entries() {
        let entries = vec![
            FrontierEntry::new("https://a.com/x", 2),
            FrontierEntry::new("https://a.com/y", 3),
        ];
        let mut frontier = Frontier::from_entries(entries.clone());

        assert_eq!(frontier.entries(), entries);
        assert!(!frontier.push("https://a.com/y", 1));
        assert_eq!(frontier.len(), 2);
    }
}
