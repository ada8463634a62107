//! Per-origin robots rule cache
//!
//! Entries live for the lifetime of the gate. There is no expiry.

use crate::robots::RobotsRuleSet;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Rules for one origin and when they were fetched
#[derive(Debug, Clone)]
pub struct CachedRobots {
    pub rules: RobotsRuleSet,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    pub fn new(rules: RobotsRuleSet) -> Self {
        Self {
            rules,
            fetched_at: Utc::now(),
        }
    }
}

/// Origin -> cached rules
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: HashMap<String, CachedRobots>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, origin: &str) -> Option<&CachedRobots> {
        self.entries.get(origin)
    }

    pub fn insert(&mut self, origin: String, rules: RobotsRuleSet) -> &CachedRobots {
        self.entries
            .entry(origin)
            .and_modify(|cached| *cached = CachedRobots::new(rules.clone()))
            .or_insert_with(|| CachedRobots::new(rules))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
