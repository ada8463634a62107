//! Robots compliance gate
//!
//! [`RobotsGate::can_crawl`] fetches `<origin>/robots.txt` the first time an
//! origin is seen and caches the applicable rules for the gate's lifetime.
//! Any failure to obtain robots.txt downgrades to "no restrictions".

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::RobotsRuleSet;

use crate::url::extract_origin;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why robots.txt could not be used; always downgraded to allow-all
#[derive(Debug, Error)]
pub enum RobotsFetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),
}

/// Per-origin allow/disallow gate
pub struct RobotsGate {
    client: Client,
    agent: String,
    timeout: Duration,
    cache: RobotsCache,
}

impl RobotsGate {
    /// Creates a gate matching robots groups against `agent` (the crawler name)
    pub fn new(client: Client, agent: &str, timeout: Duration) -> Self {
        Self {
            client,
            agent: agent.to_string(),
            timeout,
            cache: RobotsCache::new(),
        }
    }

    /// Returns whether `url` may be fetched
    ///
    /// URLs without a host are let through; the fetcher rejects them.
    pub async fn can_crawl(&mut self, url: &str) -> bool {
        let origin = match Url::parse(url).ok().as_ref().and_then(extract_origin) {
            Some(origin) => origin,
            None => return true,
        };

        if self.cache.get(&origin).is_none() {
            let rules = match self.fetch_rules(&origin).await {
                Ok(rules) => rules,
                Err(e) => {
                    tracing::debug!("robots.txt unavailable for {} ({}), allowing all", origin, e);
                    RobotsRuleSet::allow_all()
                }
            };
            self.cache.insert(origin.clone(), rules);
        }

        self.cache
            .get(&origin)
            .map(|cached| cached.rules.is_allowed(url, &origin))
            .unwrap_or(true)
    }

    async fn fetch_rules(&self, origin: &str) -> Result<RobotsRuleSet, RobotsFetchError> {
        let robots_url = format!("{}/robots.txt", origin);
        tracing::trace!("Fetching {}", robots_url);

        let response = self
            .client
            .get(&robots_url)
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(RobotsFetchError::Status(response.status()));
        }

        let body = response.text().await?;
        Ok(RobotsRuleSet::parse(&body, &self.agent))
    }

    /// Number of origins with cached rules
    pub fn cached_origins(&self) -> usize {
        self.cache.len()
    }
}
