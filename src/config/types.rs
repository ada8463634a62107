use serde::Deserialize;

/// Main configuration structure for Sumi-Seek
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default, rename = "job")]
    pub jobs: Vec<JobEntry>,
    #[serde(default, rename = "no-index")]
    pub no_index: Vec<DomainEntry>,
}

/// What the traversal does when it dequeues an entry deeper than the target depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepthOverflowPolicy {
    /// Stop the whole traversal at the first over-deep entry
    #[default]
    Terminate,
    /// Drop only the over-deep entry and keep draining the frontier
    SkipBranch,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Default target depth for jobs that don't override it
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    #[serde(rename = "depth-overflow", default)]
    pub depth_overflow: DepthOverflowPolicy,

    /// Page fetch timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// robots.txt fetch timeout (seconds)
    #[serde(rename = "robots-timeout-secs", default = "default_robots_timeout")]
    pub robots_timeout_secs: u64,

    /// Lower bound of the jittered delay between frontier pops (milliseconds)
    #[serde(rename = "delay-min-ms", default = "default_delay_min")]
    pub delay_min_ms: u64,

    /// Upper bound of the jittered delay between frontier pops (milliseconds)
    #[serde(rename = "delay-max-ms", default = "default_delay_max")]
    pub delay_max_ms: u64,

    /// Pause new fetches while available memory is below this share; 0 disables
    #[serde(rename = "min-available-memory-percent", default = "default_memory_percent")]
    pub min_available_memory_percent: u8,

    #[serde(rename = "memory-poll-interval-ms", default = "default_memory_poll")]
    pub memory_poll_interval_ms: u64,
}

/// Bloom filter sizing
#[derive(Debug, Clone, Deserialize)]
pub struct DedupConfig {
    #[serde(rename = "expected-items")]
    pub expected_items: u64,

    #[serde(rename = "false-positive-rate")]
    pub false_positive_rate: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            expected_items: 100_000,
            false_positive_rate: 0.001,
        }
    }
}

/// Index builder configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause after each flushed batch (milliseconds)
    #[serde(rename = "batch-pause-ms", default = "default_batch_pause")]
    pub batch_pause_ms: u64,

    /// Extra stop-words on top of the built-in list
    #[serde(rename = "stop-words", default)]
    pub stop_words: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause(),
            stop_words: Vec::new(),
        }
    }
}

/// Ranker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    /// Weight added per rank position above the last candidate
    #[serde(default = "default_boost")]
    pub boost: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            boost: default_boost(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// A crawl job: one seed, one checkpoint slot
#[derive(Debug, Clone, Deserialize)]
pub struct JobEntry {
    /// Job name, used as the checkpoint and filter slot key
    pub name: String,

    /// Seed URL the traversal starts from at depth 0
    pub seed: String,

    /// Overrides `crawler.max-depth` for this job
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,
}

/// Simple domain entry for the no-index list
#[derive(Debug, Clone, Deserialize)]
pub struct DomainEntry {
    /// Domain pattern (e.g., "example.com" or "*.example.com")
    pub domain: String,
}

fn default_request_timeout() -> u64 {
    4
}

fn default_robots_timeout() -> u64 {
    3
}

fn default_delay_min() -> u64 {
    1000
}

fn default_delay_max() -> u64 {
    2000
}

fn default_memory_percent() -> u8 {
    10
}

fn default_memory_poll() -> u64 {
    1000
}

fn default_batch_size() -> usize {
    20
}

fn default_batch_pause() -> u64 {
    2000
}

fn default_boost() -> f64 {
    0.09
}
