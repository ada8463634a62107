//! Crawler coordinator - main crawl orchestration logic
//!
//! One [`Coordinator`] drives one crawl job: a strictly sequential breadth-first
//! traversal from the job's seed. Jobs share nothing but the database file.

use crate::config::{Config, DepthOverflowPolicy, JobEntry};
use crate::crawler::admission::{jittered_delay, AdmissionControl};
use crate::crawler::checkpoint::{clear_job_state, load_checkpoint, save_checkpoint, Checkpoint};
use crate::crawler::fetcher::{build_http_client, fetch_page, fetch_page_metadata, PageOutcome};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::weight::{blend_weight, NEUTRAL_WEIGHT};
use crate::dedup::{BloomFilter, Deduplicator};
use crate::robots::RobotsGate;
use crate::storage::{Document, DocumentStore, SqliteStorage};
use crate::url::{extract_netloc, extract_origin, normalize_link, NoIndexList};
use crate::{SeekError, UrlError};
use reqwest::Client;
use std::path::Path;
use std::time::{Duration, Instant};
use url::Url;

/// Summary of one finished crawl job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlReport {
    pub job: String,
    /// URLs fetched for their links
    pub visited: u64,
    /// New documents written to the store
    pub stored: u64,
    pub disallowed: u64,
    pub failed: u64,
    /// The traversal stopped at an entry deeper than the target depth
    pub depth_terminated: bool,
    pub frontier_remaining: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    job_name: String,
    seed_origin: String,
    max_depth: u32,
    depth_policy: DepthOverflowPolicy,
    delay_ms: (u64, u64),
    storage: SqliteStorage,
    client: Client,
    robots: RobotsGate,
    dedup: Deduplicator,
    frontier: Frontier,
    admission: AdmissionControl,
    no_index: NoIndexList,
}

impl Coordinator {
    /// Creates a coordinator for `job`, opening the configured database
    ///
    /// With `fresh`, the job's checkpoint and filter slots are deleted first.
    /// Otherwise a checkpoint with a non-empty frontier is resumed, and failing
    /// that the traversal restarts from the seed with the job's saved filter.
    pub fn new(config: &Config, job: &JobEntry, fresh: bool) -> Result<Self, SeekError> {
        let storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;
        Self::with_storage(config, job, storage, fresh)
    }

    /// Like [`new`](Self::new) with an already opened store
    pub fn with_storage(
        config: &Config,
        job: &JobEntry,
        mut storage: SqliteStorage,
        fresh: bool,
    ) -> Result<Self, SeekError> {
        let seed = Url::parse(&job.seed)?;
        let seed_origin = extract_origin(&seed).ok_or(UrlError::MissingDomain)?;

        if fresh {
            tracing::info!("Clearing saved state for job {}", job.name);
            clear_job_state(&mut storage, &job.name)?;
        }

        let restored = load_checkpoint(&storage, &job.name).and_then(|checkpoint| {
            let filter = BloomFilter::from_state(checkpoint.filter);
            if filter.is_none() {
                tracing::warn!("Checkpoint filter for job {} is inconsistent, ignoring it", job.name);
            }
            filter.map(|filter| (checkpoint.frontier, filter))
        });

        let (frontier, dedup) = match restored {
            Some((entries, filter)) => {
                tracing::info!(
                    "Resuming job {} with {} queued URLs",
                    job.name,
                    entries.len()
                );
                (
                    Frontier::from_entries(entries),
                    Deduplicator::new(&job.name, filter),
                )
            }
            None => {
                tracing::info!("Starting job {} from {}", job.name, job.seed);
                (
                    Frontier::seeded(seed.as_str()),
                    Deduplicator::load(&storage, &job.name, &config.dedup)?,
                )
            }
        };

        let crawler = &config.crawler;
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(crawler.request_timeout_secs),
        )?;
        let robots = RobotsGate::new(
            client.clone(),
            &config.user_agent.crawler_name,
            Duration::from_secs(crawler.robots_timeout_secs),
        );

        Ok(Self {
            job_name: job.name.clone(),
            seed_origin,
            max_depth: job.max_depth.unwrap_or(crawler.max_depth),
            depth_policy: crawler.depth_overflow,
            delay_ms: (crawler.delay_min_ms, crawler.delay_max_ms),
            storage,
            client,
            robots,
            dedup,
            frontier,
            admission: AdmissionControl::new(
                crawler.min_available_memory_percent,
                Duration::from_millis(crawler.memory_poll_interval_ms),
            ),
            no_index: NoIndexList::new(&config.no_index),
        })
    }

    /// Replaces the memory admission check
    pub fn with_admission(mut self, admission: AdmissionControl) -> Self {
        self.admission = admission;
        self
    }

    /// Runs the traversal until the frontier is empty or depth overflow ends it
    ///
    /// Per-URL failures are logged and the URL is dropped; they never end the run.
    pub async fn run(&mut self) -> Result<CrawlReport, SeekError> {
        tracing::info!(
            "Crawling job {} (target depth {}, {} queued)",
            self.job_name,
            self.max_depth,
            self.frontier.len()
        );

        let mut report = CrawlReport {
            job: self.job_name.clone(),
            ..CrawlReport::default()
        };
        let start_time = Instant::now();

        while let Some(entry) = self.frontier.pop() {
            if !self.robots.can_crawl(&entry.url).await {
                tracing::warn!("URL {} disallowed by robots.txt", entry.url);
                report.disallowed += 1;
                continue;
            }

            if entry.depth > self.max_depth {
                match self.depth_policy {
                    DepthOverflowPolicy::Terminate => {
                        tracing::info!(
                            "Depth {} exceeds target {} at {}, ending job {}",
                            entry.depth,
                            self.max_depth,
                            entry.url,
                            self.job_name
                        );
                        report.depth_terminated = true;
                        break;
                    }
                    DepthOverflowPolicy::SkipBranch => {
                        tracing::debug!("Skipping {} at depth {}", entry.url, entry.depth);
                        continue;
                    }
                }
            }

            if self.dedup.contains(&entry.url) {
                tracing::trace!("Already visited {}", entry.url);
                continue;
            }

            self.admission.wait_for_capacity().await;

            self.dedup.add(&entry.url, &mut self.storage);
            tracing::debug!("Depth {}, visiting {}", entry.depth, entry.url);
            self.visit(&entry, &mut report).await;
            self.write_checkpoint();

            report.visited += 1;
            if report.visited % 10 == 0 {
                let rate = report.visited as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Job {}: {} pages visited, {} stored, {} in frontier, {:.2} pages/sec",
                    self.job_name,
                    report.visited,
                    report.stored,
                    self.frontier.len(),
                    rate
                );
            }

            jittered_delay(self.delay_ms.0, self.delay_ms.1).await;
        }

        report.frontier_remaining = self.frontier.len();
        tracing::info!(
            "Job {} finished: {} visited, {} stored in {:?}",
            self.job_name,
            report.visited,
            report.stored,
            start_time.elapsed()
        );

        Ok(report)
    }

    /// Fetches one page, queues its links and stores the new ones
    async fn visit(&mut self, entry: &FrontierEntry, report: &mut CrawlReport) {
        let page = match fetch_page(&self.client, &entry.url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", entry.url, e);
                report.failed += 1;
                return;
            }
        };

        let parent_weight = match self.storage.get_document(&entry.url) {
            Ok(Some(parent)) => parent.weight,
            Ok(None) => NEUTRAL_WEIGHT,
            Err(e) => {
                tracing::error!("Failed to read {} from store: {}", entry.url, e);
                NEUTRAL_WEIGHT
            }
        };

        for raw in &page.links {
            let link = match normalize_link(raw, &self.seed_origin) {
                Some(link) => link,
                None => continue,
            };

            if !self.frontier.push(&link, entry.depth + 1) {
                continue;
            }

            if !self.is_new_document(&link, &entry.url) {
                continue;
            }

            if !self.robots.can_crawl(&link).await {
                tracing::debug!("Not storing {}: disallowed by robots.txt", link);
                continue;
            }

            if self.store_link(&link, parent_weight).await {
                report.stored += 1;
            }
        }
    }

    /// A link is stored only once, and never for the page it was found on
    fn is_new_document(&self, link: &str, current: &str) -> bool {
        if link == current || self.dedup.contains(link) || self.no_index.excludes(link) {
            return false;
        }
        match self.storage.has_document(link) {
            Ok(known) => !known,
            Err(e) => {
                tracing::error!("Failed to look up {}: {}", link, e);
                false
            }
        }
    }

    async fn store_link(&mut self, link: &str, parent_weight: f64) -> bool {
        let meta = match fetch_page_metadata(&self.client, link).await {
            PageOutcome::Page(meta) => meta,
            PageOutcome::NoContent => {
                tracing::info!("Title of {} is empty, not storing it", link);
                return false;
            }
            PageOutcome::Unavailable(e) => {
                tracing::warn!("Failed to fetch metadata for {}: {}", link, e);
                return false;
            }
        };

        let netloc = Url::parse(link)
            .ok()
            .as_ref()
            .and_then(extract_netloc)
            .unwrap_or_default();

        let document = Document {
            href: meta.href,
            title: meta.title,
            keywords: meta.keywords,
            description: meta.description,
            weight: blend_weight(meta.seed_weight, parent_weight),
            netloc,
            language_tag: meta.language_tag,
        };

        match self.storage.insert_document(&document) {
            Ok(inserted) => inserted,
            Err(e) => {
                tracing::error!("Failed to store {}: {}", link, e);
                false
            }
        }
    }

    fn write_checkpoint(&mut self) {
        let checkpoint = Checkpoint::new(self.frontier.entries(), self.dedup.filter().to_state());
        if let Err(e) = save_checkpoint(&mut self.storage, &self.job_name, &checkpoint) {
            tracing::error!("Failed to checkpoint job {}: {}", self.job_name, e);
        }
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }
}

/// Runs a single crawl job to completion
///
/// # Example
///
/// ```no_run
/// use sumi_seek::config::load_config;
/// use sumi_seek::crawler::run_job;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = run_job(&config, "https://zh.wikipedia.org", "wiki", 2).await?;
/// println!("visited {} pages", report.visited);
/// # Ok(())
/// # }
/// ```
pub async fn run_job(
    config: &Config,
    seed_url: &str,
    job_name: &str,
    max_depth: u32,
) -> Result<CrawlReport, SeekError> {
    let job = JobEntry {
        name: job_name.to_string(),
        seed: seed_url.to_string(),
        max_depth: Some(max_depth),
    };
    let mut coordinator = Coordinator::new(config, &job, false)?;
    coordinator.run().await
}

/// Runs configured jobs concurrently, one task and one connection each
///
/// `only` restricts the run to the named job. Results come back in
/// configuration order.
pub async fn run_jobs(
    config: &Config,
    fresh: bool,
    only: Option<&str>,
) -> Vec<(String, Result<CrawlReport, SeekError>)> {
    let mut handles = Vec::new();

    for job in config
        .jobs
        .iter()
        .filter(|job| only.map_or(true, |name| job.name == name))
    {
        let config = config.clone();
        let job = job.clone();
        let name = job.name.clone();

        let handle = tokio::spawn(async move {
            let mut coordinator = Coordinator::new(&config, &job, fresh)?;
            coordinator.run().await
        });
        handles.push((name, handle));
    }

    let mut results = Vec::new();
    for (name, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(SeekError::Job(format!("job {} panicked or was cancelled: {}", name, e))),
        };
        results.push((name, result));
    }
    results
}
