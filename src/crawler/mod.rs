//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Single-attempt HTTP fetching and metadata extraction
//! - Language detection and authority weight seeding
//! - The breadth-first frontier and its versioned checkpoints
//! - Memory-aware admission and jittered pacing
//! - Per-job crawl coordination

mod admission;
mod checkpoint;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod weight;

pub use admission::{jittered_delay, AdmissionControl};
pub use checkpoint::{checkpoint_slot, clear_job_state, load_checkpoint, save_checkpoint, Checkpoint};
pub use coordinator::{run_job, run_jobs, Coordinator, CrawlReport};
pub use fetcher::{
    build_http_client, fetch_page, fetch_page_metadata, fetch_url, FetchResult, PageMetadata,
    PageOutcome,
};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{parse_html, ParsedPage};
pub use weight::{blend_weight, detect_language, seed_weight, NEUTRAL_WEIGHT, UNDETERMINED};
