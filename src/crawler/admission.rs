//! Request pacing: memory-aware admission and jittered delays

use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MEMINFO: &str = "/proc/meminfo";

/// Pauses new fetches while available system memory is low
///
/// Backpressure is advisory: if memory figures can't be read, fetches proceed.
#[derive(Debug, Clone)]
pub struct AdmissionControl {
    min_available_percent: u8,
    poll_interval: Duration,
    meminfo: PathBuf,
}

impl AdmissionControl {
    /// `min_available_percent == 0` disables the check
    pub fn new(min_available_percent: u8, poll_interval: Duration) -> Self {
        Self {
            min_available_percent,
            poll_interval,
            meminfo: PathBuf::from(MEMINFO),
        }
    }

    /// Reads memory figures from another file in `/proc/meminfo` format
    pub fn with_meminfo(mut self, path: impl Into<PathBuf>) -> Self {
        self.meminfo = path.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.min_available_percent > 0
    }

    /// Current share of available memory in percent, if known
    pub fn available_percent(&self) -> Option<f64> {
        read_available_percent(&self.meminfo)
    }

    /// Whether a new fetch may start now
    pub fn admits(&self) -> bool {
        if !self.is_enabled() {
            return true;
        }
        match self.available_percent() {
            Some(percent) => percent >= f64::from(self.min_available_percent),
            None => true,
        }
    }

    /// Waits until [`admits`](Self::admits) holds, polling at the configured interval
    pub async fn wait_for_capacity(&self) {
        let mut waiting = false;
        while !self.admits() {
            if !waiting {
                tracing::warn!(
                    "Available memory below {}%, pausing fetches",
                    self.min_available_percent
                );
                waiting = true;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
        if waiting {
            tracing::info!("Memory available again, resuming fetches");
        }
    }
}

fn read_available_percent(path: &Path) -> Option<f64> {
    let content = std::fs::read_to_string(path).ok()?;
    parse_meminfo(&content)
}

/// MemAvailable / MemTotal as a percentage
fn parse_meminfo(content: &str) -> Option<f64> {
    let field = |name: &str| -> Option<f64> {
        content
            .lines()
            .find_map(|line| line.strip_prefix(name))
            .and_then(|rest| rest.trim_start_matches(':').split_whitespace().next())
            .and_then(|value| value.parse::<f64>().ok())
    };

    let total = field("MemTotal")?;
    let available = field("MemAvailable")?;
    if total <= 0.0 {
        return None;
    }
    Some(available / total * 100.0)
}

/// Sleeps for a uniformly random duration in `[min_ms, max_ms]`
pub async fn jittered_delay(min_ms: u64, max_ms: u64) {
    let delay = jitter_ms(min_ms, max_ms);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

fn jitter_ms(min_ms: u64, max_ms: u64) -> u64 {
    if max_ms <= min_ms {
        return min_ms;
    }
    rand::thread_rng().gen_range(min_ms..=max_ms)
}
