//! Backlink weight propagation
//!
//! One pass re-fetches every stored document, records which origins link to
//! which targets, then adds to each linked target the mean weight of its
//! referring origins. A pass is a single additive update. Running it again
//! adds again; there is no convergence loop.

use crate::crawler::fetch_page;
use crate::storage::DocumentStore;
use crate::SeekError;
use reqwest::Client;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// Target href -> distinct netlocs of the documents linking to it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacklinkMap {
    referrers: BTreeMap<String, BTreeSet<String>>,
}

impl BacklinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a page on `source_netloc` links to `target`
    pub fn record(&mut self, source_netloc: &str, target: &str) {
        self.referrers
            .entry(target.to_string())
            .or_default()
            .insert(source_netloc.to_string());
    }

    pub fn referrers(&self, target: &str) -> Option<&BTreeSet<String>> {
        self.referrers.get(target)
    }

    pub fn targets(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.referrers.iter()
    }

    pub fn len(&self) -> usize {
        self.referrers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.referrers.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropagationReport {
    pub documents_scanned: u64,
    pub fetch_failures: u64,
    /// Stored documents whose weight was increased
    pub targets_updated: u64,
    pub total_increment: f64,
}

/// Absolute http(s) links of a page, in the form documents are stored under
fn absolute_links(raw_links: &[String]) -> Vec<String> {
    raw_links
        .iter()
        .filter_map(|raw| Url::parse(raw.trim()).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .map(|mut url| {
            url.set_fragment(None);
            url.to_string()
        })
        .collect()
}

/// Re-fetches every stored document and maps its outbound links
pub async fn collect_backlinks<S: DocumentStore>(
    client: &Client,
    store: &S,
    report: &mut PropagationReport,
) -> Result<BacklinkMap, SeekError> {
    let mut map = BacklinkMap::new();

    for document in store.all_documents()? {
        report.documents_scanned += 1;
        let page = match fetch_page(client, &document.href).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to re-fetch {}: {}", document.href, e);
                report.fetch_failures += 1;
                continue;
            }
        };

        for target in absolute_links(&page.links) {
            map.record(&document.netloc, &target);
        }
    }

    Ok(map)
}

/// Adds each target's referrer contribution to its stored weight
///
/// Every referrer origin is represented by its earliest stored document.
/// All representative weights are read before any weight is written, so the
/// order of targets does not affect the result.
pub fn apply_backlinks<S: DocumentStore>(
    store: &mut S,
    map: &BacklinkMap,
    report: &mut PropagationReport,
) -> Result<(), SeekError> {
    let mut representative: BTreeMap<&str, Option<f64>> = BTreeMap::new();
    for (_, netlocs) in map.targets() {
        for netloc in netlocs {
            if !representative.contains_key(netloc.as_str()) {
                let weight = store
                    .first_document_for_netloc(netloc)?
                    .map(|document| document.weight);
                representative.insert(netloc.as_str(), weight);
            }
        }
    }

    let mut updates = Vec::new();
    for (target, netlocs) in map.targets() {
        if netlocs.is_empty() {
            continue;
        }
        let sum: f64 = netlocs
            .iter()
            .filter_map(|netloc| representative.get(netloc.as_str()).copied().flatten())
            .sum();
        updates.push((target, sum / netlocs.len() as f64));
    }

    for (target, contribution) in updates {
        if store.add_weight(target, contribution)? {
            tracing::debug!("{} += {:.4}", target, contribution);
            report.targets_updated += 1;
            report.total_increment += contribution;
        }
    }

    Ok(())
}

/// Runs one full propagation pass
pub async fn propagate<S: DocumentStore>(
    client: &Client,
    store: &mut S,
) -> Result<PropagationReport, SeekError> {
    let mut report = PropagationReport::default();
    let map = collect_backlinks(client, store, &mut report).await?;
    tracing::info!(
        "Collected backlinks for {} targets from {} documents",
        map.len(),
        report.documents_scanned
    );
    apply_backlinks(store, &map, &mut report)?;
    tracing::info!(
        "Backlink pass updated {} documents (total +{:.4})",
        report.targets_updated,
        report.total_increment
    );
    Ok(report)
}
