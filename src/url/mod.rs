//! URL handling module for Sumi-Seek
//!
//! This module provides origin extraction, link normalization against a crawl
//! seed, and the wildcard domain matching used by `[[no-index]]` entries.

mod domain;
mod normalize;

pub use domain::{extract_origin, extract_netloc, matches_wildcard, NoIndexList};
pub use normalize::{normalize_link, salvage_embedded_link};
