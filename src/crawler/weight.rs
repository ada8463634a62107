//! Language detection and authority weight seeding

use std::sync::OnceLock;
use whatlang::{Detector, Lang};

/// Tag stored when no language can be detected
pub const UNDETERMINED: &str = "und";

/// Weight given to Chinese and undetermined pages
pub const NEUTRAL_WEIGHT: f64 = 0.5;

static DETECTOR: OnceLock<Detector> = OnceLock::new();

/// The process-wide detector, built on first use
fn detector() -> &'static Detector {
    DETECTOR.get_or_init(Detector::new)
}

/// Detects the language of `text` as an ISO 639-3 tag plus confidence in [0, 1]
///
/// Undetectable text yields `("und", 0.5)`.
pub fn detect_language(text: &str) -> (String, f64) {
    match detector().detect(text) {
        Some(info) => (info.lang().code().to_string(), info.confidence()),
        None => (UNDETERMINED.to_string(), NEUTRAL_WEIGHT),
    }
}

/// Initial weight of a page from its detected language
///
/// Chinese pages seed at neutral. Any other language seeds low, more so the
/// more confident the detection is.
pub fn seed_weight(language_tag: &str, confidence: f64) -> f64 {
    if language_tag == Lang::Cmn.code() || language_tag == UNDETERMINED {
        return NEUTRAL_WEIGHT;
    }
    if confidence < 0.5 {
        confidence
    } else {
        1.0 - confidence
    }
}

/// Combines a newly discovered page's seed with the weight of the page linking to it
pub fn blend_weight(child_seed: f64, parent_weight: f64) -> f64 {
    if child_seed == NEUTRAL_WEIGHT {
        (child_seed + parent_weight * 1.1) / 2.0
    } else {
        (child_seed + parent_weight * 0.9) / 2.0
    }
}
