//! Output module for command-line reports
//!
//! This module handles:
//! - Corpus statistics for the `--stats` mode
//! - Printing ranked query results

mod results;
pub mod stats;

pub use results::print_rank_outcome;
pub use stats::{load_statistics, print_statistics, CorpusStats};
