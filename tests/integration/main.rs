//! End-to-end tests against mock HTTP servers and on-disk databases

mod common;
mod crawl_tests;
mod search_tests;
