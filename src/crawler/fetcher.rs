//! HTTP fetcher implementation
//!
//! Every request is a single attempt with the client's timeout. Failures are
//! returned as values so callers can log and drop the URL.

use crate::config::UserAgentConfig;
use crate::crawler::parser::{parse_html, ParsedPage};
use crate::crawler::weight::{detect_language, seed_weight};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// HTTP 200 with a readable body
    Success {
        /// Final URL after redirects
        final_url: String,
        body: String,
    },

    /// Any status other than 200
    HttpError { status_code: u16 },

    /// Timeout, connection failure, or unreadable body
    NetworkError { error: String },
}

/// Metadata of a page that is worth storing
#[derive(Debug, Clone, PartialEq)]
pub struct PageMetadata {
    pub href: String,
    pub title: String,
    pub keywords: String,
    pub description: String,
    pub language_tag: String,
    /// Authority seed derived from language detection
    pub seed_weight: f64,
}

/// What fetching a candidate document produced
#[derive(Debug)]
pub enum PageOutcome {
    Page(PageMetadata),
    /// Fetched, but the title is blank
    NoContent,
    Unavailable(String),
}

/// Builds an HTTP client with proper configuration
///
/// The user agent is formatted as `CrawlerName/Version (+ContactURL; ContactEmail)`.
///
/// # Example
///
/// ```no_run
/// use sumi_seek::config::UserAgentConfig;
/// use sumi_seek::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "SumiSeek".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(4)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => FetchResult::Success { final_url, body },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

/// Fetches and parses a page, or describes why it could not be
pub async fn fetch_page(client: &Client, url: &str) -> Result<ParsedPage, String> {
    match fetch_url(client, url).await {
        FetchResult::Success { body, .. } => Ok(parse_html(&body)),
        FetchResult::HttpError { status_code } => Err(format!("HTTP {}", status_code)),
        FetchResult::NetworkError { error } => Err(error),
    }
}

/// Fetches a candidate document and derives its stored metadata
pub async fn fetch_page_metadata(client: &Client, url: &str) -> PageOutcome {
    let parsed = match fetch_page(client, url).await {
        Ok(parsed) => parsed,
        Err(e) => return PageOutcome::Unavailable(e),
    };

    let title = match parsed.title {
        Some(title) => title,
        None => return PageOutcome::NoContent,
    };

    let text = format!("{} {} {}", title, parsed.keywords, parsed.description);
    let (language_tag, confidence) = detect_language(&text);
    let seed_weight = seed_weight(&language_tag, confidence);

    PageOutcome::Page(PageMetadata {
        href: url.to_string(),
        title,
        keywords: parsed.keywords,
        description: parsed.description,
        language_tag,
        seed_weight,
    })
}
