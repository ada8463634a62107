use crate::config::DomainEntry;
use url::Url;

/// Returns `scheme://host[:port]` for a URL
///
/// Default ports are omitted, matching how `Url` serializes them.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_seek::url::extract_origin;
///
/// let url = Url::parse("https://Example.com:8443/wiki/Rust?x=1").unwrap();
/// assert_eq!(extract_origin(&url), Some("https://example.com:8443".to_string()));
/// ```
pub fn extract_origin(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Returns the `host[:port]` part of a URL, the netloc stored on documents
pub fn extract_netloc(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Checks a lowercase host against a domain pattern
///
/// `"example.com"` matches only itself. `"*.example.com"` matches the bare
/// domain and every subdomain beneath it.
pub fn matches_wildcard(pattern: &str, host: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            host == base
                || host
                    .strip_suffix(base)
                    .map(|prefix| prefix.ends_with('.'))
                    .unwrap_or(false)
        }
        None => host == pattern,
    }
}

/// Hosts that are traversed but never stored as documents
#[derive(Debug, Clone, Default)]
pub struct NoIndexList {
    patterns: Vec<String>,
}

impl NoIndexList {
    pub fn new(entries: &[DomainEntry]) -> Self {
        Self {
            patterns: entries.iter().map(|e| e.domain.to_lowercase()).collect(),
        }
    }

    /// True if `url`'s host matches any pattern; unparseable links count as excluded
    pub fn excludes(&self, url: &str) -> bool {
        let host = match Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_lowercase)) {
            Some(host) => host,
            None => return true,
        };
        self.patterns.iter().any(|p| matches_wildcard(p, &host))
    }
}
