use url::Url;

/// Link prefixes that never lead to a crawlable page
const SKIPPED_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:", "#"];

/// Turns a raw anchor `href` into an absolute crawl target
///
/// # Rules
///
/// 1. Fragment-only and `javascript:`/`mailto:`/`tel:`/`data:` links are dropped
/// 2. `//host/path` takes the seed's scheme
/// 3. `/path` is joined onto the seed origin
/// 4. A link carrying a second embedded `http(s)://` is cut down to that
///    embedded URL (see [`salvage_embedded_link`])
/// 5. The result must parse as an `http` or `https` URL with a host
/// 6. Any `#fragment` is removed
///
/// Other relative forms (`page.html`, `../x`) are dropped, as are non-HTTP schemes.
///
/// # Examples
///
/// ```
/// use sumi_seek::url::normalize_link;
///
/// let seed = "https://example.com";
/// assert_eq!(
///     normalize_link("/wiki/Rust", seed),
///     Some("https://example.com/wiki/Rust".to_string())
/// );
/// assert_eq!(normalize_link("mailto:me@example.com", seed), None);
/// ```
pub fn normalize_link(raw: &str, seed_origin: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let lower = raw.to_ascii_lowercase();
    if SKIPPED_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return None;
    }

    let seed_origin = seed_origin.trim_end_matches('/');
    let joined = if let Some(rest) = raw.strip_prefix("//") {
        let scheme = seed_origin.split("://").next().unwrap_or("https");
        format!("{}://{}", scheme, rest)
    } else if raw.starts_with('/') {
        format!("{}{}", seed_origin, raw)
    } else {
        raw.to_string()
    };

    let candidate = salvage_embedded_link(&joined).unwrap_or(joined);

    let mut url = Url::parse(&candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    url.set_fragment(None);

    Some(url.to_string())
}

/// Extracts the URL embedded after a link's leading scheme
///
/// Some pages emit hrefs such as `https://a.com/https://b.com/x`. When a second
/// `http://` or `https://` token follows the first, the link is cut to start at
/// that token and run up to the next one. Returns `None` when nothing is embedded.
pub fn salvage_embedded_link(link: &str) -> Option<String> {
    let starts = scheme_positions(link);
    let start = *starts.get(1)?;
    let end = starts.get(2).copied().unwrap_or(link.len());
    Some(link[start..end].to_string())
}

/// Byte offsets of every `http://` or `https://` token in `link`
fn scheme_positions(link: &str) -> Vec<usize> {
    let lower = link.to_ascii_lowercase();
    lower
        .match_indices("http")
        .map(|(i, _)| i)
        .filter(|&i| {
            let rest = &lower[i + 4..];
            rest.starts_with("://") || rest.starts_with("s://")
        })
        .collect()
}
