//! HTML parser for extracting page metadata and links
//!
//! This module pulls the fields a document is stored with:
//! - `<title>`
//! - `<meta name="keywords">` and `<meta name="description">` content
//! - Raw `<a href>` values, left unresolved for [`crate::url::normalize_link`]

use scraper::{ElementRef, Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    /// Trimmed `<title>` text, `None` when absent or blank
    pub title: Option<String>,

    /// Meta keywords content, empty when absent
    pub keywords: String,

    /// Meta description content, empty when absent
    pub description: String,

    /// Anchor hrefs exactly as written in the page, in document order
    pub links: Vec<String>,
}

/// Parses HTML content and extracts metadata and raw links
///
/// # Example
///
/// ```
/// use sumi_seek::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title>
///     <meta name="description" content="A page"></head>
///     <body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.description, "A page");
/// assert_eq!(parsed.links, vec!["/page"]);
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        keywords: extract_meta(&document, "keywords"),
        description: extract_meta(&document, "description"),
        links: extract_links(&document),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Content of the first `<meta name=...>` tag, matching the name case-insensitively
fn extract_meta(document: &Html, name: &str) -> String {
    let meta_selector = match Selector::parse("meta[name][content]") {
        Ok(selector) => selector,
        Err(_) => return String::new(),
    };

    document
        .select(&meta_selector)
        .find(|element| named(element, name))
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default()
}

fn named(element: &ElementRef, name: &str) -> bool {
    element
        .value()
        .attr("name")
        .map(|n| n.trim().eq_ignore_ascii_case(name))
        .unwrap_or(false)
}

fn extract_links(document: &Html) -> Vec<String> {
    let a_selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>  Test Page  </title></head><body></body></html>"#;
        assert_eq!(parse_html(html).title, Some("Test Page".to_string()));
    }

    #[test]
    fn test_blank_title_is_none() {
        let html = r#"<html><head><title>   </title></head><body></body></html>"#;
        let parsed = parse_html(html);
        assert_eq!(parsed.title, None);
        assert!(parsed.title.is_none());

        let parsed = parse_html("<html><head></head><body></body></html>");
        assert_eq!(parsed.title, None);
    }

    #[test]
    fn test_extract_meta_fields() {
        let html = r#"<html><head>
            <title>T</title>
            <meta name="Keywords" content="rust, search">
            <meta name="description" content=" A small engine ">
        </head></html>"#;
        let parsed = parse_html(html);
        assert_eq!(parsed.keywords, "rust, search");
        assert_eq!(parsed.description, "A small engine");
    }

    #[test]
    fn test_missing_meta_is_empty() {
        let parsed = parse_html("<html><head><title>T</title></head></html>");
        assert_eq!(parsed.keywords, "");
        assert_eq!(parsed.description, "");
    }

    #[test]
    fn test_links_kept_raw_in_order() {
        let html = r##"
            <html><body>
                <a href="/page1">1</a>
                <a href="https://other.com/page2">2</a>
                <a href="#top">3</a>
                <a>no href</a>
                <a href="mailto:a@b.c">4</a>
            </body></html>
        "##;
        let parsed = parse_html(html);
        assert_eq!(
            parsed.links,
            vec!["/page1", "https://other.com/page2", "#top", "mailto:a@b.c"]
        );
    }
}
