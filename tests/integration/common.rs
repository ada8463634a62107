use std::path::Path;
use sumi_seek::config::{parse_config, Config};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a validated config with zero delays and one job per `(name, seed)`
pub fn test_config(db_path: &Path, max_depth: u32, jobs: &[(&str, &str)]) -> Config {
    let mut toml = format!(
        r#"
[crawler]
max-depth = {}
request-timeout-secs = 2
robots-timeout-secs = 1
delay-min-ms = 0
delay-max-ms = 0
min-available-memory-percent = 0

[dedup]
expected-items = 1000
false-positive-rate = 0.001

[index]
batch-size = 20
batch-pause-ms = 0

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[storage]
database-path = "{}"
"#,
        max_depth,
        db_path.display()
    );

    for (name, seed) in jobs {
        toml.push_str(&format!("\n[[job]]\nname = \"{}\"\nseed = \"{}\"\n", name, seed));
    }

    parse_config(&toml).unwrap()
}

pub fn html(title: &str, links: &[String]) -> String {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}">link</a>"#, l))
        .collect();
    format!(
        "<html><head><title>{}</title><meta name=\"description\" content=\"{} page\"></head><body>{}</body></html>",
        title, title, anchors
    )
}

/// Mounts a page that may be fetched any number of times
pub async fn mount_page(server: &MockServer, route: &str, title: &str, links: &[String]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html(title, links))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Mounts a page that must never be requested
pub async fn mount_forbidden(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html("Nope", &[])))
        .expect(0)
        .mount(server)
        .await;
}
