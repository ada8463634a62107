//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run whole crawl
//! jobs against a database file.

use crate::common::{mount_forbidden, mount_page, test_config};
use sumi_seek::crawler::{load_checkpoint, run_jobs, save_checkpoint, Checkpoint, FrontierEntry};
use sumi_seek::storage::{DocumentStore, SqliteStorage};
use sumi_seek::BloomFilter;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn seed_checkpoint(db: &std::path::Path, job: &str, frontier: Vec<FrontierEntry>, visited: &[String]) {
    let mut storage = SqliteStorage::new(db).unwrap();
    let mut filter = BloomFilter::new(1000, 0.001).unwrap();
    for url in visited {
        filter.insert(url);
    }
    let checkpoint = Checkpoint::new(frontier, filter.to_state());
    save_checkpoint(&mut storage, job, &checkpoint).unwrap();
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("seek.db");

    mount_page(&server, "/", "Home", &[format!("{}/a", base), "/b".to_string()]).await;
    mount_page(&server, "/a", "Page A", &["/".to_string()]).await;
    mount_page(&server, "/b", "Page B", &[]).await;

    let config = test_config(&db, 1, &[("site", &base)]);
    let results = run_jobs(&config, false, None).await;

    assert_eq!(results.len(), 1);
    let (name, result) = &results[0];
    assert_eq!(name, "site");
    let report = result.as_ref().unwrap();
    assert_eq!(report.visited, 3);
    assert_eq!(report.stored, 2);
    assert!(!report.depth_terminated);

    let storage = SqliteStorage::new(&db).unwrap();
    assert_eq!(storage.count_documents().unwrap(), 2);
    let a = storage.get_document(&format!("{}/a", base)).unwrap().unwrap();
    assert_eq!(a.title, "Page A");
    assert_eq!(a.description, "Page A page");
    assert!(a.weight > 0.0 && a.weight <= 1.0);
    assert!(!storage.has_document(&format!("{}/", base)).unwrap());

    // The last checkpoint holds an empty frontier, so nothing is resumable.
    assert!(load_checkpoint(&storage, "site").is_none());
}

#[tokio::test]
async fn test_rerun_skips_visited_until_fresh() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("seek.db");

    mount_page(&server, "/", "Home", &["/a".to_string()]).await;
    mount_page(&server, "/a", "Page A", &[]).await;

    let config = test_config(&db, 1, &[("site", &base)]);
    let first = run_jobs(&config, false, None).await;
    assert_eq!(first[0].1.as_ref().unwrap().visited, 2);

    let second = run_jobs(&config, false, None).await;
    let report = second[0].1.as_ref().unwrap();
    assert_eq!(report.visited, 0);

    let fresh = run_jobs(&config, true, None).await;
    let report = fresh[0].1.as_ref().unwrap();
    assert_eq!(report.visited, 2);
    // Already stored, so nothing new is written.
    assert_eq!(report.stored, 0);
}

#[tokio::test]
async fn test_robots_disallow_blocks_visit_and_storage() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("seek.db");

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/", "Home", &["/private/page".to_string(), "/open".to_string()]).await;
    mount_page(&server, "/open", "Open", &[]).await;
    mount_forbidden(&server, "/private/page").await;

    let config = test_config(&db, 2, &[("site", &base)]);
    let results = run_jobs(&config, false, None).await;
    let report = results[0].1.as_ref().unwrap();

    assert_eq!(report.disallowed, 1);
    assert_eq!(report.stored, 1);

    let storage = SqliteStorage::new(&db).unwrap();
    assert!(storage.has_document(&format!("{}/open", base)).unwrap());
    assert!(!storage.has_document(&format!("{}/private/page", base)).unwrap());
}

#[tokio::test]
async fn test_depth_overflow_ends_job_before_queued_entries() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("seek.db");

    mount_forbidden(&server, "/deep").await;
    mount_forbidden(&server, "/shallow").await;

    seed_checkpoint(
        &db,
        "site",
        vec![
            FrontierEntry::new(format!("{}/deep", base), 3),
            FrontierEntry::new(format!("{}/shallow", base), 1),
        ],
        &[format!("{}/", base)],
    );

    let config = test_config(&db, 2, &[("site", &base)]);
    let results = run_jobs(&config, false, None).await;
    let report = results[0].1.as_ref().unwrap();

    assert!(report.depth_terminated);
    assert_eq!(report.visited, 0);
    assert_eq!(report.frontier_remaining, 1);

    // Termination writes no checkpoint, so the saved one is untouched.
    let storage = SqliteStorage::new(&db).unwrap();
    let checkpoint = load_checkpoint(&storage, "site").unwrap();
    assert_eq!(checkpoint.frontier.len(), 2);
}

#[tokio::test]
async fn test_resume_from_checkpoint() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("seek.db");

    mount_forbidden(&server, "/").await;
    mount_page(&server, "/b", "Page B", &["/".to_string(), "/c".to_string()]).await;
    mount_page(&server, "/c", "Page C", &[]).await;

    seed_checkpoint(
        &db,
        "site",
        vec![FrontierEntry::new(format!("{}/b", base), 1)],
        &[format!("{}/", base)],
    );

    let config = test_config(&db, 2, &[("site", &base)]);
    let results = run_jobs(&config, false, None).await;
    let report = results[0].1.as_ref().unwrap();

    assert_eq!(report.visited, 2);
    assert_eq!(report.stored, 1);

    let storage = SqliteStorage::new(&db).unwrap();
    assert!(storage.has_document(&format!("{}/c", base)).unwrap());
    assert!(!storage.has_document(&format!("{}/", base)).unwrap());
}

#[tokio::test]
async fn test_jobs_share_database() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("seek.db");
    drop(SqliteStorage::new(&db).unwrap());

    mount_page(&first, "/", "First", &["/one".to_string()]).await;
    mount_page(&first, "/one", "One", &[]).await;
    mount_page(&second, "/", "Second", &["/two".to_string()]).await;
    mount_page(&second, "/two", "Two", &[]).await;

    let first_uri = first.uri();
    let second_uri = second.uri();
    let config = test_config(&db, 1, &[("first", &first_uri), ("second", &second_uri)]);
    let results = run_jobs(&config, false, None).await;

    let names: Vec<_> = results.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
    assert!(results.iter().all(|(_, result)| result.is_ok()));

    let storage = SqliteStorage::new(&db).unwrap();
    assert_eq!(storage.count_documents().unwrap(), 2);
    assert!(storage.has_document(&format!("{}/one", first_uri)).unwrap());
    assert!(storage.has_document(&format!("{}/two", second_uri)).unwrap());
}

#[tokio::test]
async fn test_job_filter() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("seek.db");

    mount_page(&server, "/", "Home", &[]).await;

    let config = test_config(&db, 1, &[("site", &base)]);
    assert!(run_jobs(&config, false, Some("missing")).await.is_empty());

    let results = run_jobs(&config, false, Some("site")).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].1.as_ref().unwrap().visited, 1);
}
