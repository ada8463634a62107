//! Integration tests for indexing, ranking and backlink propagation

use crate::common::{mount_page, test_config};
use std::time::Duration;
use sumi_seek::backlinks::propagate;
use sumi_seek::crawler::{build_http_client, run_jobs};
use sumi_seek::index::build_index;
use sumi_seek::output::load_statistics;
use sumi_seek::storage::{Document, DocumentStore, IndexStore, SqliteStorage};
use sumi_seek::url::extract_netloc;
use sumi_seek::{RankOutcome, Ranker};
use tempfile::TempDir;
use wiremock::MockServer;

fn document(href: &str, title: &str, weight: f64) -> Document {
    let url = url::Url::parse(href).unwrap();
    Document {
        href: url.to_string(),
        title: title.to_string(),
        keywords: String::new(),
        description: String::new(),
        weight,
        netloc: extract_netloc(&url).unwrap(),
        language_tag: "eng".to_string(),
    }
}

fn ranked_hrefs(outcome: &RankOutcome) -> Vec<&str> {
    match outcome {
        RankOutcome::Ranked(documents) => documents
            .iter()
            .map(|ranked| ranked.document.href.as_str())
            .collect(),
        other => panic!("expected ranked results, got {:?}", other),
    }
}

#[tokio::test]
async fn test_short_trailing_batch_is_not_indexed() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("seek.db");
    let config = test_config(&db, 1, &[]);

    let mut storage = SqliteStorage::new(&db).unwrap();
    for i in 0..45 {
        let doc = document(
            &format!("https://example.com/{}", i),
            &format!("topic{:02}", i),
            0.5,
        );
        storage.insert_document(&doc).unwrap();
    }

    let report = build_index(&config.index, &mut storage).await.unwrap();

    assert_eq!(report.batches, 2);
    assert_eq!(report.documents_indexed, 40);
    assert_eq!(report.documents_dropped, 5);
    assert_eq!(storage.lookup_term("topic39").unwrap(), vec![39]);
    assert!(storage.lookup_term("topic44").unwrap().is_empty());

    // A rebuild starts over instead of appending to the old postings.
    build_index(&config.index, &mut storage).await.unwrap();
    assert_eq!(storage.lookup_term("topic00").unwrap(), vec![0]);
}

#[tokio::test]
async fn test_crawl_index_and_query() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("seek.db");

    mount_page(&server, "/", "Home", &["/rust".to_string(), "/python".to_string()]).await;
    mount_page(&server, "/rust", "Rust crawler guide", &[]).await;
    mount_page(&server, "/python", "Python notes", &[]).await;

    let mut config = test_config(&db, 1, &[("site", &base)]);
    config.index.batch_size = 2;

    let results = run_jobs(&config, false, None).await;
    assert_eq!(results[0].1.as_ref().unwrap().stored, 2);

    let mut storage = SqliteStorage::new(&db).unwrap();
    let report = build_index(&config.index, &mut storage).await.unwrap();
    assert_eq!(report.documents_indexed, 2);
    // Title and description both contain the term, so the id repeats.
    assert_eq!(storage.lookup_term("rust").unwrap(), vec![0, 0]);

    let ranker = Ranker::from_config(&config);

    let outcome = ranker.query(&storage, "Rust").unwrap();
    assert_eq!(ranked_hrefs(&outcome), vec![format!("{}/rust", base)]);

    let outcome = ranker.query(&storage, "notes").unwrap();
    assert_eq!(ranked_hrefs(&outcome), vec![format!("{}/python", base)]);

    assert_eq!(ranker.query(&storage, "zebra").unwrap(), RankOutcome::NoSignal);
    assert_eq!(ranker.query(&storage, "the").unwrap(), RankOutcome::EmptyQuery);

    let stats = load_statistics(&storage).unwrap();
    assert_eq!(stats.documents, 2);
    assert!(stats.indexed_terms > 0);
    assert_eq!(stats.checkpoints, 1);
}

#[tokio::test]
async fn test_propagation_without_referrers_keeps_weights() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("seek.db");
    let config = test_config(&db, 1, &[]);

    mount_page(&server, "/x", "X", &["/y".to_string()]).await;
    mount_page(&server, "/y", "Y", &[]).await;

    let mut storage = SqliteStorage::new(&db).unwrap();
    storage.insert_document(&document(&format!("{}/x", base), "X", 0.6)).unwrap();
    storage.insert_document(&document(&format!("{}/y", base), "Y", 0.4)).unwrap();
    // Never mounted, so its re-fetch fails.
    storage.insert_document(&document(&format!("{}/gone", base), "Gone", 0.3)).unwrap();

    let client = build_http_client(&config.user_agent, Duration::from_secs(2)).unwrap();
    let report = propagate(&client, &mut storage).await.unwrap();

    assert_eq!(report.documents_scanned, 3);
    assert_eq!(report.fetch_failures, 1);
    assert_eq!(report.targets_updated, 0);
    let y = storage.get_document(&format!("{}/y", base)).unwrap().unwrap();
    assert_eq!(y.weight, 0.4);
}

#[tokio::test]
async fn test_repeated_propagation_is_additive() {
    let source = MockServer::start().await;
    let target = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("seek.db");
    let config = test_config(&db, 1, &[]);

    let target_href = format!("{}/y", target.uri());
    mount_page(&source, "/x", "X", &[target_href.clone()]).await;
    mount_page(&target, "/y", "Y", &[]).await;

    let mut storage = SqliteStorage::new(&db).unwrap();
    storage.insert_document(&document(&format!("{}/x", source.uri()), "X", 0.6)).unwrap();
    storage.insert_document(&document(&target_href, "Y", 0.4)).unwrap();

    let client = build_http_client(&config.user_agent, Duration::from_secs(2)).unwrap();

    let first = propagate(&client, &mut storage).await.unwrap();
    assert_eq!(first.targets_updated, 1);
    let y = storage.get_document(&target_href).unwrap().unwrap();
    assert!((y.weight - 1.0).abs() < 1e-9);

    propagate(&client, &mut storage).await.unwrap();
    let y = storage.get_document(&target_href).unwrap().unwrap();
    assert!((y.weight - 1.6).abs() < 1e-9);

    let x = storage.get_document(&format!("{}/x", source.uri())).unwrap().unwrap();
    assert_eq!(x.weight, 0.6);
}
