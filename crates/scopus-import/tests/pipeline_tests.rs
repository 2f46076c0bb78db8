//! Pipeline tests against an in-memory Scopus API fake.
//!
//! The fake records every search and fetch call so the tests can assert not
//! just what the pipeline emits but also which requests it avoided.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, Utc};
use futures::{StreamExt, pin_mut};
use serde_json::json;

use scopus_import::cache::{CacheMeta, MetaCache};
use scopus_import::client::ScopusApi;
use scopus_import::config::FetcherParams;
use scopus_import::error::{ClientError, ClientResult};
use scopus_import::models::{AbstractsDocument, ImportRecord, ObservedAuthor, SearchResults};
use scopus_import::pipeline::PublicationFetcher;
use scopus_import::store::{CacheStore, MemoryCacheStore};

/// In-memory stand-in for the Scopus API.
#[derive(Default)]
struct FakeApi {
    /// Publication ids per scopus author id, served in pages.
    publications: HashMap<String, Vec<String>>,

    /// Full documents per scopus id.
    documents: HashMap<String, AbstractsDocument>,

    /// Author ids whose search requests fail.
    failing_searches: HashSet<String>,

    search_calls: Arc<Mutex<Vec<(String, usize, usize)>>>,
    fetch_calls: Arc<Mutex<Vec<String>>>,
}

impl FakeApi {
    fn with_publications(author_id: &str, ids: &[&str]) -> Self {
        let mut api = Self::default();
        api.publications
            .insert(author_id.to_string(), ids.iter().map(|s| (*s).to_string()).collect());
        api
    }

    fn add_document(&mut self, scopus_id: &str, document: AbstractsDocument) {
        self.documents.insert(scopus_id.to_string(), document);
    }

    fn fetched_ids(&self) -> Vec<String> {
        self.fetch_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ScopusApi for &FakeApi {
    async fn search(&self, query: &str, start: usize, count: usize) -> ClientResult<SearchResults> {
        self.search_calls.lock().unwrap().push((query.to_string(), start, count));

        let author_id = query
            .strip_prefix("AU-ID(")
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(query);

        if self.failing_searches.contains(author_id) {
            return Err(ClientError::server(500, "search exploded"));
        }

        let ids = self.publications.get(author_id).cloned().unwrap_or_default();
        let page: Vec<&String> = ids.iter().skip(start).take(count).collect();
        let entries: Vec<serde_json::Value> =
            page.iter().map(|id| json!({"dc:identifier": format!("SCOPUS_ID:{id}")})).collect();

        Ok(serde_json::from_value(json!({"search-results": {"entry": entries}})).unwrap())
    }

    async fn retrieve_abstract(&self, scopus_id: &str) -> ClientResult<AbstractsDocument> {
        self.fetch_calls.lock().unwrap().push(scopus_id.to_string());
        self.documents
            .get(scopus_id)
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("publication {scopus_id}")))
    }
}

fn observed_author(id: i64, scopus_ids: &[&str], blacklist: &[&str], topics: &[&str]) -> ObservedAuthor {
    ObservedAuthor {
        id,
        first_name: "Marie".to_string(),
        last_name: "Curie".to_string(),
        scopus_author_ids: scopus_ids.iter().map(|s| (*s).to_string()).collect(),
        affiliations: HashMap::new(),
        affiliation_blacklist: blacklist.iter().map(|s| (*s).to_string()).collect(),
        topics: topics.iter().map(|s| (*s).to_string()).collect(),
    }
}

fn document(scopus_id: &str, cover_date: &str, authors: &[(&str, Option<&str>)]) -> AbstractsDocument {
    let author_entries: Vec<serde_json::Value> = authors
        .iter()
        .map(|(auid, affiliation)| match affiliation {
            Some(id) => json!({"@auid": auid, "ce:indexed-name": format!("{auid} name"),
                               "affiliation": {"@id": id}}),
            None => json!({"@auid": auid, "ce:indexed-name": format!("{auid} name")}),
        })
        .collect();

    serde_json::from_value(json!({
        "abstracts-retrieval-response": {
            "coredata": {
                "dc:title": format!("Publication {scopus_id}"),
                "prism:coverDate": cover_date,
                "dc:identifier": format!("SCOPUS_ID:{scopus_id}")
            },
            "authors": {"author": author_entries}
        }
    }))
    .unwrap()
}

fn cutoff(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn collect_records<A: ScopusApi>(fetcher: &mut PublicationFetcher<A>) -> Vec<ImportRecord> {
    let stream = fetcher.run();
    pin_mut!(stream);
    stream.collect().await
}

#[tokio::test]
async fn test_end_to_end_single_publication() {
    let mut api = FakeApi::with_publications("A1", &["100"]);
    api.add_document("100", document("100", "2021-09-22", &[("A1", Some("20"))]));

    let authors = vec![observed_author(7, &["A1"], &[], &["physics", "radioactivity"])];
    let params = FetcherParams {
        more_recent_than: cutoff("2010-01-01"),
        ..Default::default()
    };
    let mut fetcher = PublicationFetcher::new(&api, MetaCache::new(), authors, params).unwrap();

    let records = collect_records(&mut fetcher).await;
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.scopus_id, "100");
    assert_eq!(record.publish_date, "2021-09-22");
    assert_eq!(record.author_count, 1);
    let mut topics = record.topics.clone();
    topics.sort();
    assert_eq!(topics, vec!["physics", "radioactivity"]);
    assert_eq!(record.observed_author_ids, vec![7]);

    // The cache recorded the decision-relevant metadata.
    let cache = fetcher.into_cache();
    let entry = cache.get("100").unwrap();
    assert_eq!(entry.publish_date, "2021-09-22");
    assert_eq!(entry.author_affiliations.get("A1").map(String::as_str), Some("20"));
    assert_eq!(entry.observed_author_ids, vec![7]);
}

#[tokio::test]
async fn test_exclude_ids_are_never_processed() {
    let mut api = FakeApi::with_publications("A1", &["10", "20", "30"]);
    api.add_document("10", document("10", "2021-01-01", &[("A1", None)]));
    api.add_document("20", document("20", "2021-01-01", &[("A1", None)]));
    api.add_document("30", document("30", "2021-01-01", &[("A1", None)]));

    let authors = vec![observed_author(1, &["A1"], &[], &[])];
    let params = FetcherParams {
        exclude_ids: HashSet::from(["20".to_string()]),
        ..Default::default()
    };
    let mut fetcher = PublicationFetcher::new(&api, MetaCache::new(), authors, params).unwrap();

    let records = collect_records(&mut fetcher).await;
    let emitted: Vec<&str> = records.iter().map(|r| r.scopus_id.as_str()).collect();
    assert_eq!(emitted, vec!["10", "30"]);
    assert_eq!(api.fetched_ids(), vec!["10", "30"]);
}

#[tokio::test]
async fn test_cached_rejection_skips_fetch() {
    let mut api = FakeApi::with_publications("A1", &["100"]);
    api.add_document("100", document("100", "2005-01-01", &[("A1", None)]));

    // A previous run cached the publication as too old.
    let mut cache = MetaCache::new();
    cache.update(
        "100",
        CacheMeta { publish_date: "2005-01-01".to_string(), ..Default::default() },
    );

    let authors = vec![observed_author(1, &["A1"], &[], &[])];
    let params = FetcherParams { more_recent_than: cutoff("2010-01-01"), ..Default::default() };
    let mut fetcher = PublicationFetcher::new(&api, cache, authors, params).unwrap();

    let records = collect_records(&mut fetcher).await;
    assert!(records.is_empty());
    // The whole point of the cache: no full fetch happened.
    assert!(api.fetched_ids().is_empty());
}

#[tokio::test]
async fn test_expired_cache_entry_triggers_refetch() {
    let mut api = FakeApi::with_publications("A1", &["100"]);
    api.add_document("100", document("100", "2021-09-22", &[("A1", None)]));

    // A 31 day old entry rejected the publication; its lifetime is over.
    let store = MemoryCacheStore::default();
    let added_at = (Utc::now() - Duration::days(31)).to_rfc3339();
    store
        .save(&format!(
            r#"{{"100":{{"publish_date":"2005-01-01","author_affiliations":{{}},"observed_author_ids":[],"added_at":"{added_at}"}}}}"#
        ))
        .unwrap();
    let cache = MetaCache::load(&store).unwrap();

    let authors = vec![observed_author(1, &["A1"], &[], &[])];
    let params = FetcherParams { more_recent_than: cutoff("2010-01-01"), ..Default::default() };
    let mut fetcher = PublicationFetcher::new(&api, cache, authors, params).unwrap();

    let records = collect_records(&mut fetcher).await;
    // The stale rejection no longer counts; the record is fetched fresh.
    assert_eq!(records.len(), 1);
    assert_eq!(api.fetched_ids(), vec!["100"]);
}

#[tokio::test]
async fn test_blacklisted_publication_is_cached_but_not_emitted() {
    let mut api = FakeApi::with_publications("A1", &["100"]);
    api.add_document("100", document("100", "2021-09-22", &[("A1", Some("666"))]));

    let authors = vec![observed_author(1, &["A1"], &["666"], &[])];
    let params = FetcherParams { more_recent_than: cutoff("2010-01-01"), ..Default::default() };
    let mut fetcher = PublicationFetcher::new(&api, MetaCache::new(), authors, params).unwrap();

    let records = collect_records(&mut fetcher).await;
    assert!(records.is_empty());

    // Rejected records still land in the cache so the next run skips the
    // fetch entirely.
    let cache = fetcher.into_cache();
    let entry = cache.get("100").unwrap();
    assert_eq!(entry.author_affiliations.get("A1").map(String::as_str), Some("666"));
}

#[tokio::test]
async fn test_blacklist_can_be_disabled() {
    let mut api = FakeApi::with_publications("A1", &["100"]);
    api.add_document("100", document("100", "2021-09-22", &[("A1", Some("666"))]));

    let authors = vec![observed_author(1, &["A1"], &["666"], &[])];
    let params = FetcherParams {
        apply_blacklist: false,
        more_recent_than: cutoff("2010-01-01"),
        ..Default::default()
    };
    let mut fetcher = PublicationFetcher::new(&api, MetaCache::new(), authors, params).unwrap();

    let records = collect_records(&mut fetcher).await;
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_pagination_continues_until_short_page() {
    let mut api = FakeApi::with_publications("A1", &["1", "2", "3"]);
    for id in ["1", "2", "3"] {
        api.add_document(id, document(id, "2021-01-01", &[("A1", None)]));
    }

    let authors = vec![observed_author(1, &["A1"], &[], &[])];
    let params = FetcherParams { step_size: 2, ..Default::default() };
    let mut fetcher = PublicationFetcher::new(&api, MetaCache::new(), authors, params).unwrap();

    let records = collect_records(&mut fetcher).await;
    assert_eq!(records.len(), 3);

    // Two pages: a full one at offset 0, a short one at offset 2.
    let search_calls = api.search_calls.lock().unwrap().clone();
    assert_eq!(
        search_calls,
        vec![("AU-ID(A1)".to_string(), 0, 2), ("AU-ID(A1)".to_string(), 2, 2)]
    );
}

#[tokio::test]
async fn test_search_failure_only_aborts_that_author_id() {
    let mut api = FakeApi::with_publications("A2", &["200"]);
    api.failing_searches.insert("A1".to_string());
    api.add_document("200", document("200", "2021-01-01", &[("A2", None)]));

    let authors = vec![observed_author(1, &["A1", "A2"], &[], &[])];
    let mut fetcher =
        PublicationFetcher::new(&api, MetaCache::new(), authors, FetcherParams::default())
            .unwrap();

    let records = collect_records(&mut fetcher).await;
    // The failing author id contributed nothing; the run still completed.
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].scopus_id, "200");
}

#[tokio::test]
async fn test_fetch_failure_skips_id_without_cache_update() {
    let mut api = FakeApi::with_publications("A1", &["100", "200"]);
    // No document for "100": the fetch fails with NotFound.
    api.add_document("200", document("200", "2021-01-01", &[("A1", None)]));

    let authors = vec![observed_author(1, &["A1"], &[], &[])];
    let mut fetcher =
        PublicationFetcher::new(&api, MetaCache::new(), authors, FetcherParams::default())
            .unwrap();

    let records = collect_records(&mut fetcher).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].scopus_id, "200");

    // The failed id left no trace in the cache.
    let cache = fetcher.into_cache();
    assert!(cache.get("100").is_err());
    assert!(cache.get("200").is_ok());
}

#[tokio::test]
async fn test_duplicate_candidates_processed_once() {
    // The same publication shows up under both scopus author ids.
    let mut api = FakeApi::default();
    api.publications.insert("A1".to_string(), vec!["100".to_string()]);
    api.publications.insert("A2".to_string(), vec!["100".to_string()]);
    api.add_document("100", document("100", "2021-01-01", &[("A1", None)]));

    let authors = vec![observed_author(1, &["A1", "A2"], &[], &[])];
    let mut fetcher =
        PublicationFetcher::new(&api, MetaCache::new(), authors, FetcherParams::default())
            .unwrap();

    let records = collect_records(&mut fetcher).await;
    assert_eq!(records.len(), 1);
    assert_eq!(api.fetched_ids(), vec!["100"]);
}

#[tokio::test]
async fn test_max_author_count_truncates_list_not_count() {
    let mut api = FakeApi::with_publications("A1", &["100"]);
    api.add_document(
        "100",
        document("100", "2021-01-01", &[("A1", None), ("B2", None), ("C3", None)]),
    );

    let authors = vec![observed_author(1, &["A1"], &[], &[])];
    let params = FetcherParams { max_author_count: Some(2), ..Default::default() };
    let mut fetcher = PublicationFetcher::new(&api, MetaCache::new(), authors, params).unwrap();

    let records = collect_records(&mut fetcher).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].authors.len(), 2);
    // The stored count still reflects the full author list.
    assert_eq!(records[0].author_count, 3);
}

#[tokio::test]
async fn test_invalid_params_fail_before_any_request() {
    let api = FakeApi::with_publications("A1", &["100"]);
    let authors = vec![observed_author(1, &["A1"], &[], &[])];
    let params = FetcherParams { step_size: 0, ..Default::default() };

    let result = PublicationFetcher::new(&api, MetaCache::new(), authors, params);
    assert!(result.is_err());
    assert!(api.search_calls.lock().unwrap().is_empty());
    assert!(api.fetched_ids().is_empty());
}
