//! Pagination and retry behavior against a mock PatentsView server.

use std::collections::HashSet;
use std::ops::Range;
use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patentsview_fetch::config::Config;
use patentsview_fetch::tables::table_by_name;
use patentsview_fetch::{ClientError, FetchError, Fetcher, Group, PatentsViewClient, Query, RetryPolicy};

const QUERY_PATH: &str = "/patents/query";

fn setup_fetcher(mock_server: &MockServer) -> Fetcher {
    let config = Config::for_testing(&mock_server.uri());
    Fetcher::new(PatentsViewClient::new(config).unwrap())
}

fn sample_patent(n: u64) -> Value {
    json!({
        "patent_number": format!("{}", 10_000_000 + n),
        "patent_title": format!("Patent {n}"),
        "assignees": [{"assignee_id": format!("org-{n}"), "assignee_key_id": format!("{n}")}]
    })
}

fn page_body(numbers: Range<u64>, total: u64) -> Value {
    let patents: Vec<Value> = numbers.map(sample_patent).collect();
    let count = patents.len();
    json!({"patents": patents, "count": count, "total_patent_count": total})
}

/// Mount one mock per page, each expected exactly once.
async fn mount_pages(mock_server: &MockServer, total: u64, per_page: u64) {
    let pages = total.div_ceil(per_page).max(1);
    for page in 1..=pages {
        let start = (page - 1) * per_page;
        let end = (page * per_page).min(total);
        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .and(body_partial_json(json!({"o": {"page": page}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(start..end, total)))
            .expect(1)
            .mount(mock_server)
            .await;
    }
}

fn query(per_page: u32) -> Query {
    Query::new(["patent_number", "assignee_id"], "2019-01-01", "2019-02-01")
        .unwrap()
        .with_per_page(per_page)
        .unwrap()
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::fixed(Duration::from_millis(5), max_attempts)
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_single_page_example() {
    let mock_server = MockServer::start().await;
    mount_pages(&mock_server, 3, 10_000).await;

    let tables = setup_fetcher(&mock_server).fetch(&query(10_000)).await.unwrap();

    let patents = table_by_name(&tables, "patents").unwrap();
    let assignees = table_by_name(&tables, "assignees").unwrap();

    let patent_columns: HashSet<&str> = patents.columns().iter().map(String::as_str).collect();
    let assignee_columns: HashSet<&str> = assignees.columns().iter().map(String::as_str).collect();
    assert_eq!(patent_columns, HashSet::from(["patent_number"]));
    assert_eq!(assignee_columns, HashSet::from(["assignee_id", "patent_number"]));

    assert_eq!(patents.len(), 3);
    assert_eq!(assignees.len(), 3);
}

#[tokio::test]
async fn test_pages_cover_total_without_duplicates() {
    let mock_server = MockServer::start().await;
    mount_pages(&mock_server, 25, 10).await;

    let tables = setup_fetcher(&mock_server).fetch(&query(10)).await.unwrap();
    let patents = &tables[&Group::Patents];

    assert_eq!(patents.len(), 25);
    let unique: HashSet<&str> =
        patents.column("patent_number").unwrap().filter_map(Value::as_str).collect();
    assert_eq!(unique.len(), 25);

    // 3 pages: 10 + 10 + 5, each mock verifies it was hit exactly once
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_exact_multiple_of_page_size() {
    let mock_server = MockServer::start().await;
    mount_pages(&mock_server, 20, 10).await;

    let tables = setup_fetcher(&mock_server).fetch(&query(10)).await.unwrap();

    assert_eq!(tables[&Group::Patents].len(), 20);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_no_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "patents": null,
            "count": 0,
            "total_patent_count": 0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tables = setup_fetcher(&mock_server).fetch(&query(100)).await.unwrap();

    assert!(tables[&Group::Patents].is_empty());
    assert!(tables[&Group::Assignees].is_empty());
}

#[tokio::test]
async fn test_request_body_carries_query() {
    let mock_server = MockServer::start().await;
    mount_pages(&mock_server, 1, 50).await;

    setup_fetcher(&mock_server).fetch(&query(50)).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();

    assert_eq!(
        body["q"],
        json!({"_and": [
            {"_gte": {"patent_date": "2019-01-01"}},
            {"_lt": {"patent_date": "2019-02-01"}}
        ]})
    );
    assert_eq!(body["f"], json!(["patent_number", "assignee_id"]));
    assert_eq!(body["o"], json!({"page": 1, "per_page": 50}));
}

#[tokio::test]
async fn test_result_cap_is_a_validation_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..1, 100_000)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = setup_fetcher(&mock_server).fetch(&query(10_000)).await.unwrap_err();

    assert!(err.is_validation());
    assert!(err.to_string().contains("100000"));
}

// =============================================================================
// Retry
// =============================================================================

#[tokio::test]
async fn test_retry_is_transparent() {
    let mock_server = MockServer::start().await;

    // Page 2 fails twice before succeeding
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(body_partial_json(json!({"o": {"page": 2}})))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_pages(&mock_server, 15, 10).await;

    let query = query(10).with_retry(fast_retry(5)).unwrap();
    let tables = setup_fetcher(&mock_server).fetch(&query).await.unwrap();

    assert_eq!(tables[&Group::Patents].len(), 15);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_without_retry_first_failure_aborts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(body_partial_json(json!({"o": {"page": 1}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..10, 30)))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(body_partial_json(json!({"o": {"page": 2}})))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = setup_fetcher(&mock_server).fetch(&query(10)).await.unwrap_err();

    match err {
        FetchError::Request(ClientError::Status { status, body, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected request error, got {other:?}"),
    }
    // Page 3 is never requested
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let query = query(10).with_retry(fast_retry(3)).unwrap();
    let err = setup_fetcher(&mock_server).fetch(&query).await.unwrap_err();

    assert!(err.is_request());
    match err {
        FetchError::Request(ClientError::RetriesExhausted { attempts, last }) => {
            assert_eq!(attempts, 3);
            assert_eq!(last.status_code(), Some(503));
        }
        other => panic!("expected exhausted retries, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unparseable_body_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = query(10).with_retry(fast_retry(5)).unwrap();
    let err = setup_fetcher(&mock_server).fetch(&query).await.unwrap_err();

    assert!(matches!(err, FetchError::Request(ClientError::Parse(_))));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_request_error() {
    // Nothing listens on port 9 on loopback
    let config = Config::for_testing("http://127.0.0.1:9");
    let fetcher = Fetcher::new(PatentsViewClient::new(config).unwrap());

    let err = fetcher.fetch(&query(10)).await.unwrap_err();

    assert!(matches!(err, FetchError::Request(ClientError::Http(_))));
}

#[tokio::test]
async fn test_unbounded_retry_outlasts_the_default_limit() {
    let mock_server = MockServer::start().await;

    // More failures than the bounded default allows
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(7)
        .expect(7)
        .mount(&mock_server)
        .await;
    mount_pages(&mock_server, 1, 10).await;

    let query = query(10).with_retry(RetryPolicy::unbounded(Duration::from_millis(1))).unwrap();
    let tables = setup_fetcher(&mock_server).fetch(&query).await.unwrap();

    assert_eq!(tables[&Group::Patents].len(), 1);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 8);
}

// =============================================================================
// Plain arguments
// =============================================================================

/// Page 1 of two succeeds, page 2 fails `failures` times before succeeding.
async fn mount_flaky_second_page(mock_server: &MockServer, failures: u64) {
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(body_partial_json(json!({"o": {"page": 2}})))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(failures)
        .mount(mock_server)
        .await;
    for page in 1..=2u64 {
        let start = (page - 1) * 5;
        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .and(body_partial_json(json!({"o": {"page": page}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(start..start + 5, 10)))
            .mount(mock_server)
            .await;
    }
}

#[tokio::test]
async fn test_plain_fetch_with_force_retry_recovers() {
    let mock_server = MockServer::start().await;
    mount_flaky_second_page(&mock_server, 2).await;

    let tables = setup_fetcher(&mock_server)
        .fetch_plain(
            ["patent_number", "assignee_id"],
            "2019-01-01",
            "2019-02-01",
            5,
            true,
            Duration::from_millis(5),
        )
        .await
        .unwrap();

    assert_eq!(tables[&Group::Patents].len(), 10);
    assert_eq!(tables[&Group::Assignees].len(), 10);
    // ceil(10 / 5) pages plus two failed attempts
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_plain_fetch_without_force_retry_fails() {
    let mock_server = MockServer::start().await;
    mount_flaky_second_page(&mock_server, 2).await;

    let err = setup_fetcher(&mock_server)
        .fetch_plain(
            ["patent_number", "assignee_id"],
            "2019-01-01",
            "2019-02-01",
            5,
            false,
            Duration::from_millis(5),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Request(ClientError::Status { status: 502, .. })));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

// =============================================================================
// Windowed fetch
// =============================================================================

async fn mount_window(mock_server: &MockServer, start: &str, end: &str, numbers: Range<u64>) {
    let total = numbers.end - numbers.start;
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(body_partial_json(json!({"q": {"_and": [
            {"_gte": {"patent_date": start}},
            {"_lt": {"patent_date": end}}
        ]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(numbers, total)))
        .expect(1)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_windowed_fetch_merges_windows() {
    let mock_server = MockServer::start().await;
    mount_window(&mock_server, "2019-01-01", "2019-02-01", 0..4).await;
    mount_window(&mock_server, "2019-02-01", "2019-03-01", 4..7).await;
    mount_window(&mock_server, "2019-03-01", "2019-03-15", 7..8).await;

    let query = Query::new(["patent_number", "assignee_id"], "2019-01-01", "2019-03-15").unwrap();
    let tables = setup_fetcher(&mock_server).fetch_windowed(&query, 1).await.unwrap();

    assert_eq!(tables[&Group::Patents].len(), 8);
    assert_eq!(tables[&Group::Assignees].len(), 8);
}

#[tokio::test]
async fn test_windowed_fetch_rejects_zero_months() {
    let mock_server = MockServer::start().await;

    let err = setup_fetcher(&mock_server).fetch_windowed(&query(10), 0).await.unwrap_err();

    assert!(err.is_validation());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// Blocking
// =============================================================================

#[test]
fn test_fetch_blocking() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mock_server = runtime.block_on(async {
        let mock_server = MockServer::start().await;
        mount_pages(&mock_server, 12, 5).await;
        mock_server
    });

    let tables = setup_fetcher(&mock_server).fetch_blocking(&query(5)).unwrap();

    assert_eq!(tables[&Group::Patents].len(), 12);
    runtime.block_on(async { drop(mock_server) });
}
