//! Integration tests for `GraphClient::collect_post_comments`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made. Tests are grouped by scenario and cover the happy
//! paths (empty, single-page, multi-page, embedded replies) and every error
//! variant that the collector can propagate.

use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fbc_graph::{GraphClient, GraphError};

/// Builds a `GraphClient` suitable for tests: 5-second timeout, descriptive UA, no retries.
fn test_client(base_url: &str) -> GraphClient {
    GraphClient::with_base_url("test-token", "v23.0", 5, "fbc-test/0.1", 0, 0, base_url)
        .expect("client construction should not fail")
}

/// Builds a `GraphClient` with retries enabled for retry-specific tests.
fn test_client_with_retries(base_url: &str, max_retries: u32) -> GraphClient {
    GraphClient::with_base_url(
        "test-token",
        "v23.0",
        5,
        "fbc-test/0.1",
        max_retries,
        0,
        base_url,
    )
    .expect("client construction should not fail")
}

/// Minimal valid one-comment JSON fixture.
fn comment_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "created_time": "2024-05-01T12:00:00+0000",
        "from": { "id": "900", "name": "Ada Lovelace" },
        "message": format!("message {id}"),
        "like_count": 1
    })
}

// ---------------------------------------------------------------------------
// Test 1 – empty comment list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_returns_empty_when_post_has_no_comments() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"data": []})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.collect_post_comments("777", 100, 10, 0).await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let collection = result.unwrap();
    assert!(collection.comments.is_empty());
    assert_eq!(collection.pages_fetched, 1);
    assert_eq!(collection.summary_total, None);
}

// ---------------------------------------------------------------------------
// Test 2 – single page, full field mapping, request shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_maps_comment_fields_and_sends_expected_query() {
    let server = MockServer::start().await;

    let body = json!({
        "data": [comment_json("777_1")],
        "summary": { "order": "chronological", "total_count": 5 }
    });

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .and(query_param("access_token", "test-token"))
        .and(query_param("summary", "true"))
        .and(query_param("filter", "stream"))
        .and(query_param("limit", "100"))
        .and(query_param(
            "fields",
            "id,created_time,from,message,like_count,parent,comments",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let collection = client
        .collect_post_comments("777", 100, 10, 0)
        .await
        .expect("should collect");

    assert_eq!(collection.comments.len(), 1);
    assert_eq!(collection.summary_total, Some(5));
    let comment = &collection.comments[0];
    assert_eq!(comment.comment_id, "777_1");
    assert_eq!(comment.created_time, "2024-05-01T12:00:00+0000");
    assert_eq!(comment.author_id.as_deref(), Some("900"));
    assert_eq!(comment.author_name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(comment.message, "message 777_1");
    assert_eq!(comment.like_count, 1);
    assert_eq!(comment.parent_id, None);
}

// ---------------------------------------------------------------------------
// Test 3 – withheld fields default instead of failing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_defaults_withheld_comment_fields() {
    let server = MockServer::start().await;

    // Privacy-restricted commenters come back with nothing but an id.
    let body = json!({ "data": [{ "id": "777_2" }] });

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let collection = client
        .collect_post_comments("777", 100, 10, 0)
        .await
        .expect("should collect");

    let comment = &collection.comments[0];
    assert_eq!(comment.comment_id, "777_2");
    assert_eq!(comment.created_time, "");
    assert_eq!(comment.author_id, None);
    assert_eq!(comment.author_name, None);
    assert_eq!(comment.message, "");
    assert_eq!(comment.like_count, 0);
}

// ---------------------------------------------------------------------------
// Test 4 – pagination follows paging.next verbatim
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_follows_paging_next_across_pages() {
    let server = MockServer::start().await;

    let next_url = format!(
        "{}/v23.0/777/comments?access_token=test-token&after=cursor2",
        server.uri()
    );
    let page_one = json!({
        "data": [comment_json("777_1")],
        "paging": { "cursors": { "after": "cursor2" }, "next": next_url }
    });
    let page_two = json!({ "data": [comment_json("777_2")] });

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .and(query_param_is_missing("after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_one))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .and(query_param("after", "cursor2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_two))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let collection = client
        .collect_post_comments("777", 100, 10, 0)
        .await
        .expect("should collect both pages");

    assert_eq!(collection.comments.len(), 2, "expected 2 comments across 2 pages");
    assert_eq!(collection.comments[0].comment_id, "777_1");
    assert_eq!(collection.comments[1].comment_id, "777_2");
    assert_eq!(collection.pages_fetched, 2);
}

// ---------------------------------------------------------------------------
// Test 5 – ids repeated across pages are emitted once
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_skips_ids_repeated_across_pages() {
    let server = MockServer::start().await;

    // New comments arriving mid-listing can shift a comment onto two pages.
    let next_url = format!(
        "{}/v23.0/777/comments?access_token=test-token&after=cursor2",
        server.uri()
    );
    let page_one = json!({
        "data": [comment_json("777_1")],
        "paging": { "next": next_url }
    });
    let page_two = json!({ "data": [comment_json("777_1"), comment_json("777_2")] });

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .and(query_param_is_missing("after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_one))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .and(query_param("after", "cursor2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_two))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let collection = client
        .collect_post_comments("777", 100, 10, 0)
        .await
        .expect("should collect");

    let ids: Vec<&str> = collection
        .comments
        .iter()
        .map(|c| c.comment_id.as_str())
        .collect();
    assert_eq!(ids, vec!["777_1", "777_2"]);
}

// ---------------------------------------------------------------------------
// Test 6 – embedded replies flatten with parent back-references
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_flattens_embedded_replies() {
    let server = MockServer::start().await;

    let mut top = comment_json("777_1");
    top["comments"] = json!({
        "data": [
            comment_json("777_1_1"),
            {
                "id": "777_1_2",
                "message": "reply elsewhere",
                "parent": { "id": "777_9" }
            }
        ]
    });
    let body = json!({ "data": [top, comment_json("777_2")] });

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let collection = client
        .collect_post_comments("777", 100, 10, 0)
        .await
        .expect("should collect");

    let ids: Vec<&str> = collection
        .comments
        .iter()
        .map(|c| c.comment_id.as_str())
        .collect();
    assert_eq!(ids, vec!["777_1", "777_1_1", "777_1_2", "777_2"]);
    assert_eq!(collection.comments[0].parent_id, None);
    assert_eq!(
        collection.comments[1].parent_id.as_deref(),
        Some("777_1"),
        "embedded reply should inherit its enclosing comment id"
    );
    assert_eq!(
        collection.comments[2].parent_id.as_deref(),
        Some("777_9"),
        "an explicit parent object should win over the inherited id"
    );
}

// ---------------------------------------------------------------------------
// Test 7 – invalid token envelope, no retry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_maps_oauth_envelope_to_invalid_token_without_retrying() {
    let server = MockServer::start().await;

    let body = json!({
        "error": {
            "message": "Invalid OAuth access token.",
            "type": "OAuthException",
            "code": 190
        }
    });

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .respond_with(ResponseTemplate::new(400).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    // Retries enabled to prove a rejected token is a hard stop.
    let client = test_client_with_retries(&server.uri(), 2);
    let result = client.collect_post_comments("777", 100, 10, 0).await;

    let err = result.expect_err("expected Err for a rejected token");
    match err {
        GraphError::InvalidToken(message) => {
            assert!(
                message.contains("Invalid OAuth access token"),
                "expected the Graph message to surface, got: {message}"
            );
        }
        other => panic!("expected GraphError::InvalidToken, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test 8 – missing post envelope
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_maps_unsupported_get_envelope_to_not_found() {
    let server = MockServer::start().await;

    let body = json!({
        "error": {
            "message": "Unsupported get request. Object with ID '777' does not exist",
            "type": "GraphMethodException",
            "code": 100,
            "error_subcode": 33
        }
    });

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .respond_with(ResponseTemplate::new(400).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.collect_post_comments("777", 100, 10, 0).await;

    assert!(
        matches!(result.unwrap_err(), GraphError::NotFound(_)),
        "expected GraphError::NotFound"
    );
}

// ---------------------------------------------------------------------------
// Test 9 – rate-limit envelope honors Retry-After
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_maps_throttle_envelope_to_rate_limited() {
    let server = MockServer::start().await;

    let body = json!({
        "error": {
            "message": "Application request limit reached",
            "type": "OAuthException",
            "code": 4
        }
    });

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(&body)
                .insert_header("Retry-After", "30"),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.collect_post_comments("777", 100, 10, 0).await;

    match result.unwrap_err() {
        GraphError::RateLimited {
            retry_after_secs, ..
        } => {
            assert_eq!(
                retry_after_secs, 30,
                "retry_after_secs should match the Retry-After header"
            );
        }
        other => panic!("expected GraphError::RateLimited, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test 10 – malformed 2xx body
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_propagates_malformed_json_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.collect_post_comments("777", 100, 10, 0).await;

    assert!(
        matches!(result.unwrap_err(), GraphError::Deserialize { .. }),
        "expected GraphError::Deserialize"
    );
}

// ---------------------------------------------------------------------------
// Test 11 – transient 503 is retried and succeeds
// ---------------------------------------------------------------------------

/// Uses `wiremock`'s `up_to_n_times` to serve 503 exactly once, then fall
/// through to the 200 mock.
#[tokio::test]
async fn collect_retries_after_503_and_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(&json!({ "data": [comment_json("777_1")] })),
        )
        .mount(&server)
        .await;

    // 1 retry and zero back-off base so the test doesn't sleep.
    let client = test_client_with_retries(&server.uri(), 1);
    let result = client.collect_post_comments("777", 100, 10, 0).await;

    assert!(result.is_ok(), "expected Ok after retry, got: {result:?}");
    assert_eq!(result.unwrap().comments.len(), 1);
}

// ---------------------------------------------------------------------------
// Test 12 – bare 5xx without an envelope
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_propagates_unexpected_status_for_bare_5xx() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.collect_post_comments("777", 100, 10, 0).await;

    match result.unwrap_err() {
        GraphError::UnexpectedStatus { status, url } => {
            assert_eq!(status, 503);
            assert!(
                !url.contains("test-token"),
                "error text must not leak the access token: {url}"
            );
        }
        other => panic!("expected GraphError::UnexpectedStatus, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test 13 – second-page failure discards the first page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_second_page_failure_propagates_error() {
    let server = MockServer::start().await;

    let next_url = format!(
        "{}/v23.0/777/comments?access_token=test-token&after=cursor_fail",
        server.uri()
    );
    let page_one = json!({
        "data": [comment_json("777_1")],
        "paging": { "next": next_url }
    });

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .and(query_param_is_missing("after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_one))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .and(query_param("after", "cursor_fail"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.collect_post_comments("777", 100, 10, 0).await;

    assert!(
        matches!(result.unwrap_err(), GraphError::UnexpectedStatus { status: 503, .. }),
        "expected the page-2 failure to surface with no partial results"
    );
}

// ---------------------------------------------------------------------------
// Test 14 – pagination guard stops runaway next chains
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_stops_at_the_pagination_limit() {
    let server = MockServer::start().await;

    // Every page points at another page; the guard has to pull the plug.
    let next_url = format!(
        "{}/v23.0/777/comments?access_token=test-token&after=loop",
        server.uri()
    );
    let body = json!({
        "data": [comment_json("777_1")],
        "paging": { "next": next_url }
    });

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.collect_post_comments("777", 100, 3, 0).await;

    match result.unwrap_err() {
        GraphError::PaginationLimit { post_id, max_pages } => {
            assert_eq!(post_id, "777");
            assert_eq!(max_pages, 3);
        }
        other => panic!("expected GraphError::PaginationLimit, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test 15 – 401 envelope with an unrecognized code
// ---------------------------------------------------------------------------

/// The Graph API introduces error codes without notice; when neither the code
/// nor the type is recognized, the 401 status alone carries the
/// classification.
#[tokio::test]
async fn collect_maps_unrecognized_401_envelope_to_invalid_token() {
    let server = MockServer::start().await;

    let body = json!({
        "error": {
            "message": "Session key has expired.",
            "type": "SessionException",
            "code": 9999
        }
    });

    Mock::given(method("GET"))
        .and(path("/v23.0/777/comments"))
        .respond_with(ResponseTemplate::new(401).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.collect_post_comments("777", 100, 10, 0).await;

    match result.unwrap_err() {
        GraphError::InvalidToken(message) => {
            assert!(
                message.contains("Session key has expired"),
                "expected the Graph message to surface, got: {message}"
            );
        }
        other => panic!("expected GraphError::InvalidToken, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test 16 – transport error text carries no URL
// ---------------------------------------------------------------------------

/// Nothing listens on port 1, so the request dies at connect time. The
/// resulting error renders without the request URL, whose query string holds
/// the access token.
#[tokio::test]
async fn collect_connection_error_text_excludes_the_token() {
    let client = test_client("http://127.0.0.1:1");
    let result = client.collect_post_comments("777", 100, 10, 0).await;

    let err = result.unwrap_err();
    assert!(
        matches!(err, GraphError::Http(_)),
        "expected GraphError::Http, got: {err:?}"
    );
    let display = err.to_string();
    assert!(
        !display.contains("test-token"),
        "transport error text must not leak the access token: {display}"
    );
}
