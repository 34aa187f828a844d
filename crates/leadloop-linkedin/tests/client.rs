//! Integration tests for `LinkedinClient` against a `wiremock` server.
//!
//! No real network traffic is made; each test stands up a local mock server
//! and points the client's base URL at it.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadloop_core::{Account, ActionType};
use leadloop_linkedin::{LinkedinClient, LinkedinError};

fn test_account() -> Account {
    Account {
        id: 1,
        user_id: 1,
        label: "test".to_string(),
        access_token: "token-123".to_string(),
    }
}

/// Client with no retries, for error-shape tests.
fn test_client(base_url: &str) -> LinkedinClient {
    LinkedinClient::new(base_url, 5, "leadloop-test/0.1", 0, 0)
        .expect("failed to build test LinkedinClient")
}

fn comment_json(urn: &str, text: &str, created_at: i64) -> serde_json::Value {
    json!({
        "urn": urn,
        "message": { "text": text },
        "actor": {
            "urn": "urn:li:person:abc",
            "name": "Ana Souza",
            "headline": "Growth at Example"
        },
        "createdAt": created_at
    })
}

// ---------------------------------------------------------------------------
// fetch_comments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_comments_returns_oldest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/socialActions/urn:li:share:1/comments"))
        .and(header("authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "elements": [
                comment_json("urn:li:comment:3", "third", 3000),
                comment_json("urn:li:comment:1", "first", 1000),
                comment_json("urn:li:comment:2", "second", 2000),
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let comments = client
        .fetch_comments(&test_account(), "urn:li:share:1", None)
        .await
        .expect("fetch should succeed");

    let urns: Vec<&str> = comments.iter().map(|c| c.urn.as_str()).collect();
    assert_eq!(
        urns,
        vec!["urn:li:comment:1", "urn:li:comment:2", "urn:li:comment:3"]
    );
    assert_eq!(comments[0].text, "first");
    assert_eq!(comments[0].author_name, "Ana Souza");
}

#[tokio::test]
async fn fetch_comments_drops_everything_up_to_checkpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/socialActions/urn:li:share:1/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "elements": [
                comment_json("urn:li:comment:1", "first", 1000),
                comment_json("urn:li:comment:2", "second", 2000),
                comment_json("urn:li:comment:3", "third", 3000),
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let comments = client
        .fetch_comments(&test_account(), "urn:li:share:1", Some("urn:li:comment:2"))
        .await
        .expect("fetch should succeed");

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].urn, "urn:li:comment:3");
}

#[tokio::test]
async fn fetch_comments_with_unknown_checkpoint_returns_all() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/socialActions/urn:li:share:1/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "elements": [comment_json("urn:li:comment:9", "newest", 9000)]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let comments = client
        .fetch_comments(&test_account(), "urn:li:share:1", Some("urn:li:comment:5"))
        .await
        .expect("fetch should succeed");

    assert_eq!(comments.len(), 1);
}

#[tokio::test]
async fn fetch_comments_rate_limited_after_retries_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/socialActions/urn:li:share:1/comments"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .fetch_comments(&test_account(), "urn:li:share:1", None)
        .await;

    assert!(
        matches!(
            result,
            Err(LinkedinError::RateLimited {
                retry_after_secs: 30
            })
        ),
        "expected RateLimited, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_comments_retries_rate_limit_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/socialActions/urn:li:share:1/comments"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/socialActions/urn:li:share:1/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "elements": [] })))
        .mount(&server)
        .await;

    // 1 retry, zero backoff so the test is fast.
    let client = LinkedinClient::new(&server.uri(), 5, "leadloop-test/0.1", 1, 0)
        .expect("failed to build client");
    let comments = client
        .fetch_comments(&test_account(), "urn:li:share:1", None)
        .await
        .expect("retry should recover");

    assert!(comments.is_empty());
}

#[tokio::test]
async fn fetch_comments_unauthorized_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/socialActions/urn:li:share:1/comments"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = LinkedinClient::new(&server.uri(), 5, "leadloop-test/0.1", 3, 0)
        .expect("failed to build client");
    let result = client
        .fetch_comments(&test_account(), "urn:li:share:1", None)
        .await;

    assert!(
        matches!(result, Err(LinkedinError::Unauthorized { status: 401 })),
        "expected Unauthorized, got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// check_connection_degree
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_degree_connection_is_detected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/connections/urn:li:person:abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "distance": "DISTANCE_1" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let connected = client
        .check_connection_degree(&test_account(), "urn:li:person:abc")
        .await
        .expect("check should succeed");
    assert!(connected);
}

#[tokio::test]
async fn second_degree_and_unknown_profiles_are_not_connections() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/connections/urn:li:person:far"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "distance": "DISTANCE_2" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/connections/urn:li:person:ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(!client
        .check_connection_degree(&test_account(), "urn:li:person:far")
        .await
        .unwrap());
    assert!(!client
        .check_connection_degree(&test_account(), "urn:li:person:ghost")
        .await
        .unwrap());
}

// ---------------------------------------------------------------------------
// perform_action
// ---------------------------------------------------------------------------

#[tokio::test]
async fn like_returns_body_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/socialActions/urn:li:comment:5/likes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "like-900" })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let id = client
        .perform_action(&test_account(), ActionType::Like, "urn:li:comment:5", None)
        .await
        .expect("like should succeed");
    assert_eq!(id, "like-900");
}

#[tokio::test]
async fn reply_falls_back_to_restli_header_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/socialActions/urn:li:comment:5/comments"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("x-restli-id", "comment-77")
                .set_body_string("{}"),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let id = client
        .perform_action(
            &test_account(),
            ActionType::Reply,
            "urn:li:comment:5",
            Some("thanks for the interest!"),
        )
        .await
        .expect("reply should succeed");
    assert_eq!(id, "comment-77");
}

#[tokio::test]
async fn action_without_any_id_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/invitations"))
        .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .perform_action(
            &test_account(),
            ActionType::Invite,
            "urn:li:person:abc",
            None,
        )
        .await;

    assert!(
        matches!(result, Err(LinkedinError::MissingActionId { .. })),
        "expected MissingActionId, got: {result:?}"
    );
}

#[tokio::test]
async fn server_error_surfaces_as_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/messages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client
        .perform_action(
            &test_account(),
            ActionType::Dm,
            "urn:li:person:abc",
            Some("hello"),
        )
        .await;

    assert!(
        matches!(result, Err(LinkedinError::UnexpectedStatus { status: 500, .. })),
        "expected UnexpectedStatus, got: {result:?}"
    );
}
