//! Integration tests for `OutreachClient` against a `wiremock` server.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadloop_core::OutreachContext;
use leadloop_outreach::{OutreachClient, OutreachClientError};

fn test_context() -> OutreachContext {
    OutreachContext {
        campaign_name: "Guia SEO".to_string(),
        post_text: None,
        comment_text: "Quero o guia, me manda!".to_string(),
        lead_name: "Ana".to_string(),
        persona_prompt: None,
        reply_template: None,
        dm_template: None,
        lead_magnet: Some("https://example.com/guia".to_string()),
    }
}

fn chat_response(content: &str) -> serde_json::Value {
    json!({
        "choices": [
            { "message": { "role": "assistant", "content": content } }
        ]
    })
}

#[tokio::test]
async fn generates_reply_and_dm_from_json_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer key-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(
            "{\"reply\": \"Enviei no privado!\", \"dm\": \"Oi Ana, segue o guia.\"}",
        )))
        .mount(&server)
        .await;

    let client = OutreachClient::new(&server.uri(), "key-123", "test-model", 5)
        .expect("failed to build client");
    let copy = client
        .generate_copy(&test_context())
        .await
        .expect("generation should succeed");

    assert_eq!(copy.reply, "Enviei no privado!");
    assert_eq!(copy.dm, "Oi Ana, segue o guia.");
}

#[tokio::test]
async fn fenced_json_content_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(
            "```json\n{\"reply\": \"ok\", \"dm\": \"ok dm\"}\n```",
        )))
        .mount(&server)
        .await;

    let client = OutreachClient::new(&server.uri(), "key-123", "test-model", 5)
        .expect("failed to build client");
    let copy = client.generate_copy(&test_context()).await.unwrap();
    assert_eq!(copy.reply, "ok");
    assert_eq!(copy.dm, "ok dm");
}

#[tokio::test]
async fn api_error_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = OutreachClient::new(&server.uri(), "key-123", "test-model", 5)
        .expect("failed to build client");
    let result = client.generate_copy(&test_context()).await;

    assert!(
        matches!(result, Err(OutreachClientError::Api { status: 429, .. })),
        "expected Api error, got: {result:?}"
    );
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = OutreachClient::new(&server.uri(), "key-123", "test-model", 5)
        .expect("failed to build client");
    let result = client.generate_copy(&test_context()).await;

    assert!(
        matches!(result, Err(OutreachClientError::EmptyResponse)),
        "expected EmptyResponse, got: {result:?}"
    );
}

#[tokio::test]
async fn non_json_content_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_response("Sorry, I can't help with that.")),
        )
        .mount(&server)
        .await;

    let client = OutreachClient::new(&server.uri(), "key-123", "test-model", 5)
        .expect("failed to build client");
    let result = client.generate_copy(&test_context()).await;

    assert!(
        matches!(result, Err(OutreachClientError::Parse { .. })),
        "expected Parse error, got: {result:?}"
    );
}
