//! Wire-level checks of the remote backend against a local mock service.

use serde_json::json;
use simscribe::{
    BackendError, LLMBackend, RemoteBackend, RemoteConfig, SimscribeError, TextGenerator,
    summarize_simulation,
};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "deepseek-chat",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

/// The blocking client owns its own runtime, so it must live off the async executor.
async fn complete_against(server: &MockServer, prompt: &str) -> simscribe::Result<String> {
    let config = RemoteConfig::new("sk-test", server.uri()).expect("valid config");
    let prompt = prompt.to_string();
    tokio::task::spawn_blocking(move || -> simscribe::Result<String> {
        RemoteBackend::new(config)?.complete(&prompt)
    })
    .await
    .expect("blocking task panicked")
}

#[tokio::test]
async fn sends_one_user_message_and_strips_the_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "deepseek-chat",
            "temperature": 0.3,
            "messages": [{ "role": "user", "content": "Rate the tavern" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("\n  7 out of 10  \n")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = complete_against(&server, "Rate the tavern").await.unwrap();
    assert_eq!(reply, "7 out of 10");
    assert_eq!(simscribe::extract_min_rating(&reply), Some(7));
}

#[tokio::test]
async fn non_success_status_is_a_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&server)
        .await;

    match complete_against(&server, "hello").await {
        Err(SimscribeError::Backend(BackendError::Status { status, body })) => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn reply_without_choices_is_an_empty_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    assert!(matches!(
        complete_against(&server, "hello").await,
        Err(SimscribeError::Backend(BackendError::EmptyCompletion))
    ));
}

#[tokio::test]
async fn summary_goes_through_the_remote_backend() {
    let server = MockServer::start().await;
    let log = "Toblen Stonehill action: I go to the market.";
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "messages": [{
                "role": "user",
                "content": format!("Summarize the simulation loop:\n\n{log}")
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Toblen went shopping.")))
        .expect(1)
        .mount(&server)
        .await;

    let config = RemoteConfig::new("sk-test", server.uri()).unwrap();
    let summary = tokio::task::spawn_blocking(move || -> simscribe::Result<String> {
        let remote = RemoteBackend::new(config)?;
        let generator = TextGenerator::new(Arc::new(remote));
        summarize_simulation(&generator, log)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(summary, "Toblen went shopping.");
}

#[tokio::test]
async fn unreachable_service_is_a_backend_error() {
    // nothing listens on port 1
    let config = RemoteConfig::new("sk-test", "http://127.0.0.1:1").unwrap();
    let result = tokio::task::spawn_blocking(move || -> simscribe::Result<String> {
        RemoteBackend::new(config)?.complete("hi")
    })
    .await
    .unwrap();
    assert!(matches!(
        result,
        Err(SimscribeError::Backend(BackendError::Http(_)))
    ));
}
