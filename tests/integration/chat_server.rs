//! HTTP transport tests against a live `ChatServer` on an ephemeral port.

use empath::config::ServerConfig;
use empath::server::{ChatResponse, ChatServer, ErrorResponse, GENERIC_ERROR_DETAIL};
use serde_json::json;

use crate::helpers::{Harness, harness, sarcastic, sincere};

fn local_config(expose_error_details: bool) -> ServerConfig {
    ServerConfig {
        port: 0,
        expose_error_details,
        ..ServerConfig::default()
    }
}

async fn start(h: &Harness, expose_error_details: bool) -> ChatServer {
    ChatServer::start(h.therapist.clone(), &local_config(expose_error_details))
        .await
        .unwrap()
}

fn chat_url(server: &ChatServer) -> String {
    format!("http://{}/api/chat", server.addr())
}

#[tokio::test]
async fn chat_returns_reply_and_analysis() {
    let h = harness(
        sarcastic(),
        &[("joy", 0.7), ("anger", 0.2), ("neutral", 0.1)],
        "  That sounds really frustrating. What made today so hard?  ",
    );
    let server = start(&h, false).await;
    assert_ne!(server.port(), 0);

    let resp = reqwest::Client::new()
        .post(chat_url(&server))
        .json(&json!({
            "message": "Oh great, another Monday.",
            "conversation_history": [
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello! How are you?"}
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        body["response"],
        "That sounds really frustrating. What made today so hard?"
    );
    assert_eq!(body["sarcasm"]["sarcastic"], true);
    assert_eq!(body["emotion"]["label"], "anger");

    let typed: ChatResponse = serde_json::from_value(body).unwrap();
    assert!((typed.emotion.confidence - 20.0).abs() < 1e-9);
}

#[tokio::test]
async fn history_is_optional() {
    let h = harness(sincere(), &[("joy", 0.9)], "Great!");
    let server = start(&h, false).await;

    let resp = reqwest::Client::new()
        .post(chat_url(&server))
        .json(&json!({"message": "I got the job"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(h.log.calls(), vec!["sarcasm", "emotion", "reply"]);
}

#[tokio::test]
async fn empty_message_is_400() {
    let h = harness(sincere(), &[("joy", 0.9)], "unused");
    let server = start(&h, false).await;

    let resp = reqwest::Client::new()
        .post(chat_url(&server))
        .json(&json!({"message": "   ", "conversation_history": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(body.detail, "Empty message");
    assert!(h.log.calls().is_empty());
}

#[tokio::test]
async fn pipeline_failure_is_opaque_500() {
    let h = harness(None, &[("joy", 0.9)], "unused");
    let server = start(&h, false).await;

    let resp = reqwest::Client::new()
        .post(chat_url(&server))
        .json(&json!({"message": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(body.detail, GENERIC_ERROR_DETAIL);
}

#[tokio::test]
async fn dev_mode_exposes_failure_detail() {
    let h = harness(None, &[("joy", 0.9)], "unused");
    let server = start(&h, true).await;

    let resp = reqwest::Client::new()
        .post(chat_url(&server))
        .json(&json!({"message": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert!(body.detail.contains("scripted parse failure"));
}

#[tokio::test]
async fn missing_message_field_is_422() {
    let h = harness(sincere(), &[("joy", 0.9)], "unused");
    let server = start(&h, false).await;

    let resp = reqwest::Client::new()
        .post(chat_url(&server))
        .json(&json!({"conversation_history": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    assert!(h.log.calls().is_empty());
}

#[tokio::test]
async fn cors_allows_any_origin_by_default() {
    let h = harness(sincere(), &[("joy", 0.9)], "Hi");
    let server = start(&h, false).await;

    let resp = reqwest::Client::new()
        .post(chat_url(&server))
        .header("origin", "http://localhost:5173")
        .json(&json!({"message": "hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
