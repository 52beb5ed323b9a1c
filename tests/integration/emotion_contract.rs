//! Hugging Face Inference API contract tests for the emotion classifier.

use empath::emotion::{
    EmotionClassifier, EmotionResolver, EmotionScore, HuggingFaceConfig,
    HuggingFaceEmotionClassifier, ResolveOptions,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/models/SamLowe/roberta-base-go_emotions";

fn classifier(server: &MockServer) -> HuggingFaceEmotionClassifier {
    let config = HuggingFaceConfig::new("hf_test").with_base_url(server.uri());
    HuggingFaceEmotionClassifier::new(config).unwrap()
}

#[tokio::test]
async fn request_asks_for_all_labels() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("authorization", "Bearer hf_test"))
        .and(body_partial_json(json!({
            "inputs": "I finally finished my thesis!",
            "parameters": {"top_k": null},
            "options": {"wait_for_model": true}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
            {"label": "joy", "score": 0.91},
            {"label": "pride", "score": 0.05},
            {"label": "neutral", "score": 0.02}
        ]])))
        .expect(1)
        .mount(&server)
        .await;

    let scores = classifier(&server)
        .classify("I finally finished my thesis!")
        .await
        .unwrap();
    assert_eq!(scores.len(), 3);
    assert_eq!(scores[0], EmotionScore::new("joy", 0.91));
}

#[tokio::test]
async fn flat_response_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"label": "sadness", "score": 0.7}
        ])))
        .mount(&server)
        .await;

    let scores = classifier(&server).classify("I miss her").await.unwrap();
    assert_eq!(scores, vec![EmotionScore::new("sadness", 0.7)]);
}

#[tokio::test]
async fn http_error_is_classification_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(json!({"error": "Model is currently loading"})),
        )
        .mount(&server)
        .await;

    let err = classifier(&server).classify("hello").await.unwrap_err();
    assert_eq!(err.code(), "CLASSIFICATION_FAILED");
    assert!(format!("{err}").contains("Model is currently loading"));
}

#[tokio::test]
async fn slow_upstream_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([[{"label": "joy", "score": 0.9}]]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let classifier = HuggingFaceEmotionClassifier::new(
        HuggingFaceConfig::new("hf_test")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(200)),
    )
    .unwrap();
    let err = classifier.classify("hello").await.unwrap_err();
    assert_eq!(err.code(), "TIMEOUT_ERROR");
}

#[tokio::test]
async fn stalled_body_is_timeout() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    const HEAD: &[u8] = b"HTTP/1.1 200 OK\r\n\
        content-type: application/json\r\n\
        content-length: 64\r\n\r\n[[";

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let upstream = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        socket.write_all(HEAD).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let classifier = HuggingFaceEmotionClassifier::new(
        HuggingFaceConfig::new("hf_test")
            .with_base_url(format!("http://{addr}"))
            .with_timeout(Duration::from_millis(300)),
    )
    .unwrap();
    let err = classifier.classify("hello").await.unwrap_err();
    assert_eq!(err.code(), "TIMEOUT_ERROR");
    upstream.abort();
}

#[tokio::test]
async fn resolver_applies_neutral_override_to_live_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
            {"label": "neutral", "score": 0.4},
            {"label": "joy", "score": 0.35},
            {"label": "sadness", "score": 0.2}
        ]])))
        .mount(&server)
        .await;

    let resolver = EmotionResolver::new(Arc::new(classifier(&server)));
    let emotion = resolver
        .resolve("It was fine.", &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(emotion.label, "joy");
    assert!((emotion.confidence - 35.0).abs() < 1e-9);
}
