//! Integration Tests
//!
//! End-to-end tests that run the full analysis pipeline (compile, infer,
//! validate) against a mock analyze endpoint standing in for the proxy.

use crate::actors::messages::AppError;
use crate::actors::session::SessionHandle;
use crate::config::CoreConfig;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Point the pipeline at a mock analyze endpoint.
fn config_for(server: &MockServer) -> CoreConfig {
    CoreConfig {
        analyze_url: Url::parse(&format!("{}/api/analyze", server.uri()))
            .expect("mock server URI is valid"),
        request_timeout_secs: 5,
        ocr_language: "eng".to_string(),
    }
}

/// A complete, valid analysis reply as the model's generated text.
fn analysis_text(tone: &str) -> String {
    json!({
        "tone": tone,
        "score": 8,
        "explanation": "One word followed by a period reads as clipped and distant.",
        "confidence": 85,
        "replies": [
            {"type": "Confident", "msg": "All good here. Let me know when you're free."},
            {"type": "Calm", "msg": "Got it."},
            {"type": "Witty", "msg": "a whole period?? who hurt you"}
        ]
    })
    .to_string()
}

/// Wrap generated text in the envelope shape the upstream model returns.
fn envelope(text: &str) -> Value {
    json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
}

// ============================================================================
// End-to-End Scenarios
// ============================================================================

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_message_produces_full_analysis() {
        // 1. Arrange: the endpoint answers with a well-formed analysis.
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope(&analysis_text("Passive-Aggressive"))),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        let session = SessionHandle::new(&config_for(&mock_server));

        // 2. Act
        let record = session
            .submit("k.".to_string())
            .await
            .expect("analysis should succeed");

        // 3. Assert: every contract field survived validation.
        assert_eq!(record.result.tone, "Passive-Aggressive");
        assert_eq!(record.result.score, 8);
        assert_eq!(record.result.confidence, 85);
        assert_eq!(record.result.replies.len(), 3);
        let labels: Vec<&str> = record
            .result
            .replies
            .iter()
            .map(|r| r.tone.label())
            .collect();
        assert_eq!(labels, vec!["Confident", "Calm", "Witty"]);

        let latest = session.latest().await.expect("latest should answer");
        assert_eq!(latest.expect("a record should be stored").id, record.id);
    }

    #[tokio::test]
    async fn test_conversational_reply_fails_as_invalid_json() {
        // The model ignored the output contract and chatted instead.
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope("Sure thing, here's my take on that message!")),
            )
            .mount(&mock_server)
            .await;
        let session = SessionHandle::new(&config_for(&mock_server));

        let err = session
            .submit("hey".to_string())
            .await
            .expect_err("a conversational reply must not validate");
        assert!(matches!(err, AppError::InvalidJson(_)), "got {:?}", err);

        // Nothing was stored.
        assert!(session.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_preserves_previous_result() {
        // 1. Arrange: the first request succeeds, then the endpoint starts
        // failing without a structured error body.
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(&analysis_text("Warm"))),
            )
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        let session = SessionHandle::new(&config_for(&mock_server));

        // 2. Act
        let first = session
            .submit("first".to_string())
            .await
            .expect("first request should succeed");
        let err = session
            .submit("second".to_string())
            .await
            .expect_err("second request must fail");

        // 3. Assert: the failure is a transport error and the stored record
        // is untouched.
        assert!(matches!(err, AppError::Transport(_)), "got {:?}", err);
        let latest = session.latest().await.unwrap().expect("record survives");
        assert_eq!(latest.id, first.id);
        assert_eq!(latest.result.tone, "Warm");
    }

    #[tokio::test]
    async fn test_structured_error_body_is_classified_as_upstream() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .respond_with(
                ResponseTemplate::new(502)
                    .set_body_json(json!({"error": "Upstream model request failed"})),
            )
            .mount(&mock_server)
            .await;
        let session = SessionHandle::new(&config_for(&mock_server));

        let err = session
            .submit("hello".to_string())
            .await
            .expect_err("must fail");
        assert!(matches!(err, AppError::Upstream(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_overlapping_requests_keep_only_the_last_submitted() {
        // 1. Arrange: the first request is slow; the second is submitted
        // while the first is still in flight and resolves immediately.
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .and(body_string_contains("slow message"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope(&analysis_text("Stale")))
                    .set_delay(Duration::from_millis(400)),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/analyze"))
            .and(body_string_contains("fast message"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(&analysis_text("Fresh"))),
            )
            .mount(&mock_server)
            .await;
        let session = SessionHandle::new(&config_for(&mock_server));

        // 2. Act
        let slow = {
            let session = session.clone();
            tokio::spawn(async move { session.submit("slow message".to_string()).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        let fast = {
            let session = session.clone();
            tokio::spawn(async move { session.submit("fast message".to_string()).await })
        };

        let fast = fast.await.unwrap().expect("fast request should succeed");
        let slow = slow.await.unwrap().expect("slow request still resolves");
        assert_eq!(slow.result.tone, "Stale");

        // 3. Assert: the late result of the superseded request was discarded.
        let latest = session.latest().await.unwrap().unwrap();
        assert_eq!(latest.id, fast.id);
        assert_eq!(latest.result.tone, "Fresh");
    }
}
