//! The upstream relay: attaches the credential and forwards prompts.

use crate::config::ProxyConfig;
use crate::error::ApiError;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Forwards compiled prompts to the upstream model. This is the only
/// component in the system that ever reads the secret.
pub struct Relay {
    client: Client,
    upstream_url: Url,
    api_key: Option<String>,
    timeout: Duration,
}

impl Relay {
    pub fn new(config: &ProxyConfig) -> Self {
        Self {
            client: Client::new(),
            upstream_url: config.upstream_url.clone(),
            api_key: config.api_key.clone(),
            timeout: config.upstream_timeout(),
        }
    }

    /// Sends one generateContent request and returns the upstream envelope
    /// verbatim. Failures collapse into `ApiError` so callers never see
    /// upstream detail.
    pub async fn forward(&self, text: &str) -> Result<Value, ApiError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            error!("GEMINI_KEY is not set; refusing to call upstream");
            ApiError::Credential
        })?;

        let payload = json!({
            "contents": [{ "parts": [{ "text": text }] }]
        });

        debug!(prompt_chars = text.len(), "Forwarding prompt upstream");
        let response = self
            .client
            .post(self.upstream_url.clone())
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Upstream request failed");
                ApiError::Upstream(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            // The upstream body goes to the log for the operator; the client
            // only ever sees the generic error line.
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Upstream returned an error");
            return Err(ApiError::Upstream(format!("upstream status {}", status)));
        }

        let envelope: Value = response.json().await.map_err(|e| {
            error!(error = %e, "Upstream response body is not JSON");
            ApiError::Upstream(e.to_string())
        })?;
        info!("Upstream call succeeded");
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, api_key: Option<&str>) -> ProxyConfig {
        ProxyConfig {
            listen_addr: "127.0.0.1:0".parse().expect("test addr is valid"),
            upstream_url: server.uri().parse().expect("mock URI is valid"),
            api_key: api_key.map(String::from),
            upstream_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_forward_attaches_credential_and_wraps_prompt() {
        // 1. Arrange
        let mock_server = MockServer::start().await;
        let envelope = json!({"candidates": [{"content": {"parts": [{"text": "{}"}]}}]});
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "the compiled prompt" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope.clone()))
            .expect(1)
            .mount(&mock_server)
            .await;
        let relay = Relay::new(&config_for(&mock_server, Some("test-key")));

        // 2. Act
        let result = relay.forward("the compiled prompt").await;

        // 3. Assert: the envelope comes back untouched.
        assert_eq!(result.expect("forward should succeed"), envelope);
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_calling_upstream() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;
        let relay = Relay::new(&config_for(&mock_server, None));

        let err = relay.forward("prompt").await.expect_err("must fail");
        assert!(matches!(err, ApiError::Credential));
    }

    #[tokio::test]
    async fn test_upstream_rejection_collapses_to_upstream_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"error": {"message": "API key not valid"}})),
            )
            .mount(&mock_server)
            .await;
        let relay = Relay::new(&config_for(&mock_server, Some("bad-key")));

        let err = relay.forward("prompt").await.expect_err("must fail");
        assert!(matches!(err, ApiError::Upstream(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_non_json_upstream_body_is_an_upstream_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&mock_server)
            .await;
        let relay = Relay::new(&config_for(&mock_server, Some("test-key")));

        let err = relay.forward("prompt").await.expect_err("must fail");
        assert!(matches!(err, ApiError::Upstream(_)), "got {:?}", err);
    }
}
