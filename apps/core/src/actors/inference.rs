use crate::actors::messages::{ActorError, AppError, InferenceMessage};
use crate::actors::traits::InferenceActor;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Extra time the handle waits beyond the request timeout before giving up
/// on the actor's reply.
const HANDLE_GRACE: Duration = Duration::from_secs(5);

/// A handle to the `InferenceActor`.
///
/// This struct provides a public, cloneable interface for sending messages to
/// the running inference actor. It abstracts away the `mpsc::Sender`.
#[derive(Clone)]
pub struct InferenceActorHandle {
    sender: mpsc::Sender<InferenceMessage>,
    request_timeout: Duration,
}

impl InferenceActorHandle {
    /// Creates a new inference actor and returns a handle to it.
    ///
    /// This will spawn the `InferenceActorRunner` in a new Tokio task.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full URL of the analyze endpoint on the proxy.
    /// * `request_timeout` - Upper bound for one round trip to the proxy.
    pub fn new(endpoint: String, request_timeout: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let actor = InferenceActorRunner::new(receiver, endpoint, request_timeout);
        tokio::spawn(async move { actor.run().await });
        Self {
            sender,
            request_timeout,
        }
    }
}

#[async_trait]
impl InferenceActor for InferenceActorHandle {
    async fn analyze(&self, prompt: String) -> Result<Value, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = InferenceMessage::Analyze {
            prompt,
            responder: send,
        };

        self.sender
            .send(msg)
            .await
            .map_err(|e| ActorError::Channel(e.to_string()))?;
        timeout(self.request_timeout + HANDLE_GRACE, recv)
            .await?
            .map_err(|e| AppError::Actor(ActorError::Channel(e.to_string())))?
    }
}

// --- Actor Runner (Internal Logic) ---
struct InferenceActorRunner {
    receiver: mpsc::Receiver<InferenceMessage>,
    client: Client,
    endpoint: String,
    request_timeout: Duration,
}

impl InferenceActorRunner {
    fn new(
        receiver: mpsc::Receiver<InferenceMessage>,
        endpoint: String,
        request_timeout: Duration,
    ) -> Self {
        Self {
            receiver,
            client: Client::new(),
            endpoint,
            request_timeout,
        }
    }

    async fn run(mut self) {
        info!("InferenceActor started");

        while let Some(msg) = self.receiver.recv().await {
            self.handle_message(msg).await;
        }

        info!("InferenceActor stopped");
    }

    async fn handle_message(&mut self, msg: InferenceMessage) {
        match msg {
            InferenceMessage::Analyze { prompt, responder } => {
                let result = self.request_analysis(prompt).await;
                let _ = responder.send(result);
            }
        }
    }

    /// Performs the single outbound call for one analysis request. The reply
    /// envelope is returned verbatim; nothing is retried here.
    async fn request_analysis(&self, prompt: String) -> Result<Value, AppError> {
        info!(prompt_chars = prompt.len(), "Dispatching analysis prompt");
        debug!(prompt = %prompt, "Full compiled prompt");

        let payload = serde_json::json!({ "text": prompt });
        let request_future = self.client.post(&self.endpoint).json(&payload).send();

        let res = timeout(self.request_timeout, request_future).await??;

        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            // A structured {error} body means the proxy itself answered and
            // the upstream path failed; anything else is plain transport.
            if let Some(message) = structured_error(&body) {
                error!(%status, %message, "Analyze endpoint reported an upstream failure");
                return Err(AppError::Upstream(format!(
                    "analyze endpoint returned {}: {}",
                    status, message
                )));
            }
            error!(%status, "Analyze endpoint returned an unexpected status");
            return Err(AppError::Transport(format!(
                "analyze endpoint returned status {}",
                status
            )));
        }

        let envelope: Value = res
            .json()
            .await
            .map_err(|e| AppError::Transport(format!("could not read response envelope: {}", e)))?;

        Ok(envelope)
    }
}

/// Extracts the message from a `{"error": "..."}` body, if that is what the
/// endpoint sent.
fn structured_error(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("error")?
        .as_str()
        .map(|s| s.to_string())
}
