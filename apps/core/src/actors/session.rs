use crate::actors::inference::InferenceActorHandle;
use crate::actors::messages::{ActorError, AppError, SessionMessage};
use crate::actors::traits::InferenceActor;
use crate::config::CoreConfig;
use crate::models::AnalysisRecord;
use crate::parse;
use crate::prompt;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Extra time the handle waits beyond the request timeout before giving up
/// on the session's reply.
const SUBMIT_GRACE: Duration = Duration::from_secs(10);

/// A handle to the `SessionActor`.
///
/// This is the primary entry point for the analysis pipeline. The session
/// owns the only piece of state in the system: the latest completed
/// `AnalysisRecord` and the generation counter that enforces
/// last-submitted-wins when requests overlap.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    request_timeout: Duration,
}

impl SessionHandle {
    /// Creates a new `SessionActor` wired to the configured analyze endpoint
    /// and returns a handle to it.
    pub fn new(config: &CoreConfig) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let inference = Arc::new(InferenceActorHandle::new(
            config.analyze_url.to_string(),
            config.request_timeout(),
        ));
        let runner = SessionRunner::new(receiver, sender.clone(), inference);
        tokio::spawn(async move { runner.run().await });
        Self {
            sender,
            request_timeout: config.request_timeout(),
        }
    }

    /// Submits one message for analysis and waits for this request's own
    /// outcome.
    ///
    /// Submitting again before a previous request resolves supersedes it:
    /// the older request still runs to completion, but its result is
    /// discarded instead of becoming the session's latest record.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn submit(&self, text: String) -> Result<AnalysisRecord, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = SessionMessage::Submit {
            text,
            responder: send,
        };
        self.sender
            .send(msg)
            .await
            .map_err(|e| ActorError::Channel(e.to_string()))?;
        timeout(self.request_timeout + SUBMIT_GRACE, recv)
            .await?
            .map_err(|e| AppError::Actor(ActorError::Channel(e.to_string())))?
    }

    /// Returns the most recent completed analysis, if any.
    pub async fn latest(&self) -> Result<Option<AnalysisRecord>, AppError> {
        let (send, recv) = oneshot::channel();
        self.sender
            .send(SessionMessage::Latest { responder: send })
            .await
            .map_err(|e| ActorError::Channel(e.to_string()))?;
        timeout(SUBMIT_GRACE, recv)
            .await?
            .map_err(|e| AppError::Actor(ActorError::Channel(e.to_string())))
    }
}

// --- Actor Runner ---
struct SessionRunner<I>
where
    I: InferenceActor,
{
    receiver: mpsc::Receiver<SessionMessage>,
    /// Cloned into pipeline tasks so completions flow back through the mailbox.
    self_sender: mpsc::Sender<SessionMessage>,
    inference: Arc<I>,
    generation: u64,
    latest: Option<AnalysisRecord>,
}

impl<I> SessionRunner<I>
where
    I: InferenceActor,
{
    fn new(
        receiver: mpsc::Receiver<SessionMessage>,
        self_sender: mpsc::Sender<SessionMessage>,
        inference: Arc<I>,
    ) -> Self {
        Self {
            receiver,
            self_sender,
            inference,
            generation: 0,
            latest: None,
        }
    }

    async fn run(mut self) {
        info!("SessionActor started");
        while let Some(msg) = self.receiver.recv().await {
            self.handle_message(msg).await;
        }
        info!("SessionActor stopped");
    }

    async fn handle_message(&mut self, msg: SessionMessage) {
        match msg {
            SessionMessage::Submit { text, responder } => {
                self.generation += 1;
                let generation = self.generation;
                info!(generation, "Analysis request submitted");

                let inference = Arc::clone(&self.inference);
                let completions = self.self_sender.clone();
                let id = Uuid::new_v4();
                let submitted_at = Utc::now();

                // The pipeline runs in its own task so a newer Submit can be
                // accepted while this request is still awaiting the network.
                tokio::spawn(async move {
                    let outcome = run_pipeline(inference, id, submitted_at, &text).await;
                    let completed = SessionMessage::Completed {
                        generation,
                        outcome,
                        responder,
                    };
                    if completions.send(completed).await.is_err() {
                        error!(generation, "Session closed before completion was delivered");
                    }
                });
            }
            SessionMessage::Completed {
                generation,
                outcome,
                responder,
            } => {
                if generation == self.generation {
                    match &outcome {
                        Ok(record) => {
                            info!(generation, request_id = %record.id, "Analysis completed");
                            self.latest = Some(record.clone());
                        }
                        Err(e) => {
                            // A failed current request leaves the previous
                            // record in place.
                            error!(generation, error = %e, "Analysis failed");
                        }
                    }
                } else {
                    info!(
                        generation,
                        current = self.generation,
                        "Discarding result for superseded request"
                    );
                }
                let _ = responder.send(outcome);
            }
            SessionMessage::Latest { responder } => {
                let _ = responder.send(self.latest.clone());
            }
        }
    }
}

/// Runs one request through the full pipeline: compile, infer, validate.
/// Stateless; every request starts fresh from the message text.
#[instrument(skip(inference, text), fields(request_id = %id))]
async fn run_pipeline<I>(
    inference: Arc<I>,
    id: Uuid,
    submitted_at: DateTime<Utc>,
    text: &str,
) -> Result<AnalysisRecord, AppError>
where
    I: InferenceActor,
{
    // 1. Compile the deterministic prompt from the message text.
    debug!("Compiling prompt");
    let prompt = prompt::compile(text);

    // 2. Await the single network call through the proxy.
    debug!("Awaiting inference");
    let envelope = inference.analyze(prompt).await?;

    // 3. Validate the envelope into a strict result.
    debug!("Validating model reply");
    let result = parse::parse_analysis(&envelope)?;

    Ok(AnalysisRecord {
        id,
        submitted_at,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    // --- Mock Actors ---

    /// Scripted inference: picks a response by substring of the compiled
    /// prompt, after an optional delay. The embedded message text makes each
    /// prompt identifiable.
    struct ScriptedInference {
        scripts: Vec<(&'static str, Duration, Result<Value, AppError>)>,
    }

    #[async_trait]
    impl InferenceActor for ScriptedInference {
        async fn analyze(&self, prompt: String) -> Result<Value, AppError> {
            for (needle, delay, outcome) in &self.scripts {
                if prompt.contains(needle) {
                    tokio::time::sleep(*delay).await;
                    return outcome.clone();
                }
            }
            Err(AppError::Internal("no script for prompt".to_string()))
        }
    }

    fn envelope_for(tone: &str) -> Value {
        let text = json!({
            "tone": tone,
            "score": 8,
            "explanation": "test explanation",
            "confidence": 70,
            "replies": [
                {"type": "Confident", "msg": "a"},
                {"type": "Calm", "msg": "b"},
                {"type": "Witty", "msg": "c"}
            ]
        })
        .to_string();
        json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
    }

    fn setup_session(scripts: Vec<(&'static str, Duration, Result<Value, AppError>)>) -> SessionHandle {
        let (sender, receiver) = mpsc::channel(32);
        let runner = SessionRunner::new(
            receiver,
            sender.clone(),
            Arc::new(ScriptedInference { scripts }),
        );
        tokio::spawn(async move { runner.run().await });
        SessionHandle {
            sender,
            request_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_submit_produces_record_and_updates_latest() {
        let session = setup_session(vec![(
            "hello",
            Duration::from_millis(0),
            Ok(envelope_for("Friendly")),
        )]);

        let record = session.submit("hello".to_string()).await.unwrap();
        assert_eq!(record.result.tone, "Friendly");
        assert_eq!(record.result.replies.len(), 3);

        let latest = session.latest().await.unwrap();
        assert_eq!(latest.unwrap().id, record.id);
    }

    #[tokio::test]
    async fn test_failed_request_keeps_previous_record() {
        let session = setup_session(vec![
            ("first", Duration::from_millis(0), Ok(envelope_for("Warm"))),
            (
                "second",
                Duration::from_millis(0),
                Err(AppError::Transport("connection refused".to_string())),
            ),
        ]);

        let first = session.submit("first".to_string()).await.unwrap();
        let err = session.submit("second".to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));

        let latest = session.latest().await.unwrap().unwrap();
        assert_eq!(latest.id, first.id);
    }

    #[tokio::test]
    async fn test_superseded_result_is_discarded() {
        // The first request is slow, the second fast: the second resolves
        // first, and the first's late result must not replace it.
        let session = setup_session(vec![
            ("first", Duration::from_millis(300), Ok(envelope_for("Stale"))),
            ("second", Duration::from_millis(10), Ok(envelope_for("Fresh"))),
        ]);

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.submit("first".to_string()).await })
        };
        // Give the first Submit time to register its generation.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = {
            let session = session.clone();
            tokio::spawn(async move { session.submit("second".to_string()).await })
        };

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();
        assert_eq!(first.result.tone, "Stale");
        assert_eq!(second.result.tone, "Fresh");

        // Last submitted wins, even though it completed first.
        let latest = session.latest().await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
        assert_eq!(latest.result.tone, "Fresh");
    }

    #[tokio::test]
    async fn test_latest_is_empty_before_any_request() {
        let session = setup_session(vec![]);
        assert!(session.latest().await.unwrap().is_none());
    }
}
