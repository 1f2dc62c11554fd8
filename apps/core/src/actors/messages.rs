use serde_json::Value;
use tokio::sync::oneshot;

use crate::models::AnalysisRecord;

/// Defines errors that can occur within the actor system.
#[derive(Debug, thiserror::Error, Clone)]
pub enum ActorError {
    /// A message or reply channel closed before the operation finished.
    #[error("Actor channel closed: {0}")]
    Channel(String),
}

// Re-export AppError for convenience
pub use crate::error::AppError;

/// Messages that can be sent to the `InferenceActor`.
#[derive(Debug)]
pub enum InferenceMessage {
    /// A request to run one compiled prompt through the analyze endpoint.
    Analyze {
        prompt: String,
        /// A channel to send the raw response envelope back.
        responder: oneshot::Sender<Result<Value, AppError>>,
    },
}

/// Messages that can be sent to the `SessionActor`.
#[derive(Debug)]
pub enum SessionMessage {
    /// A request to analyze one message. Supersedes any request still in flight.
    Submit {
        text: String,
        /// A channel to send this request's own outcome back.
        responder: oneshot::Sender<Result<AnalysisRecord, AppError>>,
    },
    /// A query for the most recent completed analysis, if any.
    Latest {
        responder: oneshot::Sender<Option<AnalysisRecord>>,
    },
    /// Internal: a pipeline task finished for the given generation. The
    /// session applies the outcome to its latest slot only when the
    /// generation is still current, then answers the original submitter.
    Completed {
        generation: u64,
        outcome: Result<AnalysisRecord, AppError>,
        responder: oneshot::Sender<Result<AnalysisRecord, AppError>>,
    },
}
