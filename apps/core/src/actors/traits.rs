use crate::actors::messages::AppError;
use async_trait::async_trait;
use serde_json::Value;

/// Defines the public interface for the inference actor.
///
/// This trait abstracts the analyze-endpoint call so the session logic can be
/// exercised against scripted implementations in tests. Implementations make
/// exactly one outbound call per invocation and never hold the upstream
/// credential; that stays behind the proxy boundary.
#[async_trait]
pub trait InferenceActor: Send + Sync + 'static {
    /// Sends one compiled prompt and returns the raw model response envelope,
    /// verbatim and un-interpreted.
    async fn analyze(&self, prompt: String) -> Result<Value, AppError>;
}
