use std::io;
use thiserror::Error;

/// Application-wide error type, consolidating all pipeline failures into a single enum.
///
/// Every stage catches its own failures and converts them into one of these
/// kinds before they cross a component boundary; no raw transport or parse
/// error escapes unclassified.
#[derive(Debug, Error)]
pub enum AppError {
    /// The OCR input could not be used (not an image, recognition failed, or
    /// nothing readable was found).
    #[error("Unreadable image: {0}")]
    UnreadableImage(String),

    /// Network or HTTP failure reaching the analyze endpoint (unreachable,
    /// non-2xx without a structured body, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The analyze endpoint reported an application-level failure, e.g. the
    /// upstream model call failed or credentials are missing server-side.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The model response envelope is missing the expected generated-text field.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The model's generated text is not parseable as JSON.
    #[error("Invalid JSON in model reply: {0}")]
    InvalidJson(String),

    /// The model's reply parsed, but a required field, type, or range check failed.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// Represents errors specific to the actor system, such as communication failures.
    #[error("Actor error: {0}")]
    Actor(#[from] crate::actors::messages::ActorError),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents configuration-related errors (e.g., missing or invalid environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Short, non-technical line suitable for direct display to the user.
    /// Raw payloads and internal detail stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::UnreadableImage(_) => "Failed to read the image.",
            AppError::Transport(_) => "Could not reach the analysis service.",
            AppError::Upstream(_) => "The analysis service reported an error. Check the backend.",
            AppError::MalformedEnvelope(_) => "The model returned an incomplete response.",
            AppError::InvalidJson(_) => "The model reply could not be understood.",
            AppError::SchemaViolation(_) => "The model reply did not match the expected format.",
            AppError::Actor(_) => "The analysis task was interrupted.",
            AppError::Io(_) => "A local file operation failed.",
            AppError::Config(_) => "The app is not configured correctly.",
            AppError::Internal(_) => "Something went wrong. Please try again.",
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            AppError::UnreadableImage(s) => AppError::UnreadableImage(s.clone()),
            AppError::Transport(s) => AppError::Transport(s.clone()),
            AppError::Upstream(s) => AppError::Upstream(s.clone()),
            AppError::MalformedEnvelope(s) => AppError::MalformedEnvelope(s.clone()),
            AppError::InvalidJson(s) => AppError::InvalidJson(s.clone()),
            AppError::SchemaViolation(s) => AppError::SchemaViolation(s.clone()),
            AppError::Actor(e) => AppError::Actor(e.clone()),
            AppError::Io(e) => AppError::Io(io::Error::new(e.kind(), e.to_string())),
            AppError::Config(s) => AppError::Config(s.clone()),
            AppError::Internal(s) => AppError::Internal(s.clone()),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::Transport(format!("Request timed out: {}", err))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("URL parse error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Config(format!("Validation errors: {}", err))
    }
}

impl From<which::Error> for AppError {
    fn from(err: which::Error) -> Self {
        AppError::Config(format!("Command not found: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(format!("HTTP error: {}", err))
    }
}
