//! API error taxonomy for the proxy.
//!
//! Every failure collapses to one of two client-visible lines so nothing
//! about the upstream or the environment leaks through the boundary. The
//! detail in each variant is for server-side logs only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The upstream model call failed: network error, non-2xx status, or an
    /// unreadable response body.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// The credential is not configured, so no upstream call was attempted.
    #[error("upstream credential is not configured")]
    Credential,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Credential => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the client is allowed to see.
    fn public_message(&self) -> &'static str {
        match self {
            ApiError::Upstream(_) => "Upstream model request failed",
            ApiError::Credential => "Server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}
