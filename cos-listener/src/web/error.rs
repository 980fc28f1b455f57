//! Request rejections returned by the webhook endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature missing or mismatched while a secret is configured.
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid JSON payload")]
    InvalidJson(#[from] serde_json::Error),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidJson(_) => StatusCode::BAD_REQUEST,
        }
    }
}

// The body carries only the fixed message; parser details and digests stay
// in the logs.
impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WebhookError::InvalidSignature.status(),
            StatusCode::UNAUTHORIZED
        );

        let parse_error = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let error = WebhookError::from(parse_error);
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), "Invalid JSON payload");
    }
}
