use axum::{
    extract::multipart::MultipartError,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::ExtractionError;
use crate::optimizer::invoker::InvokeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant surfaces as a plain descriptive message; there are no
/// machine-readable error codes in the response body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Could not read uploaded document: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Gemini API error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<InvokeError> for AppError {
    fn from(err: InvokeError) -> Self {
        AppError::Llm(err.to_string())
    }
}

const PAYLOAD_TOO_LARGE_MESSAGE: &str =
    "The upload is too large. Please use a smaller file or paste the text instead.";

/// Malformed or incomplete JSON is a validation failure, not axum's plain-text 422.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(PAYLOAD_TOO_LARGE_MESSAGE.to_string())
        } else {
            AppError::Validation(rejection.body_text())
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(PAYLOAD_TOO_LARGE_MESSAGE.to_string())
        } else {
            AppError::Validation(format!("Malformed form upload: {}", err.body_text()))
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the user. Internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::Extraction(e) => {
                tracing::warn!("Document extraction failed: {e}");
                self.to_string()
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                self.to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": {
                "message": self.user_message()
            }
        }));

        (status, body).into_response()
    }
}
