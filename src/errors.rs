use crate::storage::DocumentKey;
use crate::trainer::TrainerError;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {key}: {source}")]
    Io {
        key: DocumentKey,
        #[source]
        source: std::io::Error,
    },
    #[error("{key} does not hold valid JSON: {source}")]
    Malformed {
        key: DocumentKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: DocumentKey,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    /// When set, the body becomes `{message, error: detail}` instead of `{error: message}`.
    pub detail: Option<String>,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            detail: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "Not found".to_string(),
            detail: None,
        }
    }

    pub fn invalid_period() -> Self {
        Self::bad_request("Invalid period")
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
            detail: None,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::internal(err)
    }
}

impl From<TrainerError> for AppError {
    fn from(err: TrainerError) -> Self {
        let (status, message) = match err {
            TrainerError::TimedOut(_) => (StatusCode::GATEWAY_TIMEOUT, "Recalibration timed out"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Recalibration failed"),
        };
        Self {
            status,
            message: message.to_string(),
            detail: Some(err.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.status.is_server_error() {
            match &self.detail {
                Some(detail) => error!(status = %self.status, "{}: {detail}", self.message),
                None => error!(status = %self.status, "{}", self.message),
            }
        }

        let body = match self.detail {
            Some(detail) => json!({ "message": self.message, "error": detail }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}
