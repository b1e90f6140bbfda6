use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Failure talking to the LiveKit control plane.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("livekit unreachable: {0}")]
    Unavailable(#[from] reqwest::Error),
    #[error("livekit rejected request ({status}, {code}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },
    #[error("unexpected livekit response: {0}")]
    Decode(String),
    #[error("failed to sign access token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },
    #[error("{message}")]
    BadRequest { status: StatusCode, message: String },
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation { field, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    detail: message.to_string(),
                    field: Some(field),
                },
            ),
            AppError::BadRequest { status, message } => (
                status,
                ErrorBody {
                    detail: message,
                    field: None,
                },
            ),
            AppError::Platform(e) => {
                // The caller only learns that setup failed, not which step.
                error!(error=%e, "failed to launch outbound call");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        detail: "failed to launch outbound call".to_string(),
                        field: None,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
