use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("{0}")]
    LoginFailed(String),
    #[error("Only admin users can log in to this panel.")]
    NotAdmin,
    #[error("{0}")]
    InvalidResponse(String),
    #[error("Not signed in")]
    Unauthenticated,
    #[error("{0}")]
    Validation(String),
    #[error("Invalid header value")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub(crate) fn api(status: reqwest::StatusCode, message: impl Into<String>) -> Self {
        Self::Api { status: status.as_u16(), message: message.into() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Transport(e) => {
                tracing::error!(error = %e, "Upstream API unreachable");
                (StatusCode::BAD_GATEWAY, "Upstream API unreachable".to_string())
            }
            Self::Api { status, message } => {
                tracing::debug!(status, message = %message, "Upstream API rejected request");
                (StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY), message)
            }
            Self::LoginFailed(msg) => {
                tracing::debug!(message = %msg, "Login failed");
                (StatusCode::UNAUTHORIZED, msg)
            }
            e @ Self::NotAdmin => {
                tracing::warn!("Login attempt by non-admin user");
                (StatusCode::FORBIDDEN, e.to_string())
            }
            Self::InvalidResponse(msg) => {
                tracing::warn!(message = %msg, "Malformed upstream response");
                (StatusCode::BAD_GATEWAY, msg)
            }
            e @ Self::Unauthenticated => (StatusCode::UNAUTHORIZED, e.to_string()),
            Self::Validation(msg) => {
                tracing::debug!(message = %msg, "Validation failed");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Storage(e) => {
                tracing::error!(error = %e, "Session storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::Serialization(e) => {
                tracing::error!(error = %e, "Serialization error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::InvalidHeader(_) | Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "message": message
        }));

        (status, body).into_response()
    }
}
