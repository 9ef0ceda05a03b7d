use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed")]
    Auth,

    #[error("Method not allowed: {0}")]
    Method(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Expected a single home, remote returned {0}")]
    MultipleAccountsUnsupported(usize),

    #[error("Invalid cursor: {0}")]
    Cursor(String),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Transport(e.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth => StatusCode::UNAUTHORIZED,
            AppError::Method(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Transport(_)
            | AppError::MalformedResponse(_)
            | AppError::MultipleAccountsUnsupported(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Cursor(_)
            | AppError::Yaml(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_code = match self {
            AppError::Auth => "auth",
            AppError::Method(_) => "method",
            AppError::Transport(ref msg) | AppError::MalformedResponse(ref msg) => {
                tracing::error!("Upstream error: {}", msg);
                "upstream"
            }
            AppError::MultipleAccountsUnsupported(count) => {
                tracing::error!("Account selection failed: {} homes returned", count);
                "account"
            }
            ref other => {
                tracing::error!("Internal error: {}", other);
                "internal"
            }
        };

        let body = Json(json!({
            "error": error_code,
        }));

        (self.status_code(), body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
