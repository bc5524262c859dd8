use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Resource not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Protected resource: {0}")]
    Protected(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error")]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn protected(message: impl Into<String>) -> Self {
        Self::Protected(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Protected(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            AppError::Database(ref e) => {
                tracing::error!(error = ?e, "database error");
                "Something went wrong".to_string()
            }
            AppError::Anyhow(ref e) => {
                tracing::error!(error = ?e, "system error");
                "Something went wrong".to_string()
            }
            AppError::NotFound => "Resource not found".to_string(),
            AppError::Unauthorized => "Unauthorized Access".to_string(),
            AppError::InvalidCredentials => "Email ou senha incorretos.".to_string(),
            AppError::Validation(message)
            | AppError::Protected(message)
            | AppError::Conflict(message) => message,
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
