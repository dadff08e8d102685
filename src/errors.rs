use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::BusyInterval;
use crate::services::scheduling::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(String),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("upstream service error: {0}")]
    Upstream(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("requested time conflicts with {} calendar event(s)", .0.len())]
    Conflict(Vec<BusyInterval>),

    #[error("unauthorized")]
    Unauthorized,
}

impl AppError {
    pub fn database(err: anyhow::Error) -> Self {
        AppError::Database(format!("{err:#}"))
    }

    pub fn upstream(err: anyhow::Error) -> Self {
        AppError::Upstream(format!("{err:#}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let mut body = serde_json::json!({ "success": false, "error": self.to_string() });
        if let AppError::Conflict(conflicts) = &self {
            body["conflicts"] = serde_json::json!(conflicts);
        }
        (status, axum::Json(body)).into_response()
    }
}
