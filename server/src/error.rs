use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request")]
    InvalidRequest { errors: Vec<String> },

    #[error("Unsupported language '{0}'")]
    UnsupportedLanguage(String),

    #[error("Problem not found")]
    ProblemNotFound,

    /// `.0` is what the client sees. The cause is only logged.
    #[error("{0}")]
    Internal(&'static str, #[source] anyhow::Error),
}

impl ApiError {
    pub fn internal(message: &'static str, cause: anyhow::Error) -> Self {
        Self::Internal(message, cause)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest { .. } | ApiError::UnsupportedLanguage(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ProblemNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest {
            errors: vec![rejection.body_text()],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::InvalidRequest { errors } => {
                json!({ "message": self.to_string(), "errors": errors })
            }
            ApiError::Internal(message, cause) => {
                log::error!("{}: {:#}", message, cause);
                json!({ "message": message })
            }
            _ => json!({ "message": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
