use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use evalboard_core::ErrorBody;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Unknown or non-numeric id; carries the id as the client sent it.
    #[error("Evaluation with ID {0} does not exist")]
    NotFound(String),

    #[error("A valid X-API-Key header is required")]
    Unauthorized,

    #[error("upstream failure: {0:#}")]
    Upstream(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::NotFound(_) => ErrorBody {
                error: "Evaluation not found".to_string(),
                message: self.to_string(),
            },
            ApiError::Unauthorized => ErrorBody {
                error: "Unauthorized".to_string(),
                message: self.to_string(),
            },
            ApiError::Upstream(e) => {
                // detail stays in the log
                tracing::error!(event = "upstream_failure", error = %format!("{e:#}"));
                ErrorBody {
                    error: "Internal Server Error".to_string(),
                    message: "An unexpected error occurred".to_string(),
                }
            }
        };
        (self.status(), Json(body)).into_response()
    }
}
