use axum::{
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use compute::ComputeError;
use thiserror::Error;
use tracing::{error, warn};

use crate::schemas::ErrorResponse;

/// Errors returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// The AI service could not be reached or answered with an error status
    #[error("{message}")]
    Upstream { message: String, detail: String },
    /// A query failed; `context` is what the client sees
    #[error("{context}")]
    Database {
        context: &'static str,
        #[source]
        source: ComputeError,
    },
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Maps a compute failure for the route described by `context`.
    /// Rejected SQL is the caller's fault and stays a 400.
    pub fn from_compute(context: &'static str) -> impl FnOnce(ComputeError) -> ApiError {
        move |source| match source {
            ComputeError::RejectedSql(reason) => ApiError::Validation(reason),
            source => ApiError::Database { context, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } | ApiError::Database { .. } | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Upstream { .. } => "UPSTREAM_ERROR",
            ApiError::Database { .. } => "DATABASE_ERROR",
            ApiError::Internal => "INTERNAL_ERROR",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// `Json` extractor whose rejections are reported as [`ApiError::Validation`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Builds the JSON error body shared by every failure path.
pub fn error_body(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        error: message.into(),
        code: code.to_string(),
        success: false,
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Validation(message) | ApiError::NotFound(message) => {
                warn!("Request rejected: {}", message);
            }
            ApiError::Upstream { message, detail } => {
                error!("{}: {}", message, detail);
            }
            ApiError::Database { context, source } => {
                error!("{}: {}", context, source);
            }
            ApiError::Internal => {
                error!("Internal server error");
            }
        }
        error_body(self.status(), self.code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_sql_is_a_validation_error() {
        let err = ApiError::from_compute("Error exporting to CSV")(ComputeError::RejectedSql(
            "only SELECT".to_string(),
        ));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from_compute("Error fetching stats")(ComputeError::Query(
            "boom".to_string(),
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Error fetching stats");
    }
}
