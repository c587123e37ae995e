use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::errors::{codes, DomainError, ErrorKind};

const UNAUTHORIZED: &str = "UNAUTHORIZED";
const INSUFFICIENT_PERMISSIONS: &str = "INSUFFICIENT_PERMISSIONS";

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    code: &'static str,
    detail: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
    Domain(DomainError),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, UNAUTHORIZED, message.to_string())
            }
            ApiError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, INSUFFICIENT_PERMISSIONS, message.to_string())
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, codes::VALIDATION_ERROR, message.clone())
            }
            ApiError::Domain(err) => {
                let status = StatusCode::from_u16(err.kind().http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, err.code(), err.message().to_string())
            }
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL_ERROR, message.clone())
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, detail) = self.parts();

        match &self {
            ApiError::Internal(_) => tracing::error!(error = %detail, "Internal server error"),
            ApiError::Domain(err) if err.kind() == ErrorKind::DependencyFailure => {
                tracing::warn!(code, error = %detail, "Upstream dependency failed");
            }
            _ => {}
        }

        let mut response =
            (status, Json(ErrorResponse { status: status.as_u16(), code, detail })).into_response();
        if matches!(self, ApiError::Unauthorized(_)) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
