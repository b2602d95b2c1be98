//! Translation of domain failures into HTTP responses.

use crate::errors::{DomainError, StoreError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::ErrorResponse;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(e) => match e {
                DomainError::NoParticipants => StatusCode::UNPROCESSABLE_ENTITY,
                DomainError::Forbidden { .. } => StatusCode::FORBIDDEN,
                DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
                DomainError::UsernameTaken { .. } => StatusCode::CONFLICT,
                DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                DomainError::Validation(_) => StatusCode::BAD_REQUEST,
                DomainError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
                DomainError::Store(store) => match store {
                    StoreError::BackendUnavailable { .. } | StoreError::TableMissing { .. } => {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    StoreError::Conflict { .. } => StatusCode::CONFLICT,
                    StoreError::Io(_) | StoreError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
                },
            },
        }
    }

    /// Stable machine-readable code for the front end
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Domain(e) => match e {
                DomainError::NoParticipants => "no_participants",
                DomainError::Forbidden { .. } => "forbidden",
                DomainError::NotFound { .. } => "not_found",
                DomainError::UsernameTaken { .. } => "username_taken",
                DomainError::InvalidCredentials => "invalid_credentials",
                DomainError::Validation(_) => "validation",
                DomainError::Export(_) => "export_failed",
                DomainError::Store(StoreError::Conflict { .. }) => "conflict",
                DomainError::Store(StoreError::BackendUnavailable { .. })
                | DomainError::Store(StoreError::TableMissing { .. }) => "backend_unavailable",
                DomainError::Store(_) => "storage_error",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, "request failed: {}", self);
        } else {
            warn!(status = %status, "request rejected: {}", self);
        }
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
