//! Platform Error Types
//!
//! One taxonomy for the whole service, mapped onto HTTP status codes at the
//! boundary. Upstream failures carry the raw upstream body where it is safe
//! to surface; uncategorized failures return a generic message only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Missing or invalid credentials: {message}")]
    Unauthenticated { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Submission rejected: {message}")]
    Rejected { message: String },

    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Upstream returned status {status}")]
    UpstreamStatus {
        status: u16,
        body: serde_json::Value,
    },

    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ServiceError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        Self::BadRequest {
            message: message.into(),
            details,
        }
    }

    pub fn upstream(status: u16, body: serde_json::Value) -> Self {
        Self::UpstreamStatus { status, body }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Error response body
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ServiceError::Unauthenticated { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ServiceError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ServiceError::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            ServiceError::Rejected { .. } => (StatusCode::BAD_REQUEST, "REJECTED"),
            ServiceError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ServiceError::UpstreamStatus { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR"),
            ServiceError::UpstreamUnreachable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        // The upstream body is the only internal detail safe to attach.
        let (message, details) = match self {
            ServiceError::UpstreamStatus { status, body } => (
                format!("Upstream returned status {}", status),
                Some(body),
            ),
            ServiceError::UpstreamUnreachable(_) => ("Upstream unreachable".to_string(), None),
            ServiceError::BadRequest { message, details } => (message, details),
            ServiceError::Internal { .. } | ServiceError::Json(_) => {
                ("Internal server error".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        let cases = [
            (ServiceError::unauthenticated("x"), StatusCode::UNAUTHORIZED),
            (ServiceError::forbidden("x"), StatusCode::FORBIDDEN),
            (ServiceError::not_found("Issue", "1"), StatusCode::NOT_FOUND),
            (ServiceError::validation("x"), StatusCode::UNPROCESSABLE_ENTITY),
            (ServiceError::rejected("x"), StatusCode::BAD_REQUEST),
            (
                ServiceError::upstream(500, serde_json::json!({"oops": true})),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ServiceError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
