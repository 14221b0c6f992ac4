//! Mapping from store errors to HTTP responses.
//!
//! Every handler returns `Result<_, ApiError>`; the `From<StoreError>` impl
//! lets `?` do the mapping. Status codes:
//!
//! - `Validation` and `ReferenceNotFound` → 400
//! - `NotFound` → 404
//! - `Conflict` → 409
//! - storage errors (`Sqlite`, `Pool`, `Migration`) → 500

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use vigia_store::StoreError;

/// An HTTP-mappable API error.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

/// JSON body carried by every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message naming the entity and id/key.
    pub message: String,
}

impl ApiError {
    /// A 400 with a caller-supplied message (blank path params and the like).
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// A 404 with a caller-supplied message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::Validation { .. } | StoreError::ReferenceNotFound { .. } => {
                StatusCode::BAD_REQUEST
            }
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::Sqlite(_) | StoreError::Pool(_) | StoreError::Migration { .. } => {
                tracing::error!(error = %err, "storage failure");
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Erro interno do servidor.".into(),
                };
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
