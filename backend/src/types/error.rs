//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;
use thiserror::Error;

/// Error body returned to clients
#[derive(Debug, Serialize, JsonSchema)]
pub struct ApiErrorResponse {
    /// Human-readable error message
    pub msg: String,
}

/// A failure classified with an HTTP status code
///
/// Built explicitly at the point where a failure is classified; handlers only
/// turn it into a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({status})")]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// `400 BAD_REQUEST`
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// `401 UNAUTHORIZED`
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// `403 FORBIDDEN`
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// `404 NOT_FOUND`
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// `500 INTERNAL_SERVER_ERROR`
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Status the error maps to
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Numeric status code
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Message shown to the client
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.status.as_u16() {
            400..=499 => tracing::warn!("Client error: {} - {}", self.status, self.message),
            500..=599 => tracing::error!("Server error: {} - {}", self.status, self.message),
            _ => {}
        }

        (self.status, Json(ApiErrorResponse { msg: self.message })).into_response()
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
