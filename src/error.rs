// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error reported by a hosted service (identity, storage, media endpoint).
///
/// `code` is machine readable (`auth/requires-recent-login`,
/// `storage/object-not-found`, ...). `message` is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Local precondition failure (no session, microphone denied, empty upload URL).
    #[error("{0}")]
    Precondition(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Database error: {0}")]
    Database(String),

    /// A dependency needed to authenticate the request is unreachable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub const REQUIRES_RECENT_LOGIN: &'static str = "auth/requires-recent-login";
    pub const ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL: &'static str =
        "auth/account-exists-with-different-credential";
    pub const OBJECT_NOT_FOUND: &'static str = "storage/object-not-found";
    pub const UNSUPPORTED: &'static str = "storage/unsupported";

    /// Shorthand for a provider error.
    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Provider(ProviderError::new(code, message))
    }

    /// Machine-readable provider code, if this error came from a hosted service.
    pub fn code(&self) -> Option<&str> {
        match self {
            AppError::Provider(e) => Some(e.code.as_str()),
            _ => None,
        }
    }

    pub fn is_requires_recent_login(&self) -> bool {
        self.code() == Some(Self::REQUIRES_RECENT_LOGIN)
    }

    pub fn is_account_exists_with_different_credential(&self) -> bool {
        self.code() == Some(Self::ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL)
    }

    pub fn is_object_not_found(&self) -> bool {
        self.code() == Some(Self::OBJECT_NOT_FOUND)
    }

    /// Conditions that best-effort deletion tolerates: the object is already
    /// absent, or the backend cannot delete objects at all.
    pub fn is_tolerated_on_delete(&self) -> bool {
        self.is_object_not_found() || self.code() == Some(Self::UNSUPPORTED)
    }

    /// Human-readable text for the page surface.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Provider(e) => e.message.clone(),
            other => other.to_string(),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Precondition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "precondition_failed",
                Some(msg.clone()),
            ),
            AppError::Provider(e) => {
                tracing::warn!(code = %e.code, error = %e.message, "Provider error");
                (StatusCode::BAD_GATEWAY, "provider_error", Some(e.message.clone()))
            }
            AppError::Unavailable(msg) => {
                tracing::warn!(error = %msg, "Dependency unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", None)
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
