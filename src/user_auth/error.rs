//! Authentication error types.
//!
//! Every failure carries a stable machine-readable code plus a human
//! message. Storage and internal failures are logged in full and reach the
//! caller only as a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::gateway::types::ApiResponse;
use crate::storage::StoreError;

/// Stable error codes for the auth surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum AuthErrorCode {
    /// 1001: Missing or malformed input
    Validation = 1001,
    /// 1002: Identity already registered
    AlreadyExists = 1002,
    /// 2001: No Authorization header
    MissingToken = 2001,
    /// 2002: Login failed (identity-agnostic)
    InvalidCredentials = 2002,
    /// 2003: Token signature, payload, or expiry rejected
    TokenInvalid = 2003,
    /// 4002: Unknown signing app
    TenantNotFound = 4002,
    /// 4003: Unknown subject
    NotFound = 4003,
    /// 5000: Storage or internal failure
    Internal = 5000,
    /// 5002: Deadline exceeded
    Canceled = 5002,
}

impl AuthErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::TenantNotFound => "TENANT_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",
            Self::Internal => "INTERNAL_ERROR",
            Self::Canceled => "CANCELED",
        }
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::MissingToken | Self::InvalidCredentials | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            Self::TenantNotFound | Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Canceled => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("user already exists")]
    AlreadyExists,

    #[error("authorization header is missing")]
    MissingToken,

    #[error("invalid identity or password")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    TokenInvalid,

    #[error("app not found")]
    TenantNotFound,

    #[error("user not found")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("operation canceled")]
    Canceled,
}

impl AuthError {
    pub fn code(&self) -> AuthErrorCode {
        match self {
            Self::Validation(_) => AuthErrorCode::Validation,
            Self::AlreadyExists => AuthErrorCode::AlreadyExists,
            Self::MissingToken => AuthErrorCode::MissingToken,
            Self::InvalidCredentials => AuthErrorCode::InvalidCredentials,
            Self::TokenInvalid => AuthErrorCode::TokenInvalid,
            Self::TenantNotFound => AuthErrorCode::TenantNotFound,
            Self::NotFound => AuthErrorCode::NotFound,
            Self::Storage(_) | Self::Internal(_) => AuthErrorCode::Internal,
            Self::Canceled => AuthErrorCode::Canceled,
        }
    }

    /// Message safe to show to the caller
    pub fn public_message(&self) -> String {
        match self {
            Self::Storage(_) | Self::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AlreadyExists => AuthError::AlreadyExists,
            StoreError::NotFound => AuthError::NotFound,
            StoreError::Database(e) => AuthError::Storage(e.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let code = self.code();
        if code == AuthErrorCode::Internal {
            tracing::error!(error = %self, "auth request failed");
        }
        let body = ApiResponse::<()>::error(code.code(), self.public_message());
        (code.http_status(), Json(body)).into_response()
    }
}
