//! Error types for the operator console core

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors that can occur in the console core
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed client input
    #[error("Validation error: {0}")]
    Validation(String),

    /// No session reference present, or the session is not authenticated
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Session references an identity that no longer exists
    #[error("Invalid session")]
    InvalidSession,

    /// Request origin address is not in the identity's authorized set
    #[error("Address not authorized: {0}")]
    AddressNotAuthorized(String),

    /// No matching unused verification code
    #[error("Invalid verification code")]
    InvalidCode,

    /// Verification code past its expiry
    #[error("Expired verification code")]
    ExpiredCode,

    /// Unknown identifier on a single-item lookup
    #[error("Not found: {0}")]
    NotFound(String),

    /// Too many requests against a mutation endpoint
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Underlying persistence unreachable
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable machine-readable classification for response bodies.
    ///
    /// All authentication failures collapse to `UNAUTHORIZED` so the response
    /// does not leak which check rejected the request; the precise cause is
    /// only recorded in the trace log.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::AuthenticationRequired
            | Error::InvalidSession
            | Error::AddressNotAuthorized(_)
            | Error::InvalidCode
            | Error::ExpiredCode => "UNAUTHORIZED",
            Error::NotFound(_) => "NOT_FOUND",
            Error::RateLimited(_) => "RATE_LIMITED",
            Error::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::AuthenticationRequired
            | Error::InvalidSession
            | Error::AddressNotAuthorized(_)
            | Error::InvalidCode
            | Error::ExpiredCode => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Error::StoreUnavailable(_)
            | Error::Config(_)
            | Error::Serialization(_)
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message presented to the caller. Uniform for auth failures.
    fn public_message(&self) -> String {
        match self {
            Error::AuthenticationRequired
            | Error::InvalidSession
            | Error::AddressNotAuthorized(_)
            | Error::InvalidCode
            | Error::ExpiredCode => "Authentication required".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(cause = ?self, "Request denied");
        } else if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.public_message(),
            }
        }));
        (status, body).into_response()
    }
}

/// Serialize any `Serialize` value to `serde_json::Value` without panicking.
///
/// Falls back to a JSON error object if serialization fails (e.g. non-string
/// map keys or non-finite floats — unlikely for well-typed structs, but
/// eliminates `unwrap()` from production code).
pub fn to_json<T: serde::Serialize>(value: T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        serde_json::json!({
            "error": {
                "code": "SERIALIZATION_ERROR",
                "message": e.to_string()
            }
        })
    })
}
