//! Error types for the clipforge client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, API, input validation, and storage errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for clipforge client operations.
///
/// This error type covers all possible failure modes in the client,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (invalid credentials, expired session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// API errors (validation failures, missing resources, server faults).
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Input validation errors (invalid base URL, origin, provider).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Token store errors (failed to read or write persisted tokens).
    #[error("token store error: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    /// Returns true if this error is a rejected bearer credential, i.e.
    /// the trigger for a token refresh attempt.
    pub(crate) fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Auth(AuthError::Unauthorized { .. }))
    }
}

/// Transport-level errors. The request never produced a response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request exceeded the overall timeout.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP transport error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login was rejected by the backend.
    #[error("invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// The bearer credential was rejected (401) and no refresh budget
    /// remained for the request.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The session could not be refreshed and has been cleared.
    #[error("session expired")]
    SessionExpired,

    /// No refresh token is stored.
    #[error("no refresh token available")]
    RefreshTokenMissing,
}

/// API-level errors carrying the backend-supplied detail when present.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the request payload (4xx with field detail).
    #[error("validation failed ({status}): {message}")]
    Validation {
        status: u16,
        message: String,
        fields: Vec<FieldError>,
    },

    /// The requested resource does not exist (404).
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Server fault (5xx) or unclassified status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl ApiError {
    /// Returns the backend-supplied message.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message, .. }
            | ApiError::NotFound { message }
            | ApiError::Server { message, .. } => message,
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Backend-supplied description of the failure.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid frontend origin for OAuth redirect construction.
    #[error("invalid origin '{value}': {reason}")]
    Origin { value: String, reason: String },

    /// Unknown OAuth provider.
    #[error("unknown OAuth provider '{value}'")]
    Provider { value: String },

    /// Request body could not be serialized.
    #[error("invalid request body: {reason}")]
    Body { reason: String },
}

/// Token store errors.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    /// Create a new store error with a description of the failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_auth_failure() {
        let err = Error::Auth(AuthError::Unauthorized {
            message: "token rejected".into(),
        });
        assert!(err.is_auth_failure());
    }

    #[test]
    fn other_auth_errors_are_not_refresh_triggers() {
        assert!(!Error::Auth(AuthError::SessionExpired).is_auth_failure());
        assert!(
            !Error::Api(ApiError::NotFound {
                message: "missing".into()
            })
            .is_auth_failure()
        );
    }

    #[test]
    fn field_error_display() {
        let err = FieldError {
            field: "email".into(),
            message: "value is not a valid email address".into(),
        };
        assert_eq!(err.to_string(), "email: value is not a valid email address");
    }
}
