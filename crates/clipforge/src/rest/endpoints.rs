//! Backend endpoint paths and request/response types.

use serde::{Deserialize, Serialize};

use crate::auth::TokenPair;
use crate::error::FieldError;

// ============================================================================
// Endpoint Paths
// ============================================================================

/// POST: JSON login.
pub const LOGIN: &str = "/auth/login";

/// POST: form-encoded OAuth2 password flow login.
pub const TOKEN: &str = "/auth/token";

/// POST: account creation.
pub const REGISTER: &str = "/auth/register";

/// POST: token refresh.
pub const REFRESH: &str = "/auth/refresh";

/// POST: server-side session invalidation.
pub const LOGOUT: &str = "/auth/logout";

/// GET: current user profile.
pub const CURRENT_USER: &str = "/users/me";

/// GET: backend-issued OAuth authorize URL for a provider.
pub fn oauth_authorize(provider: &str) -> String {
    format!("/auth/{provider}/authorize")
}

/// GET: OAuth code exchange for a provider.
pub fn oauth_callback(provider: &str) -> String {
    format!("/auth/{provider}/callback")
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for JSON login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from login, refresh, and OAuth code exchange.
#[derive(Debug, Deserialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl From<TokenPairResponse> for TokenPair {
    fn from(response: TokenPairResponse) -> Self {
        TokenPair::new(response.access_token, response.refresh_token)
    }
}

/// Request body for token refresh.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Request body for registration.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl Registration {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            full_name: None,
        }
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }
}

// Registration carries a password; keep it out of Debug output like
// Credentials does.
impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .finish()
    }
}

/// A user profile as returned by the backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Response from the OAuth authorize endpoint.
#[derive(Debug, Deserialize)]
pub struct AuthorizeUrlResponse {
    pub authorize_url: String,
}

// ============================================================================
// Error Body
// ============================================================================

/// Error body shape used by the backend.
///
/// `detail` is either a plain message string or a list of field-level
/// validation entries (`{loc, msg, type}`).
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Extract the human-readable message, if the body carried one.
    pub fn message(&self) -> Option<String> {
        if let Some(message) = &self.message {
            return Some(message.clone());
        }
        match &self.detail {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Array(entries)) => {
                let msgs: Vec<&str> = entries
                    .iter()
                    .filter_map(|e| e.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if msgs.is_empty() {
                    None
                } else {
                    Some(msgs.join("; "))
                }
            }
            _ => None,
        }
    }

    /// Extract field-level validation entries, if present.
    pub fn fields(&self) -> Vec<FieldError> {
        let Some(serde_json::Value::Array(entries)) = &self.detail else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| {
                let msg = entry.get("msg").and_then(|m| m.as_str())?;
                // loc is ["body", "email"] or similar; the last element
                // names the field.
                let field = entry
                    .get("loc")
                    .and_then(|loc| loc.as_array())
                    .and_then(|loc| loc.last())
                    .and_then(|f| f.as_str())
                    .unwrap_or("unknown");
                Some(FieldError {
                    field: field.to_string(),
                    message: msg.to_string(),
                })
            })
            .collect()
    }
}
