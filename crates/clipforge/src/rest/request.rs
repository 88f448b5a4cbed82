//! Outbound request descriptors.
//!
//! A [`RequestSpec`] is immutable once built; the refresh budget for a
//! dispatch lives in the separate [`Attempt`] wrapper, decided before the
//! first send rather than mutated on the request mid-flight.

use reqwest::Method;
use serde::Serialize;

use crate::error::{Error, InvalidInputError};

/// Body carried by an outbound request.
#[derive(Clone)]
pub(crate) enum Payload {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

// Bodies can carry credentials; keep them out of Debug output
impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Empty => f.write_str("Empty"),
            Payload::Json(_) => f.write_str("Json([REDACTED])"),
            Payload::Form(_) => f.write_str("Form([REDACTED])"),
        }
    }
}

/// An immutable outbound call descriptor.
#[derive(Clone, Debug)]
pub(crate) struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub payload: Payload,
    /// Whether to attach the stored bearer credential.
    pub authenticated: bool,
}

impl RequestSpec {
    /// An authenticated GET.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            payload: Payload::Empty,
            authenticated: true,
        }
    }

    /// An authenticated POST with no body.
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            payload: Payload::Empty,
            authenticated: true,
        }
    }

    /// An authenticated POST with a raw JSON body.
    pub fn post_json(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            payload: Payload::Json(body),
            ..Self::post(path)
        }
    }

    /// An authenticated POST serializing `body` to JSON.
    pub fn post_body<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self, Error> {
        let body = serde_json::to_value(body).map_err(|e| InvalidInputError::Body {
            reason: e.to_string(),
        })?;
        Ok(Self::post_json(path, body))
    }

    /// An authenticated POST with a form-encoded body.
    pub fn post_form(path: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            payload: Payload::Form(fields),
            ..Self::post(path)
        }
    }

    /// Add a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Mark the request as unauthenticated (no bearer credential).
    pub fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Per-dispatch refresh budget for a request.
///
/// Authenticated requests get exactly one refresh-and-replay;
/// unauthenticated requests get none. The budget is fixed when the
/// attempt is created and only counts down.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Attempt {
    refreshes_left: u8,
}

impl Attempt {
    /// The initial attempt for a request.
    pub fn first(spec: &RequestSpec) -> Self {
        Self {
            refreshes_left: u8::from(spec.authenticated),
        }
    }

    /// Whether a refresh-and-replay is still allowed.
    pub fn can_refresh(&self) -> bool {
        self.refreshes_left > 0
    }

    /// The follow-up attempt after spending a refresh.
    pub fn after_refresh(&self) -> Self {
        Self {
            refreshes_left: self.refreshes_left.saturating_sub(1),
        }
    }
}
