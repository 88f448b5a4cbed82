//! Low-level REST client.
//!
//! Wraps `reqwest` with base-URL resolution, bearer-header injection, and
//! mapping of HTTP outcomes onto the error taxonomy. The refresh logic
//! lives a layer up in [`ApiClient`](crate::ApiClient); this client sends
//! each request exactly once.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use crate::auth::AccessToken;
use crate::error::{ApiError, AuthError, Error};
use crate::types::ApiUrl;

use super::endpoints::ErrorBody;
use super::request::{Payload, RequestSpec};

/// HTTP client for backend REST requests.
#[derive(Debug, Clone)]
pub(crate) struct RestClient {
    client: reqwest::Client,
    base: ApiUrl,
}

impl RestClient {
    /// Create a new REST client for the given base URL.
    pub fn new(base: ApiUrl, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("clipforge/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");

        Self { client, base }
    }

    /// Returns the base URL this client is configured for.
    pub fn base(&self) -> &ApiUrl {
        &self.base
    }

    /// Send a request once and parse the JSON response body.
    // skip_all: the payload may carry credentials
    #[instrument(skip_all, fields(base = %self.base, method = %spec.method, path = %spec.path))]
    pub async fn send<R>(&self, spec: &RequestSpec, token: Option<&AccessToken>) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        let response = self.dispatch(spec, token).await?;
        self.handle_response(response).await
    }

    /// Send a request once, discarding any response body.
    #[instrument(skip_all, fields(base = %self.base, method = %spec.method, path = %spec.path))]
    pub async fn send_no_content(
        &self,
        spec: &RequestSpec,
        token: Option<&AccessToken>,
    ) -> Result<(), Error> {
        let response = self.dispatch(spec, token).await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.classify_error(response).await)
        }
    }

    async fn dispatch(
        &self,
        spec: &RequestSpec,
        token: Option<&AccessToken>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.base.endpoint(&spec.path);
        debug!(method = %spec.method, path = %spec.path, "REST request");
        trace!(query = ?spec.query, "query parameters");

        let mut request = self.client.request(spec.method.clone(), &url);

        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }

        request = match &spec.payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(body),
            Payload::Form(fields) => request.form(fields),
        };

        if let Some(token) = token {
            request = request.headers(auth_headers(token));
        }

        Ok(request.send().await?)
    }

    /// Handle a response, parsing the body or mapping the error.
    async fn handle_response<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<R, Error> {
        let status = response.status();
        trace!(status = %status, "REST response");

        if status.is_success() {
            let body = response.json::<R>().await?;
            Ok(body)
        } else {
            Err(self.classify_error(response).await)
        }
    }

    /// Map a non-success response onto the error taxonomy, carrying the
    /// backend-supplied message when one is present.
    async fn classify_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let body = response.json::<ErrorBody>().await.ok();

        let message = |fallback: &str| {
            body.as_ref()
                .and_then(ErrorBody::message)
                .unwrap_or_else(|| fallback.to_string())
        };

        match status {
            401 => Error::Auth(AuthError::Unauthorized {
                message: message("authentication required"),
            }),
            404 => Error::Api(ApiError::NotFound {
                message: message("resource not found"),
            }),
            400..=499 => Error::Api(ApiError::Validation {
                status,
                message: message("request rejected by the server"),
                fields: body.as_ref().map(ErrorBody::fields).unwrap_or_default(),
            }),
            _ => Error::Api(ApiError::Server {
                status,
                message: message("unexpected server error"),
            }),
        }
    }
}

/// Create authorization headers for authenticated requests.
fn auth_headers(token: &AccessToken) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let auth_value = format!("Bearer {}", token.as_str());
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&auth_value).expect("invalid token characters"),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}
