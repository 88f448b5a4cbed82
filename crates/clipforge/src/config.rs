//! Client configuration and base-URL resolution.

use std::time::Duration;

use crate::Result;
use crate::types::ApiUrl;

/// Environment variable that overrides the API base URL.
pub const API_URL_ENV: &str = "CLIPFORGE_API_URL";

/// Compiled-in base URL for release builds.
const PRODUCTION_API_URL: &str = "https://api.clipforge.app/api/v1";

/// Compiled-in base URL for development builds.
const DEVELOPMENT_API_URL: &str = "http://localhost:8000/api/v1";

/// Default overall request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which login endpoint the backend exposes.
///
/// The password-flow backend accepts form-encoded `username`/`password`
/// at `/auth/token`; the JSON variant accepts `{email, password}` at
/// `/auth/login`. Both return the same token pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoginFlow {
    /// Form-encoded OAuth2 password flow against `/auth/token`.
    #[default]
    PasswordForm,
    /// JSON body against `/auth/login`.
    Json,
}

/// Configuration for an [`ApiClient`](crate::ApiClient).
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// API base URL, including any path prefix.
    pub base_url: ApiUrl,
    /// Login endpoint variant.
    pub login_flow: LoginFlow,
    /// Overall per-request timeout. Exceeding it is a transport failure.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for the given base URL with defaults.
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            login_flow: LoginFlow::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a configuration from the environment.
    ///
    /// Uses [`API_URL_ENV`] when set, otherwise the compiled-in default
    /// for the build profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the override value is not a valid API URL.
    pub fn from_env() -> Result<Self> {
        let base_url = resolve_base_url(std::env::var(API_URL_ENV).ok().as_deref())?;
        Ok(Self::new(base_url))
    }

    /// Set the login endpoint variant.
    pub fn with_login_flow(mut self, flow: LoginFlow) -> Self {
        self.login_flow = flow;
        self
    }

    /// Set the overall per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Resolve the base URL from an optional override.
fn resolve_base_url(override_value: Option<&str>) -> Result<ApiUrl> {
    match override_value {
        Some(value) => ApiUrl::new(value),
        None => Ok(default_base_url()),
    }
}

/// The compiled-in default base URL for this build profile.
pub fn default_base_url() -> ApiUrl {
    let url = if cfg!(debug_assertions) {
        DEVELOPMENT_API_URL
    } else {
        PRODUCTION_API_URL
    };
    ApiUrl::new(url).expect("compiled-in base URL is valid")
}
