//! The session HTTP client.
//!
//! [`ApiClient`] wraps every outbound call with base-URL resolution,
//! bearer-credential injection, error mapping, and one automatic token
//! refresh on an authorization failure. Tokens live behind an injected
//! [`TokenStore`]; session expiry is surfaced as a broadcast
//! [`SessionEvent`] rather than a navigation side effect.

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::auth::{
    AccessToken, Credentials, SessionEvent, SessionEvents, TokenPair, TokenStore,
};
use crate::config::{ClientConfig, LoginFlow};
use crate::error::{AuthError, Error, InvalidInputError};
use crate::rest::endpoints::{
    self, AuthorizeUrlResponse, LoginRequest, RefreshRequest, Registration, TokenPairResponse,
    User,
};
use crate::rest::{Attempt, RequestSpec, RestClient};
use crate::types::{ApiUrl, Provider};
use crate::Result;

/// HTTP client for the backend API with session handling.
///
/// Clients are cheap to clone (they share an internal `Arc`) and safe to
/// use from concurrent tasks. Each request carries its own refresh
/// budget; refreshes themselves are serialized so that a burst of 401s
/// rotates the token pair once.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use clipforge::{ApiClient, ClientConfig, Credentials, MemoryTokenStore};
///
/// # async fn example() -> clipforge::Result<()> {
/// let config = ClientConfig::from_env()?;
/// let client = ApiClient::new(config, Arc::new(MemoryTokenStore::new()));
///
/// client.login(&Credentials::new("user@example.com", "secret")).await?;
/// let user = client.current_user().await?;
/// println!("logged in as {}", user.email);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    rest: RestClient,
    store: Arc<dyn TokenStore>,
    config: ClientConfig,
    events: SessionEvents,
    // Serializes token rotation across concurrent 401s.
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    /// Create a client from a configuration and a token store.
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Self {
        let rest = RestClient::new(config.base_url.clone(), config.timeout);
        Self {
            inner: Arc::new(ClientInner {
                rest,
                store,
                config,
                events: SessionEvents::new(),
                refresh_lock: Mutex::new(()),
            }),
        }
    }

    /// Create a client configured from the environment with the given store.
    pub fn from_env(store: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self::new(ClientConfig::from_env()?, store))
    }

    /// Returns the API base URL this client talks to.
    pub fn base_url(&self) -> &ApiUrl {
        self.inner.rest.base()
    }

    /// Subscribe to session lifecycle events.
    ///
    /// A UI embedding the client would typically navigate to its login
    /// entry point on [`SessionEvent::Expired`].
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    // ========================================================================
    // Generic requests
    // ========================================================================

    /// Make an authenticated GET request.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.execute(RequestSpec::get(path)).await
    }

    /// Make an authenticated POST request with a JSON body.
    pub async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        self.execute(RequestSpec::post_body(path, body)?).await
    }

    /// Make an authenticated request with an optional raw JSON body.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<R> {
        let mut spec = RequestSpec::get(path);
        spec.method = method;
        if let Some(body) = body {
            spec.payload = crate::rest::Payload::Json(body);
        }
        self.execute(spec).await
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Authenticate with email and password.
    ///
    /// On success both tokens are stored atomically and the pair is
    /// returned. A 401 from the backend is surfaced as
    /// [`AuthError::InvalidCredentials`] carrying the backend message.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair> {
        info!("Logging in");

        let spec = match self.inner.config.login_flow {
            LoginFlow::PasswordForm => RequestSpec::post_form(
                endpoints::TOKEN,
                vec![
                    ("username".to_string(), credentials.email().to_string()),
                    ("password".to_string(), credentials.password().to_string()),
                ],
            ),
            LoginFlow::Json => RequestSpec::post_body(
                endpoints::LOGIN,
                &LoginRequest {
                    email: credentials.email(),
                    password: credentials.password(),
                },
            )?,
        }
        .unauthenticated();

        let response: TokenPairResponse = match self.inner.rest.send(&spec, None).await {
            Ok(response) => response,
            Err(Error::Auth(AuthError::Unauthorized { message })) => {
                return Err(AuthError::InvalidCredentials { message }.into());
            }
            Err(err) => return Err(err),
        };

        let pair = TokenPair::from(response);
        self.inner.store.save(&pair).await?;

        debug!("Login succeeded, tokens stored");
        Ok(pair)
    }

    /// Create an account and establish a session.
    ///
    /// The backend returns the created user; the client then logs in with
    /// the same credentials so the session is ready immediately.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<User> {
        info!("Registering account");

        let spec = RequestSpec::post_body(endpoints::REGISTER, registration)?.unauthenticated();
        let user: User = self.inner.rest.send(&spec, None).await?;

        self.login(&Credentials::new(&registration.email, &registration.password))
            .await?;

        Ok(user)
    }

    /// End the session.
    ///
    /// The backend is notified best-effort; the stored tokens are cleared
    /// unconditionally, even when the backend is unreachable.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        info!("Logging out");

        let token = self.access_token().await.unwrap_or(None);
        let spec = RequestSpec::post(endpoints::LOGOUT);
        if let Err(err) = self.inner.rest.send_no_content(&spec, token.as_ref()).await {
            warn!(error = %err, "Logout notification failed");
        }

        self.inner.store.clear().await?;
        Ok(())
    }

    /// Returns true when a token pair is stored.
    ///
    /// A pure predicate over the store; no network call and no expiry
    /// check.
    pub async fn is_authenticated(&self) -> bool {
        matches!(self.inner.store.load().await, Ok(Some(_)))
    }

    /// Refresh the session tokens.
    ///
    /// On success the rotated pair is persisted and returned. On failure
    /// (no refresh token stored, or the refresh call fails) the store is
    /// cleared, [`SessionEvent::Expired`] is emitted, and
    /// [`AuthError::SessionExpired`] is returned.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<TokenPair> {
        let _guard = self.inner.refresh_lock.lock().await;
        self.rotate_or_expire().await
    }

    /// Fetch the current user profile.
    pub async fn current_user(&self) -> Result<User> {
        self.get(endpoints::CURRENT_USER).await
    }

    // ========================================================================
    // OAuth
    // ========================================================================

    /// Build the redirect-style OAuth entry URL for a provider.
    ///
    /// Pure URL construction, no network I/O; navigating there is the
    /// caller's responsibility. The redirect URI points back at
    /// `{origin}/auth/{provider}/callback`.
    pub fn oauth_url(&self, provider: Provider, origin: &str) -> Result<String> {
        let parsed = Url::parse(origin).map_err(|e| InvalidInputError::Origin {
            value: origin.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(InvalidInputError::Origin {
                value: origin.to_string(),
                reason: "must be an http(s) origin".to_string(),
            }
            .into());
        }

        let redirect_uri = format!(
            "{}/auth/{}/callback",
            origin.trim_end_matches('/'),
            provider
        );

        let entry = self
            .base_url()
            .endpoint(&format!("/auth/{provider}"));
        let mut url = Url::parse(&entry).expect("endpoint URL is valid");
        url.query_pairs_mut().append_pair("redirect_uri", &redirect_uri);

        Ok(url.to_string())
    }

    /// Fetch the backend-issued authorize URL for a provider.
    ///
    /// The alternative OAuth entry style: the backend constructs the
    /// provider authorize URL and the caller navigates to it.
    pub async fn fetch_authorize_url(&self, provider: Provider) -> Result<String> {
        let response: AuthorizeUrlResponse = self
            .execute(RequestSpec::get(endpoints::oauth_authorize(provider.as_str())))
            .await?;
        Ok(response.authorize_url)
    }

    /// Exchange an OAuth authorization code for a session.
    ///
    /// Called with the `code` the provider appended to the callback URL;
    /// stores the returned pair atomically.
    #[instrument(skip(self, code), fields(%provider))]
    pub async fn oauth_callback(&self, provider: Provider, code: &str) -> Result<TokenPair> {
        info!("Exchanging OAuth authorization code");

        let spec = RequestSpec::get(endpoints::oauth_callback(provider.as_str()))
            .with_query("code", code)
            .unauthenticated();

        let response: TokenPairResponse = self.inner.rest.send(&spec, None).await?;
        let pair = TokenPair::from(response);
        self.inner.store.save(&pair).await?;

        Ok(pair)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Dispatch a request, spending the refresh budget on a 401.
    async fn execute<R: DeserializeOwned>(&self, spec: RequestSpec) -> Result<R> {
        let mut attempt = Attempt::first(&spec);
        loop {
            let token = if spec.authenticated {
                self.access_token().await?
            } else {
                None
            };

            match self.inner.rest.send(&spec, token.as_ref()).await {
                Err(err) if err.is_auth_failure() && attempt.can_refresh() => {
                    debug!(path = %spec.path, "Bearer credential rejected, refreshing session");
                    self.refresh_for_replay(token).await?;
                    attempt = attempt.after_refresh();
                }
                outcome => return outcome,
            }
        }
    }

    async fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self.inner.store.load().await?.map(|pair| pair.access))
    }

    /// Refresh after a 401, unless another request already rotated the
    /// tokens while this one waited on the lock.
    async fn refresh_for_replay(&self, stale: Option<AccessToken>) -> Result<()> {
        let _guard = self.inner.refresh_lock.lock().await;

        match (self.inner.store.load().await?, stale) {
            // Tokens changed since the failed attempt; replay with them.
            (Some(current), Some(stale)) if current.access.as_str() != stale.as_str() => Ok(()),
            (Some(_), None) => Ok(()),
            _ => self.rotate_or_expire().await.map(|_| ()),
        }
    }

    /// Rotate the token pair, clearing the session when rotation fails.
    /// Caller must hold the refresh lock.
    async fn rotate_or_expire(&self) -> Result<TokenPair> {
        match self.rotate_tokens().await {
            Ok(rotated) => {
                debug!("Session refreshed");
                Ok(rotated)
            }
            // Store failures are surfaced as-is; they say nothing about
            // the session's validity.
            Err(err @ Error::Store(_)) => Err(err),
            Err(err) => {
                warn!(error = %err, "Token refresh failed, clearing session");
                self.expire_session().await?;
                Err(AuthError::SessionExpired.into())
            }
        }
    }

    /// Call the refresh endpoint with the stored refresh token and
    /// persist the rotated pair.
    async fn rotate_tokens(&self) -> Result<TokenPair> {
        let pair = self
            .inner
            .store
            .load()
            .await?
            .ok_or(AuthError::RefreshTokenMissing)?;

        let spec = RequestSpec::post_body(
            endpoints::REFRESH,
            &RefreshRequest {
                refresh_token: pair.refresh.as_str(),
            },
        )?
        .unauthenticated();

        let response: TokenPairResponse = self.inner.rest.send(&spec, None).await?;
        let rotated = TokenPair::from(response);
        self.inner.store.save(&rotated).await?;
        Ok(rotated)
    }

    /// Clear the stored pair and notify subscribers.
    async fn expire_session(&self) -> Result<()> {
        self.inner.store.clear().await?;
        self.inner.events.emit(SessionEvent::Expired);
        Ok(())
    }
}

// Custom Debug impl that stays clear of the token store contents
impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", self.base_url())
            .field("login_flow", &self.inner.config.login_flow)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use crate::config::default_base_url;

    fn test_client() -> ApiClient {
        ApiClient::new(
            ClientConfig::new(default_base_url()),
            Arc::new(MemoryTokenStore::new()),
        )
    }

    #[test]
    fn oauth_url_encodes_redirect_uri() {
        let client = ApiClient::new(
            ClientConfig::new(ApiUrl::new("https://api.example.com/api/v1").unwrap()),
            Arc::new(MemoryTokenStore::new()),
        );

        let url = client
            .oauth_url(Provider::Google, "https://app.example.com")
            .unwrap();

        assert_eq!(
            url,
            "https://api.example.com/api/v1/auth/google?redirect_uri=https%3A%2F%2Fapp.example.com%2Fauth%2Fgoogle%2Fcallback"
        );
    }

    #[test]
    fn oauth_url_trims_origin_trailing_slash() {
        let client = test_client();
        let url = client
            .oauth_url(Provider::Github, "https://app.example.com/")
            .unwrap();
        assert!(url.contains("app.example.com%2Fauth%2Fgithub%2Fcallback"));
    }

    #[test]
    fn oauth_url_rejects_bad_origin() {
        let client = test_client();
        assert!(client.oauth_url(Provider::Google, "not-an-origin").is_err());
        assert!(client.oauth_url(Provider::Google, "ftp://example.com").is_err());
    }

    #[tokio::test]
    async fn fresh_client_is_not_authenticated() {
        let client = test_client();
        assert!(!client.is_authenticated().await);
    }
}
