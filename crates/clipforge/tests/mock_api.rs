//! Mock backend tests for the clipforge client.
//!
//! These tests use wiremock to simulate the backend API and exercise the
//! client's session handling without network access or real credentials.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clipforge::error::{ApiError, AuthError, TransportError};
use clipforge::{
    ApiClient, ApiUrl, ClientConfig, Credentials, Error, LoginFlow, MemoryTokenStore, Provider,
    Registration, SessionEvent, TokenPair, TokenStore, User,
};

/// Helper to build a client against a mock server with the given store.
fn client_for(server: &MockServer, store: Arc<MemoryTokenStore>) -> ApiClient {
    let base = ApiUrl::new(server.uri()).unwrap();
    ApiClient::new(ClientConfig::new(base), store)
}

fn user_body() -> serde_json::Value {
    json!({
        "id": 1,
        "email": "user@example.com",
        "full_name": "Test User",
        "is_active": true
    })
}

// ============================================================================
// Bearer Injection
// ============================================================================

#[tokio::test]
async fn stored_token_is_sent_as_bearer_credential() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_pair(TokenPair::new(
        "access-1",
        "refresh-1",
    )));
    let client = client_for(&server, store);

    let user: User = client.current_user().await.unwrap();
    assert_eq!(user.email, "user@example.com");
}

// ============================================================================
// Refresh and Replay
// ============================================================================

#[tokio::test]
async fn single_401_triggers_one_refresh_and_one_replay() {
    let server = MockServer::start().await;

    // Old access token is rejected once
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token expired"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Refresh rotates the pair
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "old-refresh" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Replay succeeds with the rotated token
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_pair(TokenPair::new(
        "old-access",
        "old-refresh",
    )));
    let client = client_for(&server, store.clone());

    let user: User = client.current_user().await.unwrap();
    assert_eq!(user.id, 1);

    // The rotated pair is persisted
    let pair = store.load().await.unwrap().unwrap();
    assert_eq!(pair.access.as_str(), "new-access");
    assert_eq!(pair.refresh.as_str(), "new-refresh");
}

#[tokio::test]
async fn replay_that_fails_again_does_not_refresh_twice() {
    let server = MockServer::start().await;

    // Every attempt is rejected, including the replay
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token revoked"
        })))
        .expect(2)
        .mount(&server)
        .await;

    // Exactly one refresh is allowed per original request
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_pair(TokenPair::new(
        "old-access",
        "old-refresh",
    )));
    let client = client_for(&server, store.clone());

    let result = client.current_user().await;
    assert!(matches!(
        result,
        Err(Error::Auth(AuthError::Unauthorized { .. }))
    ));

    // The session is not cleared by a rejected replay
    assert!(client.is_authenticated().await);
}

#[tokio::test]
async fn failed_refresh_clears_session_and_emits_expiry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token expired"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Refresh token expired"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_pair(TokenPair::new(
        "old-access",
        "old-refresh",
    )));
    let client = client_for(&server, store.clone());
    let mut events = client.subscribe();

    let result = client.current_user().await;
    assert!(matches!(result, Err(Error::Auth(AuthError::SessionExpired))));

    // Both tokens are gone and the expiry event fired
    assert!(store.load().await.unwrap().is_none());
    assert!(!client.is_authenticated().await);
    assert_eq!(events.recv().await.unwrap(), SessionEvent::Expired);
}

#[tokio::test]
async fn concurrent_401s_rotate_tokens_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token expired"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_pair(TokenPair::new(
        "old-access",
        "old-refresh",
    )));
    let client = client_for(&server, store);

    // Two in-flight requests hit the 401; only one refresh call goes out,
    // the other waits and replays with the rotated token.
    let (a, b) = tokio::join!(client.current_user(), client.current_user());
    assert!(a.is_ok());
    assert!(b.is_ok());
}

#[tokio::test]
async fn refresh_without_stored_tokens_expires_session() {
    // No mocks mounted: with nothing to rotate, the client must not
    // call the refresh endpoint at all.
    let server = MockServer::start().await;
    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
    let mut events = client.subscribe();

    let result = client.refresh().await;

    assert!(matches!(
        result,
        Err(Error::Auth(AuthError::SessionExpired))
    ));
    assert_eq!(events.recv().await.unwrap(), SessionEvent::Expired);
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Login / Registration
// ============================================================================

#[tokio::test]
async fn login_stores_returned_pair() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .and(body_string_contains("username=user%40example.com"))
        .and(body_string_contains("password=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A",
            "refresh_token": "B",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_for(&server, store.clone());

    let pair = client
        .login(&Credentials::new("user@example.com", "secret"))
        .await
        .unwrap();

    assert_eq!(pair.access.as_str(), "A");
    let stored = store.load().await.unwrap().unwrap();
    assert_eq!(stored.access.as_str(), "A");
    assert_eq!(stored.refresh.as_str(), "B");
    assert!(client.is_authenticated().await);
}

#[tokio::test]
async fn json_login_flow_posts_to_auth_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({
            "email": "user@example.com",
            "password": "secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A",
            "refresh_token": "B"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let base = ApiUrl::new(server.uri()).unwrap();
    let config = ClientConfig::new(base).with_login_flow(LoginFlow::Json);
    let client = ApiClient::new(config, Arc::new(MemoryTokenStore::new()));

    client
        .login(&Credentials::new("user@example.com", "secret"))
        .await
        .unwrap();
    assert!(client.is_authenticated().await);
}

#[tokio::test]
async fn rejected_login_surfaces_backend_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Incorrect email or password"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
    let result = client
        .login(&Credentials::new("user@example.com", "wrong"))
        .await;

    match result {
        Err(Error::Auth(AuthError::InvalidCredentials { message })) => {
            assert_eq!(message, "Incorrect email or password");
        }
        other => panic!("expected InvalidCredentials, got {other:?}"),
    }
}

#[tokio::test]
async fn register_creates_account_and_logs_in() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({
            "email": "new@example.com",
            "password": "secret123",
            "full_name": "New User"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "email": "new@example.com",
            "full_name": "New User",
            "is_active": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A",
            "refresh_token": "B"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));

    let registration =
        Registration::new("new@example.com", "secret123").with_full_name("New User");
    let user = client.register(&registration).await.unwrap();

    assert_eq!(user.id, 7);
    assert!(client.is_authenticated().await);
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn logout_notifies_backend_and_clears_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_pair(TokenPair::new(
        "access-1",
        "refresh-1",
    )));
    let client = client_for(&server, store.clone());

    client.logout().await.unwrap();
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn logout_with_unreachable_backend_still_clears_tokens() {
    // Nothing is listening on this port
    let base = ApiUrl::new("http://127.0.0.1:9").unwrap();
    let store = Arc::new(MemoryTokenStore::with_pair(TokenPair::new("a", "b")));
    let client = ApiClient::new(ClientConfig::new(base), store.clone());

    client.logout().await.unwrap();
    assert!(store.load().await.unwrap().is_none());
    assert!(!client.is_authenticated().await);
}

// ============================================================================
// OAuth
// ============================================================================

#[tokio::test]
async fn oauth_callback_exchanges_code_for_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/google/callback"))
        .and(query_param("code", "auth-code-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A",
            "refresh_token": "B"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_for(&server, store.clone());

    client
        .oauth_callback(Provider::Google, "auth-code-123")
        .await
        .unwrap();

    assert!(store.load().await.unwrap().is_some());
}

#[tokio::test]
async fn fetch_authorize_url_returns_backend_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/github/authorize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "authorize_url": "https://github.com/login/oauth/authorize?client_id=abc"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
    let url = client.fetch_authorize_url(Provider::Github).await.unwrap();
    assert!(url.starts_with("https://github.com/login/oauth/authorize"));
}

// ============================================================================
// Error Taxonomy
// ============================================================================

#[tokio::test]
async fn missing_resource_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "User not found"
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_pair(TokenPair::new("a", "b")));
    let client = client_for(&server, store);

    match client.current_user().await {
        Err(Error::Api(ApiError::NotFound { message })) => {
            assert_eq!(message, "User not found");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn validation_failure_carries_field_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [
                {"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error.email"}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
    let result = client
        .register(&Registration::new("not-an-email", "secret123"))
        .await;

    match result {
        Err(Error::Api(ApiError::Validation { status, fields, .. })) => {
            assert_eq!(status, 422);
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].field, "email");
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn server_fault_maps_to_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_pair(TokenPair::new("a", "b")));
    let client = client_for(&server, store);

    match client.current_user().await {
        Err(Error::Api(ApiError::Server { status, message })) => {
            assert_eq!(status, 500);
            assert_eq!(message, "unexpected server error");
        }
        other => panic!("expected Server, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_backend_maps_to_transport_error() {
    let base = ApiUrl::new("http://127.0.0.1:9").unwrap();
    let client = ApiClient::new(ClientConfig::new(base), Arc::new(MemoryTokenStore::new()));

    let result: clipforge::Result<User> = client.current_user().await;
    assert!(matches!(
        result,
        Err(Error::Transport(TransportError::Connection { .. }))
    ));
}

#[tokio::test]
async fn slow_backend_maps_to_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let base = ApiUrl::new(server.uri()).unwrap();
    let config = ClientConfig::new(base).with_timeout(Duration::from_millis(100));
    let store = Arc::new(MemoryTokenStore::with_pair(TokenPair::new(
        "access-1",
        "refresh-1",
    )));
    let client = ApiClient::new(config, store);

    let result: clipforge::Result<User> = client.current_user().await;
    assert!(matches!(
        result,
        Err(Error::Transport(TransportError::Timeout))
    ));
}
