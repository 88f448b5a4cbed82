//! clipforge - Client SDK for the Clipforge short-video platform API.
//!
//! This library provides the session HTTP client used by Clipforge
//! frontends: password and OAuth login, token persistence behind an
//! injectable store, and transparent single-attempt token refresh on
//! authorization failures.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use clipforge::{ApiClient, ClientConfig, Credentials, MemoryTokenStore};
//!
//! # async fn example() -> clipforge::Result<()> {
//! let client = ApiClient::new(
//!     ClientConfig::from_env()?,
//!     Arc::new(MemoryTokenStore::new()),
//! );
//!
//! client.login(&Credentials::new("user@example.com", "secret")).await?;
//! let user = client.current_user().await?;
//! println!("{}", user.email);
//! # Ok(())
//! # }
//! ```

pub mod auth;
mod client;
pub mod config;
pub mod error;
pub mod rest;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{AccessToken, Credentials, MemoryTokenStore, RefreshToken, SessionEvent, TokenPair, TokenStore};
pub use client::ApiClient;
pub use config::{ClientConfig, LoginFlow};
pub use error::Error;
pub use rest::{Registration, User};
pub use types::{ApiUrl, Provider};

// The HTTP method type accepted by [`ApiClient::request`].
pub use reqwest::Method;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
