//! Token persistence.
//!
//! The browser original kept tokens in local storage behind fixed keys;
//! here persistence sits behind the [`TokenStore`] trait so the client
//! can be wired to memory, a file, or a platform keychain.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;

use super::tokens::TokenPair;

/// Persistent storage for the session token pair.
///
/// A store holds either a whole pair or nothing. `save` replaces any
/// existing pair atomically with respect to `load`; `clear` is
/// unconditional and must succeed even when no pair is stored.
///
/// Only the client's login, refresh, logout, and OAuth-callback paths
/// write the store; anything may read it.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the stored pair, if any.
    async fn load(&self) -> Result<Option<TokenPair>, StoreError>;

    /// Replace the stored pair.
    async fn save(&self, pair: &TokenPair) -> Result<(), StoreError>;

    /// Remove any stored pair.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory token store.
///
/// The default store for tests and for embedders that manage persistence
/// themselves.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    pair: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a pair, e.g. one restored by the
    /// embedder from its own persistence.
    pub fn with_pair(pair: TokenPair) -> Self {
        Self {
            pair: RwLock::new(Some(pair)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<TokenPair>, StoreError> {
        Ok(self.pair.read().await.clone())
    }

    async fn save(&self, pair: &TokenPair) -> Result<(), StoreError> {
        *self.pair.write().await = Some(pair.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.pair.write().await = None;
        Ok(())
    }
}
