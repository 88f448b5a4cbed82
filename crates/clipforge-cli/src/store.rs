//! File-backed token store.
//!
//! The CLI analog of the browser's local storage: the token pair is kept
//! in a JSON session file under the user data directory, with restrictive
//! permissions.

use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use clipforge::error::StoreError;
use clipforge::{TokenPair, TokenStore};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
    refresh_token: String,
}

/// Token store backed by a JSON file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store at an explicit path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Create a store at the default session file location.
    pub fn default_path() -> Result<Self, StoreError> {
        let dirs = ProjectDirs::from("", "", "clipforge")
            .ok_or_else(|| StoreError::new("could not determine config directory"))?;

        let data_dir = dirs.data_dir();
        fs::create_dir_all(data_dir)?;

        Ok(Self::new(data_dir.join("session.json")))
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<TokenPair>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let stored: StoredSession = serde_json::from_str(&json)
            .map_err(|e| StoreError::new(format!("invalid session file: {e}")))?;

        Ok(Some(TokenPair::new(
            stored.access_token,
            stored.refresh_token,
        )))
    }

    async fn save(&self, pair: &TokenPair) -> Result<(), StoreError> {
        let stored = StoredSession {
            access_token: pair.access.as_str().to_string(),
            refresh_token: pair.refresh.as_str().to_string(),
        };

        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| StoreError::new(e.to_string()))?;
        fs::write(&self.path, &json)?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
