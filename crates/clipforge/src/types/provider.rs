//! OAuth provider identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A federated login provider supported by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Github,
    Linkedin,
}

impl Provider {
    /// Returns the provider identifier as used in backend paths,
    /// e.g. `/auth/google/callback`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Github => "github",
            Provider::Linkedin => "linkedin",
        }
    }

    /// All supported providers.
    pub const ALL: [Provider; 3] = [Provider::Google, Provider::Github, Provider::Linkedin];
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Provider::Google),
            "github" => Ok(Provider::Github),
            "linkedin" => Ok(Provider::Linkedin),
            _ => Err(InvalidInputError::Provider {
                value: s.to_string(),
            }
            .into()),
        }
    }
}
