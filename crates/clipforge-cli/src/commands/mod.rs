//! Command implementations.

pub mod login;
pub mod logout;
pub mod oauth_url;
pub mod refresh;
pub mod register;
pub mod whoami;

use std::sync::Arc;

use anyhow::{Context, Result};
use clipforge::{ApiClient, ApiUrl, ClientConfig};

use crate::cli::{Cli, Commands};
use crate::store::FileTokenStore;

pub async fn handle(cli: Cli) -> Result<()> {
    let client = build_client(cli.api_url.as_deref())?;

    match cli.command {
        Commands::Login(args) => login::run(&client, args).await,
        Commands::Register(args) => register::run(&client, args).await,
        Commands::Whoami(args) => whoami::run(&client, args).await,
        Commands::Refresh(args) => refresh::run(&client, args).await,
        Commands::Logout(args) => logout::run(&client, args).await,
        Commands::OauthUrl(args) => oauth_url::run(&client, args).await,
    }
}

/// Build a client against the flag, environment, or compiled-in base URL,
/// with the session persisted to the default session file.
fn build_client(api_url: Option<&str>) -> Result<ApiClient> {
    let config = match api_url {
        Some(value) => ClientConfig::new(ApiUrl::new(value).context("Invalid API URL")?),
        None => ClientConfig::from_env().context("Invalid CLIPFORGE_API_URL")?,
    };

    let store = FileTokenStore::default_path().context("Failed to open session store")?;
    Ok(ApiClient::new(config, Arc::new(store)))
}
