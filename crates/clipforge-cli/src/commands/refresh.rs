//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;

use clipforge::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(client: &ApiClient, _args: RefreshArgs) -> Result<()> {
    client
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed");
    Ok(())
}
