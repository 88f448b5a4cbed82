//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use clipforge::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(client: &ApiClient, _args: LogoutArgs) -> Result<()> {
    client.logout().await.context("Failed to logout")?;

    output::success("Logged out, session cleared");
    Ok(())
}
