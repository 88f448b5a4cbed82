//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use clipforge::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Output the profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(client: &ApiClient, args: WhoamiArgs) -> Result<()> {
    if !client.is_authenticated().await {
        anyhow::bail!("No active session. Run 'clipforge login' first.");
    }

    let user = client
        .current_user()
        .await
        .context("Failed to fetch profile")?;

    if args.json {
        return output::json_pretty(&user);
    }

    output::field("Email", &user.email);
    if let Some(full_name) = &user.full_name {
        output::field("Name", full_name);
    }
    output::field("Active", if user.is_active { "yes" } else { "no" });

    Ok(())
}
