//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use clipforge::{ApiClient, Registration};

use crate::output;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,

    /// Display name
    #[arg(long)]
    pub full_name: Option<String>,
}

pub async fn run(client: &ApiClient, args: RegisterArgs) -> Result<()> {
    let mut registration = Registration::new(&args.email, &args.password);
    if let Some(full_name) = &args.full_name {
        registration = registration.with_full_name(full_name);
    }

    eprintln!("{}", "Creating account...".dimmed());

    let user = client
        .register(&registration)
        .await
        .context("Failed to register")?;

    output::success("Account created and logged in");
    println!();
    output::field("Email", &user.email);
    if let Some(full_name) = &user.full_name {
        output::field("Name", full_name);
    }

    Ok(())
}
