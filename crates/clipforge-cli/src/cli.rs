//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::{login, logout, oauth_url, refresh, register, whoami};

/// Clipforge API exploration tool.
#[derive(Parser, Debug)]
#[command(name = "clipforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL (overrides CLIPFORGE_API_URL and the compiled-in default)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with email and password
    Login(login::LoginArgs),

    /// Create an account and log in
    Register(register::RegisterArgs),

    /// Display the current user profile
    Whoami(whoami::WhoamiArgs),

    /// Refresh the session tokens
    Refresh(refresh::RefreshArgs),

    /// End the session
    Logout(logout::LogoutArgs),

    /// Print an OAuth login URL for a provider
    OauthUrl(oauth_url::OauthUrlArgs),
}
