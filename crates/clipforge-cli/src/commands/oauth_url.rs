//! OAuth URL command implementation.

use anyhow::{Context, Result};
use clap::Args;

use clipforge::{ApiClient, Provider};

#[derive(Args, Debug)]
pub struct OauthUrlArgs {
    /// Federated login provider
    #[arg(long, value_parser = parse_provider)]
    pub provider: Provider,

    /// Frontend origin the provider should redirect back to
    #[arg(long, default_value = "http://localhost:3000")]
    pub origin: String,

    /// Ask the backend for its authorize URL instead of building the
    /// redirect-style entry URL locally
    #[arg(long)]
    pub fetch: bool,
}

fn parse_provider(value: &str) -> Result<Provider, String> {
    value.parse().map_err(|_| {
        let known: Vec<&str> = Provider::ALL.iter().map(Provider::as_str).collect();
        format!("unknown provider '{value}', expected one of: {}", known.join(", "))
    })
}

pub async fn run(client: &ApiClient, args: OauthUrlArgs) -> Result<()> {
    let url = if args.fetch {
        client
            .fetch_authorize_url(args.provider)
            .await
            .context("Failed to fetch authorize URL")?
    } else {
        client
            .oauth_url(args.provider, &args.origin)
            .context("Failed to build OAuth URL")?
    };

    println!("{url}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_value() {
        assert_eq!(parse_provider("github").unwrap(), Provider::Github);
    }

    #[test]
    fn unknown_provider_error_lists_supported_values() {
        let err = parse_provider("facebook").unwrap_err();
        assert!(err.contains("google, github, linkedin"));
    }
}
