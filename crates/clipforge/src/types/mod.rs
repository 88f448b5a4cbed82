//! Core validated types for the clipforge client.

mod api_url;
mod provider;

pub use api_url::ApiUrl;
pub use provider::Provider;
