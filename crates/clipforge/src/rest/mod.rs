//! REST transport: endpoint definitions, request descriptors, and the
//! low-level HTTP client.

mod client;
pub mod endpoints;
mod request;

pub use endpoints::{AuthorizeUrlResponse, Registration, TokenPairResponse, User};

pub(crate) use client::RestClient;
pub(crate) use request::{Attempt, Payload, RequestSpec};
