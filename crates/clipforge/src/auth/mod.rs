//! Authentication primitives: credentials, tokens, storage, and session
//! lifecycle events.

mod credentials;
mod events;
mod store;
mod tokens;

pub use credentials::Credentials;
pub use events::SessionEvent;
pub use store::{MemoryTokenStore, TokenStore};
pub use tokens::{AccessToken, RefreshToken, TokenPair};

pub(crate) use events::SessionEvents;
