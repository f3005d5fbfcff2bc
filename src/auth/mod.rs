//! Authentication module
//!
//! Supports: Basic (username/password), Bearer, OAuth2 client credentials
//!
//! The `Authenticator` applies credentials to upstream page requests and
//! owns the token cache for schemes that need token refresh.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken};
