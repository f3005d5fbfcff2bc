//! Auth configuration types
//!
//! These types represent the resolved credentials used against the upstream
//! list service.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// Username/password credentials
    ///
    /// Sent as HTTP Basic. Deployments fronted by NTLM must accept Basic over
    /// TLS; the NTLM handshake itself is not performed.
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },

    /// Static bearer token
    Bearer {
        /// The bearer token
        token: String,
    },

    /// OAuth2 Client Credentials flow
    Oauth2ClientCredentials {
        /// Token endpoint URL
        token_url: String,
        /// Client ID
        client_id: String,
        /// Client secret
        client_secret: String,
        /// Requested scopes
        scopes: Vec<String>,
    },
}

impl AuthConfig {
    /// Check that every credential this scheme needs is present
    ///
    /// Runs before any upstream request so that missing settings surface as
    /// configuration errors rather than as upstream 401s.
    pub fn validate(&self) -> Result<()> {
        match self {
            AuthConfig::None => Ok(()),
            AuthConfig::Basic { username, password } => {
                require("username", username)?;
                require("password", password)
            }
            AuthConfig::Bearer { token } => require("token", token),
            AuthConfig::Oauth2ClientCredentials {
                token_url,
                client_id,
                client_secret,
                ..
            } => {
                require("token_url", token_url)?;
                require("client_id", client_id)?;
                require("client_secret", client_secret)
            }
        }
    }

    /// Whether this scheme obtains tokens from a token endpoint
    pub fn uses_token_endpoint(&self) -> bool {
        matches!(self, AuthConfig::Oauth2ClientCredentials { .. })
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::missing_field(field))
    } else {
        Ok(())
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false,
        }
    }
}
