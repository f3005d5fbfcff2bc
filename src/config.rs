//! Service configuration
//!
//! Every setting can be given as a command-line flag or read from the
//! environment. Environment names match the deployment variables the service
//! has always used (`sharepoint_site`, `username`, `password`, `port`).

use crate::auth::AuthConfig;
use crate::engine::SyncEngine;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::odata::{normalizer_for, PageNormalizer, UpstreamClient};
use crate::resolver::{ExpansionTable, PathResolver};
use crate::types::{AuthMode, Dialect};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// `Accept` value for the verbose dialect (and auto-detection)
pub const ACCEPT_VERBOSE: &str = "application/json;odata=verbose";

/// `Accept` value for the `value`-keyed dialects
pub const ACCEPT_JSON: &str = "application/json";

/// Upstream request timeout unless configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Settings
// ============================================================================

/// Upstream connection settings
#[derive(Args, Clone)]
pub struct Settings {
    /// Base URL of the upstream API (e.g. https://tenant/sites/x/_api/web/lists)
    #[arg(long, env = "sharepoint_site", global = true)]
    pub base_url: Option<String>,

    /// Credential scheme used against the upstream API
    #[arg(long, env = "auth_mode", value_enum, default_value_t = AuthMode::Basic, global = true)]
    pub auth_mode: AuthMode,

    /// Username for basic auth
    #[arg(long, env = "username", global = true)]
    pub username: Option<String>,

    /// Password for basic auth
    #[arg(long, env = "password", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Static bearer token
    #[arg(long, env = "access_token", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// OAuth2 token endpoint
    #[arg(long, env = "token_url", global = true)]
    pub token_url: Option<String>,

    /// OAuth2 client id
    #[arg(long, env = "client_id", global = true)]
    pub client_id: Option<String>,

    /// OAuth2 client secret
    #[arg(long, env = "client_secret", hide_env_values = true, global = true)]
    pub client_secret: Option<String>,

    /// OAuth2 scopes (comma-separated)
    #[arg(long, env = "scope", value_delimiter = ',', global = true)]
    pub scope: Vec<String>,

    /// Response dialect of the upstream deployment
    #[arg(long, env = "odata_dialect", value_enum, default_value_t = Dialect::Auto, global = true)]
    pub dialect: Dialect,

    /// YAML file with per-list `$select` / `$expand` rules
    #[arg(long, env = "expansions_file", global = true)]
    pub expansions: Option<PathBuf>,

    /// Upstream request timeout in seconds
    #[arg(long, env = "request_timeout", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Outbound request limit shared by all requests (unlimited when unset)
    #[arg(long, env = "requests_per_second", global = true)]
    pub requests_per_second: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: None,
            auth_mode: AuthMode::Basic,
            username: None,
            password: None,
            token: None,
            token_url: None,
            client_id: None,
            client_secret: None,
            scope: Vec::new(),
            dialect: Dialect::Auto,
            expansions: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            requests_per_second: None,
        }
    }
}

impl Settings {
    /// The configured base URL
    pub fn base_url(&self) -> Result<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::missing_field("base_url"))
    }

    /// Credentials for the configured auth mode
    ///
    /// Missing values are passed through empty; `AuthConfig::validate`
    /// reports them when a request is attempted.
    pub fn auth_config(&self) -> AuthConfig {
        let value = |field: &Option<String>| field.clone().unwrap_or_default();

        match self.auth_mode {
            AuthMode::None => AuthConfig::None,
            AuthMode::Basic => AuthConfig::Basic {
                username: value(&self.username),
                password: value(&self.password),
            },
            AuthMode::Bearer => AuthConfig::Bearer {
                token: value(&self.token),
            },
            AuthMode::Oauth2 => AuthConfig::Oauth2ClientCredentials {
                token_url: value(&self.token_url),
                client_id: value(&self.client_id),
                client_secret: value(&self.client_secret),
                scopes: self
                    .scope
                    .iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
        }
    }

    /// HTTP client settings for page requests
    pub fn http_config(&self, base_url: &str) -> HttpClientConfig {
        let accept = match self.dialect {
            Dialect::Auto | Dialect::Verbose => ACCEPT_VERBOSE,
            Dialect::NextLink | Dialect::OdataNextLink => ACCEPT_JSON,
        };

        let mut builder = HttpClientConfig::builder()
            .base_url(base_url)
            .timeout(Duration::from_secs(self.timeout_secs))
            .header("Accept", accept);

        if let Some(rps) = self.requests_per_second.filter(|rps| *rps > 0) {
            builder = builder.rate_limit(RateLimiterConfig::per_second(rps));
        }

        builder.build()
    }

    /// Built-in expansion rules, overridden by the expansions file if given
    pub fn expansion_table(&self) -> Result<ExpansionTable> {
        let builtin = ExpansionTable::builtin();
        match &self.expansions {
            Some(path) => {
                let overrides = ExpansionTable::load(path)?;
                info!(
                    path = %path.display(),
                    lists = overrides.len(),
                    "Loaded list expansion rules"
                );
                Ok(builtin.merged_with(overrides))
            }
            None => Ok(builtin),
        }
    }

    /// Wire up the sync engine
    ///
    /// When the credentials are complete and use a token endpoint, the token
    /// is fetched here so that the first request does not pay for it.
    /// Incomplete credentials are only logged; every request then fails with
    /// a configuration error.
    pub async fn build_engine(&self) -> Result<SyncEngine> {
        let base_url = self.base_url()?;
        let auth_config = self.auth_config();

        let http = HttpClient::with_auth(self.http_config(base_url), auth_config.clone())?;

        match auth_config.validate() {
            Ok(()) => {
                if let Some(auth) = http.authenticator() {
                    auth.warm_up().await?;
                }
            }
            Err(e) => warn!("Upstream credentials are incomplete: {e}"),
        }

        let normalizer: Arc<dyn PageNormalizer> = Arc::from(normalizer_for(self.dialect));
        let resolver = PathResolver::new(base_url, self.dialect, self.expansion_table()?);

        info!(
            base_url,
            dialect = %self.dialect,
            auth = ?self.auth_mode,
            "Configured upstream list service"
        );

        Ok(SyncEngine::new(
            Arc::new(UpstreamClient::new(http)),
            normalizer,
            resolver,
        ))
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("auth_mode", &self.auth_mode)
            .field("username", &self.username)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .field("dialect", &self.dialect)
            .field("expansions", &self.expansions)
            .field("timeout_secs", &self.timeout_secs)
            .field("requests_per_second", &self.requests_per_second)
            .finish_non_exhaustive()
    }
}
