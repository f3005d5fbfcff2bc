//! Common types used throughout the list service
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// One upstream list record
pub type Entity = serde_json::Map<String, JsonValue>;

/// Key added to each entity when an "updated" path is requested
pub const UPDATED_KEY: &str = "_updated";

// ============================================================================
// Cursor
// ============================================================================

/// Opaque locator of the next upstream page
///
/// Either a full URL or a continuation token. It is handed back to the page
/// source verbatim and never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a raw cursor value, treating an empty value as absent
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The raw cursor value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Dialect
// ============================================================================

/// Response/pagination shape of an upstream deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// Detect the shape on every response (`d` first, then `value`)
    #[default]
    Auto,
    /// Entities under `d` / `d.results`, cursor at `d.__next`
    Verbose,
    /// Entities under `value`, cursor at `odata.nextLink`
    NextLink,
    /// Entities under `value`, cursor at `@odata.nextLink`
    OdataNextLink,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Auto => "auto",
            Dialect::Verbose => "verbose",
            Dialect::NextLink => "next-link",
            Dialect::OdataNextLink => "odata-next-link",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Auth Mode
// ============================================================================

/// Which credential scheme is used against the upstream service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Username/password sent with every request
    #[default]
    Basic,
    /// Static bearer token
    Bearer,
    /// OAuth2 client credentials grant
    Oauth2,
    /// No credentials
    None,
}
