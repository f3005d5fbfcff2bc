//! Page types and capability traits
//!
//! Defines the two seams of the page fetcher: fetching one authenticated page
//! (`PageSource`) and normalizing its body (`PageNormalizer`).

use crate::error::Result;
use crate::types::{Cursor, Entity, JsonValue};
use async_trait::async_trait;

/// One normalized upstream page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Entities in upstream order
    pub entities: Vec<Entity>,
    /// Locator of the next page, absent on the last page
    pub next: Option<Cursor>,
}

impl Page {
    /// Create a page
    pub fn new(entities: Vec<Entity>, next: Option<Cursor>) -> Self {
        Self { entities, next }
    }

    /// A page with no entities and no cursor
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this is the last page
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

/// Where to fetch a page from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTarget {
    /// The first page, addressed by the resolved list URL
    Url(String),
    /// A subsequent page, addressed by the upstream's cursor
    Cursor(Cursor),
}

impl PageTarget {
    /// The request target handed to the HTTP layer
    pub fn as_str(&self) -> &str {
        match self {
            PageTarget::Url(url) => url,
            PageTarget::Cursor(cursor) => cursor.as_str(),
        }
    }
}

/// An undecoded upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// HTTP status code
    pub status: u16,
    /// Response body text
    pub body: String,
}

impl RawPage {
    /// Create a raw page
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the upstream answered 200
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Fetches one authenticated page from the upstream service
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fail with a configuration error if credentials are incomplete
    ///
    /// Called once per request pipeline before the first fetch.
    fn ensure_configured(&self) -> Result<()> {
        Ok(())
    }

    /// Issue a single GET for the target
    ///
    /// Transport failures are errors; any HTTP status is returned as-is.
    async fn fetch(&self, target: &PageTarget) -> Result<RawPage>;
}

/// Extracts entities and the next cursor from a decoded page body
pub trait PageNormalizer: Send + Sync {
    /// Normalize one page body
    ///
    /// Bodies without a recognized shape yield an empty terminal page.
    fn normalize(&self, body: JsonValue) -> Page;
}
