// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # OData List Service
//!
//! Republishes the items of a paginated, OData-flavored list API as one
//! streamed JSON array, optionally limited to items modified since a given
//! timestamp.
//!
//! ## Features
//!
//! - **Dialect normalization**: `d`/`d.results`/`d.__next`, `value` +
//!   `odata.nextLink`, and `value` + `@odata.nextLink` behind one interface
//! - **Incremental sync**: `$filter` on the modification time and an
//!   `_updated` field copied from any nested path
//! - **Streaming**: pages are fetched only as fast as the client reads, and
//!   the JSON array is written element by element
//! - **Auth**: Basic, static bearer, or OAuth2 client credentials with token
//!   caching
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use odata_list_service::{Settings, SyncRequest};
//!
//! #[tokio::main]
//! async fn main() -> odata_list_service::Result<()> {
//!     let settings = Settings {
//!         base_url: Some("https://tenant.example/sites/x/_api/web/lists".into()),
//!         username: Some("svc-reader".into()),
//!         password: Some(std::env::var("password").unwrap_or_default()),
//!         ..Settings::default()
//!     };
//!     let engine = settings.build_engine().await?;
//!
//!     let request = SyncRequest::new("GetByTitle('Tasks')/items")
//!         .with_since(Some("2024-01-01T00:00:00Z".into()));
//!     let mut items = engine.start(request).await?;
//!     while let Some(item) = items.next().await {
//!         println!("{}", item?["Title"]);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  GET /{list_path}?since=..&since_path=..                    │
//! └──────────────────────────────┬──────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬──────────┐
//! │ Resolver │   HTTP    │    OData      │  Engine   │  Output  │
//! ├──────────┼───────────┼───────────────┼───────────┼──────────┤
//! │ $select  │ Basic     │ verbose (d)   │ page loop │ JSON     │
//! │ $expand  │ Bearer    │ nextLink      │ _updated  │ array    │
//! │ $filter  │ OAuth2    │ @odata.next.. │           │ chunks   │
//! │          │ Rate limit│ auto-detect   │           │          │
//! └──────────┴───────────┴───────────────┴───────────┴──────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication implementations
pub mod auth;

/// HTTP client with rate limiting
pub mod http;

/// OData page sources and dialect normalizers
pub mod odata;

/// List path and filter resolution
pub mod resolver;

/// Page loop and entity stream
pub mod engine;

/// Streamed JSON array output
pub mod output;

/// Service configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::Settings;
pub use engine::{EntityStream, SyncEngine, SyncRequest};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
