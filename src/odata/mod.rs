//! OData page module
//!
//! Supports three response dialects of the upstream list API:
//!
//! | Dialect           | Entities             | Next-page cursor      |
//! |-------------------|----------------------|-----------------------|
//! | `verbose`         | `d` or `d.results`   | `d.__next`            |
//! | `next-link`       | `value`              | `odata.nextLink`      |
//! | `odata-next-link` | `value`              | `@odata.nextLink`     |
//!
//! # Overview
//!
//! A `PageSource` fetches one authenticated page and a `PageNormalizer`
//! turns its body into entities plus an optional cursor. The entity stream
//! in the engine module drives both.

mod dialects;
mod source;
mod types;

pub use dialects::{
    normalizer_for, AutoDetect, ValueDialect, VerboseDialect, NEXT_LINK_KEY, ODATA_NEXT_LINK_KEY,
    VERBOSE_NEXT_KEY,
};
pub use source::UpstreamClient;
pub use types::{Page, PageNormalizer, PageSource, PageTarget, RawPage};
