//! HTTP client module
//!
//! Provides the outbound HTTP client used to fetch upstream pages.
//!
//! # Features
//!
//! - **Authentication**: Integration with auth module
//! - **Rate Limiting**: Optional token bucket rate limiter using governor
//! - **Relative Targets**: Resolves paths against a configured base URL

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
