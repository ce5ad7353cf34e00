//! HTTP client module
//!
//! Provides the HTTP client shared by the extractor and the geocoders.
//!
//! # Features
//!
//! - **Mandatory Timeouts**: every request carries a per-request timeout
//! - **Status Classification**: non-2xx responses become [`crate::Error::HttpStatus`]
//! - **Rate Limiting**: optional token bucket limiter using governor
//!
//! Requests are never retried; callers decide what a failure means.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
