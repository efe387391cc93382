//! HTTP module
//!
//! The [`Transport`] trait is the only thing the fetch loop depends on.
//! [`HttpClient`] is the reqwest-backed implementation.
//!
//! # Features
//!
//! - **Error Classification**: transport, status and body-read failures
//! - **Optional Retries**: Constant, linear, and exponential backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod rate_limit;
mod transport;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::Transport;
