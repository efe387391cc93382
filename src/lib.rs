// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # windowed-pager
//!
//! Sequential pagination over REST endpoints that filter by a time window.
//!
//! Every request carries `startTime`, `endTime` and a 1-based `page`. Pages
//! are fetched strictly in order, each one decoded before the next is sent,
//! so a response can move the window for the request after it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use std::sync::Arc;
//! use windowed_pager::{
//!     decode::MetaDecoder, http::HttpClient, PaginatedFetcher, Result, TimeWindow,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let fetcher = PaginatedFetcher::builder(
//!         Arc::new(HttpClient::new()?),
//!         Arc::new(MetaDecoder::default()),
//!     )
//!     .base_url("https://api.airqo.net/api/v2")
//!     .path("devices/measurements")
//!     .window(TimeWindow::parse("2022-11-14T20:00:45.061Z", "2023-11-21T20:00:45.061Z")?)
//!     .total_pages(23)
//!     .build()?;
//!
//!     let pages = fetcher.run();
//!     futures::pin_mut!(pages);
//!     while let Some(page) = pages.next().await {
//!         let page = page?;
//!         println!("page {} ({} bytes)", page.page, page.raw_body.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       PaginatedFetcher                          │
//! │  run() → Stream<PageResult>       fetch_all() → Vec<PageResult> │
//! │  PaginationState: window, page, last-page flag                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────────┬──────────────┴──────────┬───────────────────────┐
//! │   Transport   │       PageDecoder       │        Config         │
//! ├───────────────┼─────────────────────────┼───────────────────────┤
//! │ HttpClient    │ Meta (page/pages/window)│ YAML / JSON           │
//! │ Retry/Backoff │ Flag (boolean path)     │ CLI overrides         │
//! │ Rate Limit    │ Page index              │                       │
//! └───────────────┴─────────────────────────┴───────────────────────┘
//! ```

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

/// HTTP transport with retry and rate limiting
pub mod http;

/// Response decoders that read pagination signals
pub mod decode;

/// Paginated fetch loop
pub mod pagination;

/// Run configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::{load_config, FetchConfig};
pub use pagination::{
    PageRequest, PageResult, PaginatedFetcher, PaginationState, Termination, WindowMode,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
