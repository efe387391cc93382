//! Response decoder module
//!
//! Supports: `meta` blocks, boolean continuation flags, page-index only
//!
//! # Overview
//!
//! A [`PageDecoder`] reads the pagination signals out of a response body:
//! whether another page follows and, for window-rotating APIs, which
//! `startTime`/`endTime` the next request should carry. Decoders are
//! injected into the fetcher, so any API layout can be supported without
//! touching the fetch loop.

mod decoders;
mod types;

pub(crate) use decoders::extract_path;
pub use decoders::{FlagDecoder, MetaDecoder, PageIndexDecoder};
pub use types::{DecoderConfig, PageDecoder, PageMeta};
