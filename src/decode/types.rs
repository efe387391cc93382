//! Decoder types and traits
//!
//! Defines the pagination-signal abstraction every response passes through.

use super::decoders::{FlagDecoder, MetaDecoder, PageIndexDecoder};
use crate::error::Result;
use crate::pagination::PageRequest;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Pagination signals extracted from one response body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    /// Whether the API reports more data after this page
    pub has_next_page: bool,
    /// Start bound the API suggests for the next request
    pub next_window_start: Option<Timestamp>,
    /// End bound the API suggests for the next request
    pub next_window_end: Option<Timestamp>,
    /// Total page count, when the API reports one
    pub total_pages: Option<u32>,
}

impl PageMeta {
    /// Meta for a page that is followed by more data
    pub fn more() -> Self {
        Self {
            has_next_page: true,
            ..Default::default()
        }
    }

    /// Meta for the final page
    pub fn last() -> Self {
        Self::default()
    }

    /// Attach a suggested window for the next request
    #[must_use]
    pub fn with_window(mut self, start: Timestamp, end: Timestamp) -> Self {
        self.next_window_start = Some(start);
        self.next_window_end = Some(end);
        self
    }

    /// Attach a reported total page count
    #[must_use]
    pub fn with_total_pages(mut self, total: u32) -> Self {
        self.total_pages = Some(total);
        self
    }
}

/// Strategy for reading pagination signals out of a response body
///
/// Implementations fail with
/// [`Error::MalformedResponse`](crate::Error::MalformedResponse) when a field
/// they expect is absent or has the wrong type.
pub trait PageDecoder: Send + Sync {
    /// Decode the body returned for `request`
    fn decode(&self, body: &str, request: &PageRequest) -> Result<PageMeta>;

    /// Whether this decoder can ever report a last page
    ///
    /// Decoders that cannot must be paired with a page count or a page cap.
    fn signals_last_page(&self) -> bool {
        true
    }
}

impl<F> PageDecoder for F
where
    F: Fn(&str, &PageRequest) -> Result<PageMeta> + Send + Sync,
{
    fn decode(&self, body: &str, request: &PageRequest) -> Result<PageMeta> {
        self(body, request)
    }
}

/// Serializable decoder selection, as found in config files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecoderConfig {
    /// `meta` block with page / pages / startTime / endTime
    Meta {
        #[serde(default = "default_page_path")]
        page_path: String,
        #[serde(default = "default_pages_path")]
        pages_path: String,
        /// Set both window paths to `None` to ignore window fields
        #[serde(default = "default_start_path")]
        start_path: Option<String>,
        #[serde(default = "default_end_path")]
        end_path: Option<String>,
    },
    /// Boolean continuation flag
    Flag {
        path: String,
        /// `true` when the flag means "this is the last page"
        #[serde(default)]
        last_page_flag: bool,
        #[serde(default)]
        start_path: Option<String>,
        #[serde(default)]
        end_path: Option<String>,
    },
    /// Page index only, body is not inspected
    PageIndex,
}

fn default_page_path() -> String {
    "meta.page".to_string()
}

fn default_pages_path() -> String {
    "meta.pages".to_string()
}

fn default_start_path() -> Option<String> {
    Some("meta.startTime".to_string())
}

fn default_end_path() -> Option<String> {
    Some("meta.endTime".to_string())
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::Meta {
            page_path: default_page_path(),
            pages_path: default_pages_path(),
            start_path: default_start_path(),
            end_path: default_end_path(),
        }
    }
}

impl DecoderConfig {
    /// Whether the configured decoder can report a last page
    pub fn signals_last_page(&self) -> bool {
        !matches!(self, Self::PageIndex)
    }

    /// Build the configured decoder
    pub fn build(&self) -> Arc<dyn PageDecoder> {
        match self {
            Self::Meta {
                page_path,
                pages_path,
                start_path,
                end_path,
            } => Arc::new(
                MetaDecoder::new()
                    .with_page_paths(page_path, pages_path)
                    .with_window_paths(start_path.clone(), end_path.clone()),
            ),
            Self::Flag {
                path,
                last_page_flag,
                start_path,
                end_path,
            } => {
                let decoder = if *last_page_flag {
                    FlagDecoder::is_last(path)
                } else {
                    FlagDecoder::has_more(path)
                };
                Arc::new(decoder.with_window_paths(start_path.clone(), end_path.clone()))
            }
            Self::PageIndex => Arc::new(PageIndexDecoder),
        }
    }
}
