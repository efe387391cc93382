//! Pagination types
//!
//! Requests, results and the loop-owned cursor state.

use crate::decode::PageMeta;
use crate::error::{Error, Result};
use crate::types::{format_timestamp, JsonValue, TimeWindow, Timestamp};
use serde::{Deserialize, Serialize};
use url::Url;

/// Query parameter carrying the window start
pub const START_TIME_PARAM: &str = "startTime";
/// Query parameter carrying the window end
pub const END_TIME_PARAM: &str = "endTime";
/// Query parameter carrying the 1-based page number
pub const PAGE_PARAM: &str = "page";

// ============================================================================
// PageRequest
// ============================================================================

/// One page request, built fresh for every iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// API base URL (may carry its own query, e.g. an access token)
    pub base_url: Url,
    /// Endpoint path appended to the base URL
    pub path: String,
    /// Window start sent as `startTime`
    pub window_start: Timestamp,
    /// Window end sent as `endTime`
    pub window_end: Timestamp,
    /// 1-based page number sent as `page`
    pub page: u32,
}

impl PageRequest {
    /// Render `{base}/{path}?startTime=..&endTime=..&page=..`
    ///
    /// Path segments and query values are percent-encoded. Query pairs
    /// already present on the base URL are kept in front.
    pub fn url(&self) -> Result<Url> {
        let mut url = join_path(&self.base_url, &self.path)?;
        url.query_pairs_mut()
            .append_pair(START_TIME_PARAM, &format_timestamp(&self.window_start))
            .append_pair(END_TIME_PARAM, &format_timestamp(&self.window_end))
            .append_pair(PAGE_PARAM, &self.page.to_string());
        Ok(url)
    }
}

/// Append slash-separated `path` to the base URL's path
pub(crate) fn join_path(base: &Url, path: &str) -> Result<Url> {
    let mut url = base.clone();
    url.set_fragment(None);
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| Error::config(format!("base URL '{base}' cannot carry a path")))?;
        segments
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
    }
    Ok(url)
}

// ============================================================================
// PageResult
// ============================================================================

/// What one page produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    /// Page number this result answers
    pub page: u32,
    /// URL that was requested
    pub url: Url,
    /// Full response body
    pub raw_body: String,
    /// Start bound reported for the next request
    pub next_window_start: Option<Timestamp>,
    /// End bound reported for the next request
    pub next_window_end: Option<Timestamp>,
    /// Whether the API marked this as the final page
    pub is_last_page: bool,
    /// Total page count, when reported
    pub total_pages: Option<u32>,
}

impl PageResult {
    /// Combine a response with its decoded pagination signals
    pub fn new(page: u32, url: Url, raw_body: String, meta: PageMeta) -> Self {
        Self {
            page,
            url,
            raw_body,
            next_window_start: meta.next_window_start,
            next_window_end: meta.next_window_end,
            is_last_page: !meta.has_next_page,
            total_pages: meta.total_pages,
        }
    }

    /// Window the request after this one uses, given the `current` one
    ///
    /// With [`WindowMode::Rotate`] each reported bound replaces the current
    /// one; unreported bounds are kept.
    pub fn next_window(&self, current: TimeWindow, mode: WindowMode) -> TimeWindow {
        match mode {
            WindowMode::Static => current,
            WindowMode::Rotate => TimeWindow {
                start: self.next_window_start.unwrap_or(current.start),
                end: self.next_window_end.unwrap_or(current.end),
            },
        }
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<JsonValue> {
        serde_json::from_str(&self.raw_body)
            .map_err(|e| Error::malformed(format!("page {} body is not JSON: {e}", self.page)))
    }

    /// Records found under `path` (e.g. `measurements` or `$.data`)
    ///
    /// A missing or null field yields no records; a non-array yields one.
    pub fn records(&self, path: &str) -> Result<Vec<JsonValue>> {
        let body = self.json()?;
        Ok(match crate::decode::extract_path(&body, path) {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Array(items)) => items.clone(),
            Some(other) => vec![other.clone()],
        })
    }
}

// ============================================================================
// Termination / WindowMode
// ============================================================================

/// When a pagination run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Request exactly this many pages
    TotalPages(u32),
    /// Request until a page reports it is the last one
    UntilLastPage {
        /// Stop after this many pages even without the signal
        #[serde(default)]
        max_pages: Option<u32>,
    },
}

impl Default for Termination {
    fn default() -> Self {
        Self::UntilLastPage { max_pages: None }
    }
}

impl Termination {
    /// Whether the page `state` points at should be requested
    pub fn should_fetch(&self, state: &PaginationState) -> bool {
        match *self {
            Self::TotalPages(total) => state.current_page <= total,
            Self::UntilLastPage { max_pages } => {
                !state.reached_last_page && max_pages.map_or(true, |max| state.current_page <= max)
            }
        }
    }
}

/// How window bounds move between pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Bounds never change; only the page number advances
    #[default]
    Static,
    /// Bounds reported by each page replace the current ones
    Rotate,
}

// ============================================================================
// PaginationState
// ============================================================================

/// Cursor owned by a single fetch loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    /// Window start for the next request
    pub current_window_start: Timestamp,
    /// Window end for the next request
    pub current_window_end: Timestamp,
    /// Page number of the next request (1-based)
    pub current_page: u32,
    /// Total pages, once an API response has reported it
    pub total_pages: Option<u32>,
    /// Whether the most recent page was marked as the last one
    pub reached_last_page: bool,
}

impl PaginationState {
    /// State pointing at page 1 of `window`
    pub fn new(window: TimeWindow) -> Self {
        Self {
            current_window_start: window.start,
            current_window_end: window.end,
            current_page: 1,
            total_pages: None,
            reached_last_page: false,
        }
    }

    /// Current window bounds
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.current_window_start,
            end: self.current_window_end,
        }
    }

    /// Check the request preconditions (`page >= 1`, `start <= end`)
    pub fn validate(&self) -> Result<()> {
        if self.current_page == 0 {
            return Err(Error::invalid_state("page numbers start at 1"));
        }
        self.window().validate()
    }

    /// Request for the page this state points at
    pub fn request(&self, base_url: &Url, path: &str) -> PageRequest {
        PageRequest {
            base_url: base_url.clone(),
            path: path.to_string(),
            window_start: self.current_window_start,
            window_end: self.current_window_end,
            page: self.current_page,
        }
    }

    /// Move past `result`
    ///
    /// The window moves as [`PageResult::next_window`] describes. A rotated
    /// window with `start > end` is rejected and leaves the state untouched.
    pub fn advance(&mut self, result: &PageResult, mode: WindowMode) -> Result<()> {
        if result.page != self.current_page {
            return Err(Error::invalid_state(format!(
                "result for page {} applied to state at page {}",
                result.page, self.current_page
            )));
        }

        let next = result.next_window(self.window(), mode);
        if next.start > next.end {
            return Err(Error::malformed(format!(
                "page {} reported window start {} after end {}",
                result.page,
                format_timestamp(&next.start),
                format_timestamp(&next.end)
            )));
        }
        self.current_window_start = next.start;
        self.current_window_end = next.end;

        if result.total_pages.is_some() {
            self.total_pages = result.total_pages;
        }
        self.reached_last_page = result.is_last_page;
        self.current_page += 1;
        Ok(())
    }
}
