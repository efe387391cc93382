//! Decoder implementations
//!
//! Each decoder handles a specific way APIs signal "there is more".

use super::types::{PageDecoder, PageMeta};
use crate::error::{Error, Result};
use crate::pagination::PageRequest;
use crate::types::{parse_timestamp, Timestamp};
use serde_json::Value;

// ============================================================================
// Meta Decoder
// ============================================================================

/// Decoder for a `meta` block carrying page counters and the window
///
/// ```text
/// "meta": {
///     "total": 22835, "skip": 0, "limit": 1000,
///     "page": 1, "pages": 23,
///     "startTime": "2023-11-14T20:00:45.061Z",
///     "endTime": "2023-11-21T20:00:45.061Z"
/// }
/// ```
///
/// The page is the last one once `page >= pages`. When `page` is absent the
/// requested page number is used instead.
#[derive(Debug, Clone)]
pub struct MetaDecoder {
    page_path: String,
    pages_path: String,
    start_path: Option<String>,
    end_path: Option<String>,
}

impl Default for MetaDecoder {
    fn default() -> Self {
        Self {
            page_path: "meta.page".to_string(),
            pages_path: "meta.pages".to_string(),
            start_path: Some("meta.startTime".to_string()),
            end_path: Some("meta.endTime".to_string()),
        }
    }
}

impl MetaDecoder {
    /// Create a decoder for the default `meta.*` layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Override where the page counters live
    #[must_use]
    pub fn with_page_paths(mut self, page: impl Into<String>, pages: impl Into<String>) -> Self {
        self.page_path = page.into();
        self.pages_path = pages.into();
        self
    }

    /// Override (or disable with `None`) where the window bounds live
    #[must_use]
    pub fn with_window_paths(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.start_path = start;
        self.end_path = end;
        self
    }

    /// Ignore window fields entirely
    #[must_use]
    pub fn without_window(self) -> Self {
        self.with_window_paths(None, None)
    }
}

impl PageDecoder for MetaDecoder {
    fn decode(&self, body: &str, request: &PageRequest) -> Result<PageMeta> {
        let value = parse_json(body)?;

        let pages = require_u32(&value, &self.pages_path)?;
        let page = match extract_path(&value, &self.page_path) {
            None | Some(Value::Null) => request.page,
            Some(_) => require_u32(&value, &self.page_path)?,
        };

        let (next_window_start, next_window_end) =
            decode_window(&value, self.start_path.as_deref(), self.end_path.as_deref())?;

        Ok(PageMeta {
            has_next_page: page < pages,
            next_window_start,
            next_window_end,
            total_pages: Some(pages),
        })
    }
}

// ============================================================================
// Flag Decoder
// ============================================================================

/// Decoder for a boolean continuation flag
///
/// Common patterns:
/// - `{ "has_more": true }`
/// - `{ "pagination": { "is_last": false } }`
#[derive(Debug, Clone)]
pub struct FlagDecoder {
    path: String,
    /// Flag value that means "stop"
    last_when: bool,
    start_path: Option<String>,
    end_path: Option<String>,
}

impl FlagDecoder {
    /// Flag is `true` while more pages follow
    pub fn has_more(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            last_when: false,
            start_path: None,
            end_path: None,
        }
    }

    /// Flag is `true` on the final page
    pub fn is_last(path: impl Into<String>) -> Self {
        Self {
            last_when: true,
            ..Self::has_more(path)
        }
    }

    /// Also read the next window from these paths
    #[must_use]
    pub fn with_window_paths(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.start_path = start;
        self.end_path = end;
        self
    }
}

impl PageDecoder for FlagDecoder {
    fn decode(&self, body: &str, _request: &PageRequest) -> Result<PageMeta> {
        let value = parse_json(body)?;
        let flag = require_bool(&value, &self.path)?;
        let (next_window_start, next_window_end) =
            decode_window(&value, self.start_path.as_deref(), self.end_path.as_deref())?;

        Ok(PageMeta {
            has_next_page: flag != self.last_when,
            next_window_start,
            next_window_end,
            total_pages: None,
        })
    }
}

// ============================================================================
// Page Index Decoder
// ============================================================================

/// Decoder that never inspects the body
///
/// Pagination is driven purely by the page counter, so it always reports
/// more data. Pair it with a page count or a page cap.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageIndexDecoder;

impl PageDecoder for PageIndexDecoder {
    fn decode(&self, _body: &str, _request: &PageRequest) -> Result<PageMeta> {
        Ok(PageMeta::more())
    }

    fn signals_last_page(&self) -> bool {
        false
    }
}

// ============================================================================
// Field helpers
// ============================================================================

fn parse_json(body: &str) -> Result<Value> {
    serde_json::from_str(body)
        .map_err(|e| Error::malformed(format!("response body is not valid JSON: {e}")))
}

fn decode_window(
    value: &Value,
    start_path: Option<&str>,
    end_path: Option<&str>,
) -> Result<(Option<Timestamp>, Option<Timestamp>)> {
    let start = start_path
        .map(|path| require_timestamp(value, path))
        .transpose()?;
    let end = end_path
        .map(|path| require_timestamp(value, path))
        .transpose()?;
    Ok((start, end))
}

fn require<'a>(value: &'a Value, path: &str) -> Result<&'a Value> {
    match extract_path(value, path) {
        None | Some(Value::Null) => Err(Error::malformed(format!("missing field '{path}'"))),
        Some(v) => Ok(v),
    }
}

fn require_u32(value: &Value, path: &str) -> Result<u32> {
    let field = require(value, path)?;
    field
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            Error::malformed(format!(
                "field '{path}' should be a non-negative integer, got {field}"
            ))
        })
}

fn require_bool(value: &Value, path: &str) -> Result<bool> {
    let field = require(value, path)?;
    field
        .as_bool()
        .ok_or_else(|| Error::malformed(format!("field '{path}' should be a boolean, got {field}")))
}

fn require_timestamp(value: &Value, path: &str) -> Result<Timestamp> {
    let field = require(value, path)?;
    let text = field.as_str().ok_or_else(|| {
        Error::malformed(format!("field '{path}' should be a timestamp string, got {field}"))
    })?;
    parse_timestamp(text)
        .map_err(|_| Error::malformed(format!("field '{path}' is not ISO-8601: '{text}'")))
}

/// Walk a simple dot path (`$.meta.pages`, `data[0].id`, `items[-1]`)
pub(crate) fn extract_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index_str = part[bracket_pos + 1..].strip_suffix(']')?;

            if !name.is_empty() {
                current = current.get(name)?;
            }

            let index = index_str.parse::<i64>().ok()?;
            let arr = current.as_array()?;
            let idx = if index < 0 {
                arr.len().checked_sub(index.unsigned_abs() as usize)?
            } else {
                index as usize
            };
            current = arr.get(idx)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current)
}
