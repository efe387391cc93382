//! Common types used throughout windowed-pager
//!
//! Timestamps, time windows and small shared enums.

use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Instant on the UTC timeline used for window bounds
pub type Timestamp = DateTime<Utc>;

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// Timestamp formatting
// ============================================================================

/// Render a timestamp the way time-windowed APIs expect it
///
/// RFC 3339 with a `Z` suffix, e.g. `2022-11-14T20:00:45.061Z`. Fractional
/// seconds use the shortest of milli, micro or nano precision that holds the
/// value exactly, so a reported bound is sent back unchanged.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an ISO-8601 / RFC 3339 timestamp into UTC
pub fn parse_timestamp(s: &str) -> Result<Timestamp> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::config(format!("Invalid timestamp '{s}': {e}")))
}

// ============================================================================
// Time Window
// ============================================================================

/// A closed `[start, end]` time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Window start (inclusive)
    pub start: Timestamp,
    /// Window end (inclusive)
    pub end: Timestamp,
}

impl TimeWindow {
    /// Create a window, rejecting `start > end`
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// Parse a window from two ISO-8601 strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }

    /// Check the ordering invariant
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(Error::invalid_state(format!(
                "window start {} is after window end {}",
                format_timestamp(&self.start),
                format_timestamp(&self.end)
            )));
        }
        Ok(())
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            format_timestamp(&self.start),
            format_timestamp(&self.end)
        )
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}
