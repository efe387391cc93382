//! Error types for windowed-pager
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for windowed-pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Transport Errors
    // ============================================================================
    /// Connection, DNS or timeout failure before a response arrived
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response body could not be read in full
    #[error("IO error: {message}")]
    Io { message: String },

    // ============================================================================
    // Response Errors
    // ============================================================================
    /// The body did not carry the pagination fields the decoder expects
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    /// First failure of a pagination run, tagged with the page it happened on
    #[error("Page {page} failed: {source}")]
    Page {
        page: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("Pagination cancelled before page {page}")]
    Cancelled { page: u32 },

    #[error("Invalid pagination state: {message}")]
    InvalidState { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an IO error from a message
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Tag an error with the page it occurred on
    ///
    /// Already-tagged errors and cancellations are returned unchanged.
    pub fn at_page(self, page: u32) -> Self {
        match self {
            Self::Page { .. } | Self::Cancelled { .. } => self,
            other => Self::Page {
                page,
                source: Box::new(other),
            },
        }
    }

    /// Page number this error was raised on, if known
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Page { page, .. } | Self::Cancelled { page } => Some(*page),
            _ => None,
        }
    }

    /// The underlying error, looking through the page tag
    pub fn root(&self) -> &Error {
        match self {
            Self::Page { source, .. } => source.root(),
            other => other,
        }
    }

    /// HTTP status code, if this is (or wraps) a status error
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self.root() {
            Error::Transport { .. } | Error::Io { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

/// Result type alias for windowed-pager
pub type Result<T> = std::result::Result<T, Error>;
